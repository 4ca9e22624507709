//! Guarded resolution, unhandled triggers, ignored and dynamic behaviours.

mod common;

use common::{strings, Log, Machine, Phase, Signal};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use substate::{args, Args, DynamicDestination, FireError, Guard};

fn closed(description: &str) -> Guard {
    Guard::described(description, |_| false)
}

fn open(description: &str) -> Guard {
    Guard::described(description, |_| true)
}

#[test]
fn the_satisfied_guard_selects_the_destination() {
    let mut machine = Machine::new(Phase::A);
    machine
        .configure(Phase::A)
        .permit_if(Signal::X, Phase::B, closed("to B"))
        .unwrap()
        .permit_if(Signal::X, Phase::C, open("to C"))
        .unwrap();

    machine.fire(Signal::X).unwrap();

    assert_eq!(machine.state(), Phase::C);
}

#[test]
fn guards_receive_fire_time_arguments() {
    let mut machine = Machine::new(Phase::A);
    let positive = Guard::described("positive", |args| args.get::<i32>(0).is_some_and(|n| *n > 0));
    let negative = Guard::described("negative", |args| args.get::<i32>(0).is_some_and(|n| *n < 0));
    machine
        .configure(Phase::A)
        .permit_if(Signal::X, Phase::B, positive)
        .unwrap()
        .permit_if(Signal::X, Phase::C, negative)
        .unwrap();

    machine.fire_with(Signal::X, args![-4]).unwrap();

    assert_eq!(machine.state(), Phase::C);
}

#[test]
fn multiple_satisfied_guards_are_ambiguous() {
    let log = Log::new();
    let mut machine = Machine::new(Phase::A);
    machine
        .configure(Phase::A)
        .permit_if(Signal::X, Phase::B, open("first"))
        .unwrap()
        .permit_if(Signal::X, Phase::C, open("second"))
        .unwrap()
        .on_exit(log.action("exit A"));

    let err = machine.fire(Signal::X).unwrap_err();

    assert!(matches!(err, FireError::AmbiguousTransition(_)));
    assert!(log.entries().is_empty());
    assert_eq!(machine.state(), Phase::A);
}

#[test]
fn unhandled_trigger_fails_with_a_descriptive_error_by_default() {
    let machine = Machine::new(Phase::A);

    let err = machine.fire(Signal::X).unwrap_err();

    assert_eq!(
        err.to_string(),
        "No valid leaving transitions are permitted from state 'A' for trigger 'X'. Consider ignoring the trigger."
    );
}

#[test]
fn blocked_trigger_reports_guard_descriptions_by_default() {
    let mut machine = Machine::new(Phase::A);
    machine
        .configure(Phase::A)
        .permit_if(Signal::X, Phase::B, closed("door is locked"))
        .unwrap();

    let err = machine.fire(Signal::X).unwrap_err();

    assert_eq!(
        err,
        FireError::GuardsNotMet {
            state: "A".to_string(),
            trigger: "X".to_string(),
            guards: vec!["door is locked".to_string()],
        }
    );
}

#[test]
fn unhandled_handler_is_called_once_without_state_change() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::new(RefCell::new(None));
    let mut machine = Machine::new(Phase::A);
    let (counter, record) = (calls.clone(), seen.clone());
    machine.on_unhandled_trigger(move |state, trigger, unmet| {
        counter.set(counter.get() + 1);
        *record.borrow_mut() = Some((*state, *trigger, unmet.to_vec()));
    });

    machine.fire(Signal::Z).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(*seen.borrow(), Some((Phase::A, Signal::Z, vec![])));
    assert_eq!(machine.state(), Phase::A);
}

#[test]
fn every_failed_guard_reaches_the_unhandled_handler() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut machine = Machine::new(Phase::A);
    let record = seen.clone();
    machine.on_unhandled_trigger(move |_, _, unmet| record.borrow_mut().extend_from_slice(unmet));
    machine
        .configure(Phase::A)
        .permit_reentry_if(Signal::X, closed("reentry guard failed"))
        .permit_if(Signal::X, Phase::C, closed("permit guard failed"))
        .unwrap();

    machine.fire(Signal::X).unwrap();

    assert_eq!(
        *seen.borrow(),
        strings(&["reentry guard failed", "permit guard failed"])
    );
    assert_eq!(machine.state(), Phase::A);
}

#[test]
fn conjunctive_guard_reports_each_failing_condition() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut machine = Machine::new(Phase::A);
    let record = seen.clone();
    machine.on_unhandled_trigger(move |_, _, unmet| record.borrow_mut().extend_from_slice(unmet));
    machine
        .configure(Phase::A)
        .permit_if(
            Signal::X,
            Phase::B,
            Guard::described("1", |_| false).and("2", |_| false),
        )
        .unwrap();

    machine.fire(Signal::X).unwrap();

    assert_eq!(*seen.borrow(), strings(&["1", "2"]));
}

#[test]
fn substate_guard_failure_surfaces_when_superstate_is_silent() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut machine = Machine::new(Phase::B);
    let record = seen.clone();
    machine.on_unhandled_trigger(move |_, _, unmet| record.borrow_mut().extend_from_slice(unmet));
    machine.configure(Phase::A).permit(Signal::Y, Phase::D).unwrap();
    machine
        .configure(Phase::B)
        .substate_of(Phase::A)
        .unwrap()
        .permit_if(Signal::X, Phase::C, closed("expected description"))
        .unwrap();

    machine.fire(Signal::X).unwrap();

    assert_eq!(*seen.borrow(), strings(&["expected description"]));
    assert_eq!(machine.state(), Phase::B);
}

#[test]
fn substate_guard_failure_falls_back_to_superstate_transition() {
    let mut machine = Machine::new(Phase::B);
    machine.configure(Phase::A).permit(Signal::X, Phase::D).unwrap();
    machine
        .configure(Phase::B)
        .substate_of(Phase::A)
        .unwrap()
        .permit_if(Signal::X, Phase::C, closed("closed"))
        .unwrap();

    machine.fire(Signal::X).unwrap();

    assert_eq!(machine.state(), Phase::D);
}

#[test]
fn each_guard_is_evaluated_once_per_fire() {
    let evaluations = Rc::new(Cell::new(0));
    let counter = evaluations.clone();
    let mut machine = Machine::new(Phase::A);
    machine
        .configure(Phase::A)
        .permit_if(
            Signal::X,
            Phase::B,
            Guard::described("counted", move |_| {
                counter.set(counter.get() + 1);
                true
            }),
        )
        .unwrap();

    machine.fire(Signal::X).unwrap();

    assert_eq!(evaluations.get(), 1);
}

#[test]
fn ignored_trigger_is_accepted_without_effects() {
    let log = Log::new();
    let mut machine = Machine::new(Phase::A);
    machine
        .configure(Phase::A)
        .ignore(Signal::X)
        .on_exit(log.action("exit"))
        .on_entry(log.action("entry"));
    machine.on_transitioned(log.action("transitioned"));

    assert!(machine.can_fire(&Signal::X).unwrap());
    machine.fire(Signal::X).unwrap();

    assert!(log.entries().is_empty());
    assert_eq!(machine.state(), Phase::A);
}

#[test]
fn ignore_if_falls_through_when_guard_fails() {
    let mut machine = Machine::new(Phase::B);
    machine.configure(Phase::A).permit(Signal::X, Phase::C).unwrap();
    machine
        .configure(Phase::B)
        .substate_of(Phase::A)
        .unwrap()
        .ignore_if(Signal::X, closed("never"));

    machine.fire(Signal::X).unwrap();

    assert_eq!(machine.state(), Phase::C);
}

#[test]
fn dynamic_destination_is_chosen_from_arguments() {
    let mut machine = Machine::new(Phase::A);
    machine.configure(Phase::A).permit_dynamic(
        Signal::X,
        DynamicDestination::new(|args| match args.get::<&str>(0) {
            Some(&"fast") => Phase::C,
            _ => Phase::B,
        }),
    );
    machine.configure(Phase::B).permit(Signal::Y, Phase::A).unwrap();

    machine.fire_with(Signal::X, args!["slow"]).unwrap();
    assert_eq!(machine.state(), Phase::B);

    machine.fire(Signal::Y).unwrap();
    machine.fire_with(Signal::X, args!["fast"]).unwrap();
    assert_eq!(machine.state(), Phase::C);
}

#[test]
fn dynamic_guards_participate_in_ambiguity_checks() {
    let mut machine = Machine::new(Phase::A);
    machine
        .configure(Phase::A)
        .permit_dynamic_if(Signal::X, DynamicDestination::new(|_| Phase::B), open("dynamic"))
        .permit(Signal::X, Phase::C)
        .unwrap();

    assert!(matches!(
        machine.fire(Signal::X),
        Err(FireError::AmbiguousTransition(_))
    ));
}

#[test]
fn permitted_triggers_respect_guards_and_inheritance() {
    let mut machine = Machine::new(Phase::B);
    machine.configure(Phase::A).permit(Signal::Z, Phase::C).unwrap();
    machine
        .configure(Phase::B)
        .substate_of(Phase::A)
        .unwrap()
        .permit(Signal::X, Phase::C)
        .unwrap()
        .permit_if(Signal::Y, Phase::C, Guard::described("flag", |args| {
            args.get::<bool>(0).copied().unwrap_or(false)
        }))
        .unwrap();

    assert_eq!(machine.permitted_triggers(&Args::new()), vec![Signal::X, Signal::Z]);
    assert_eq!(
        machine.permitted_triggers(&args![true]),
        vec![Signal::X, Signal::Y, Signal::Z]
    );
}
