//! Bug Tracker
//!
//! This example models the lifecycle of a bug report.
//!
//! Key concepts:
//! - Assigned is a substate of Open, so it inherits Open's transitions
//! - The Assign trigger carries the assignee as a typed argument
//! - Reassigning re-enters Assigned, running its exit and entry actions
//! - Entry actions filtered by trigger
//! - Introspection rendered as JSON
//!
//! Run with: cargo run --example bug_tracker

use std::cell::RefCell;
use std::rc::Rc;
use substate::{args, identity_enum, ConfigurationError, FireError, ParamType, StateMachine};

identity_enum! {
    enum BugState {
        Open,
        Assigned,
        Deferred,
        Closed,
    }
}

identity_enum! {
    enum BugTrigger {
        Assign,
        Defer,
        Close,
    }
}

struct Bug {
    title: String,
    assignee: Rc<RefCell<Option<String>>>,
    machine: StateMachine<BugState, BugTrigger>,
}

impl Bug {
    fn new(title: &str) -> Result<Self, ConfigurationError> {
        let assignee = Rc::new(RefCell::new(None));
        let mut machine = StateMachine::new(BugState::Open);

        machine
            .set_trigger_parameters(BugTrigger::Assign, vec![ParamType::of::<String>()])?;

        machine
            .configure(BugState::Open)
            .permit(BugTrigger::Assign, BugState::Assigned)?;

        let on_assigned = assignee.clone();
        let on_deassigned = assignee.clone();
        machine
            .configure(BugState::Assigned)
            .substate_of(BugState::Open)?
            .on_entry_from(BugTrigger::Assign, move |t| {
                let name = t.parameters().get::<String>(0).cloned();
                if let Some(name) = &name {
                    println!("  Assigned to {}", name);
                }
                *on_assigned.borrow_mut() = name;
            })
            .permit_reentry(BugTrigger::Assign)
            .permit(BugTrigger::Close, BugState::Closed)?
            .permit(BugTrigger::Defer, BugState::Deferred)?
            .on_exit(move |_| {
                if let Some(name) = on_deassigned.borrow().as_ref() {
                    println!("  {} is no longer working on it", name);
                }
            });

        let on_deferred = assignee.clone();
        machine
            .configure(BugState::Deferred)
            .on_entry(move |_| *on_deferred.borrow_mut() = None)
            .permit(BugTrigger::Assign, BugState::Assigned)?;

        machine.on_transitioned(|t| {
            println!("  {} --{}--> {}", t.source(), t.trigger(), t.destination());
        });

        Ok(Self {
            title: title.to_string(),
            assignee,
            machine,
        })
    }

    fn assign(&self, assignee: &str) -> Result<(), FireError> {
        self.machine
            .fire_with(BugTrigger::Assign, args![assignee.to_string()])
    }

    fn defer(&self) -> Result<(), FireError> {
        self.machine.fire(BugTrigger::Defer)
    }

    fn close(&self) -> Result<(), FireError> {
        self.machine.fire(BugTrigger::Close)
    }

    fn status(&self) {
        println!(
            "[{}] state: {}, assignee: {}",
            self.title,
            self.machine.state(),
            self.assignee.borrow().as_deref().unwrap_or("nobody")
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Bug Tracker ===\n");

    let bug = Bug::new("Login button unresponsive")?;
    bug.status();

    println!("\nAssigning:");
    bug.assign("Joe")?;
    bug.status();

    println!("\nDeferring:");
    bug.defer()?;
    bug.status();

    println!("\nReassigning:");
    bug.assign("Harry")?;
    bug.assign("Fred")?;
    bug.status();

    println!("\nClosing:");
    bug.close()?;
    bug.status();

    println!("\nClosing again:");
    match bug.close() {
        Ok(()) => println!("  unexpectedly accepted"),
        Err(e) => println!("  rejected: {}", e),
    }

    println!("\nConfiguration:");
    println!("{}", bug.machine.info().to_json()?);

    Ok(())
}
