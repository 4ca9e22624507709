//! Async Workflow
//!
//! This example drives a payment workflow whose actions are Stillwater
//! effects, run through the async API.
//!
//! Key concepts:
//! - Entry, exit and activation actions as effects
//! - Initial transition from Processing into Validating
//! - Cancel inherited by every Processing substate
//! - A failing effect aborting the fire call
//!
//! Run with: cargo run --example async_workflow

use std::sync::{Arc, Mutex};
use stillwater::prelude::*;
use substate::{
    args, identity_enum, ActionEffect, ActionError, ConfigurationError, Guard, ParamType,
    StateMachine, Transition,
};

identity_enum! {
    enum Payment {
        Pending,
        Processing,
        Validating,
        Charging,
        Settled,
        Cancelled,
    }
}

identity_enum! {
    enum Step {
        Submit,
        Validated,
        Charged,
        Cancel,
    }
}

type Audit = Arc<Mutex<Vec<String>>>;

/// Effect appending `entry` to the audit trail.
fn audit(trail: &Audit, entry: String) -> ActionEffect {
    let trail = trail.clone();
    from_fn(move |_: &()| {
        println!("  audit: {}", entry);
        match trail.lock() {
            Ok(mut trail) => {
                trail.push(entry);
                Ok(())
            }
            Err(_) => Err(ActionError::failed("audit trail poisoned")),
        }
    })
    .boxed()
}

fn charge(transition: &Transition<Payment, Step>, limit: u64) -> ActionEffect {
    let amount = transition.parameters().get::<u64>(0).copied().unwrap_or_default();
    if amount > limit {
        fail(ActionError::failed(format!(
            "amount {} exceeds limit {}",
            amount, limit
        )))
        .boxed()
    } else {
        println!("  charging {}", amount);
        pure(()).boxed()
    }
}

fn workflow(trail: &Audit, limit: u64) -> Result<StateMachine<Payment, Step>, ConfigurationError> {
    let mut machine = StateMachine::new(Payment::Pending);
    machine.set_trigger_parameters(Step::Submit, vec![ParamType::of::<u64>()])?;

    machine.configure(Payment::Pending).permit_if(
        Step::Submit,
        Payment::Processing,
        Guard::described("amount is positive", |args| {
            args.get::<u64>(0).is_some_and(|amount| *amount > 0)
        }),
    )?;

    let (activated, deactivated) = (trail.clone(), trail.clone());
    machine
        .configure(Payment::Processing)
        .initial_transition(Payment::Validating)?
        .permit(Step::Cancel, Payment::Cancelled)?
        .on_activate_async(move || audit(&activated, "processing activated".to_string()))
        .on_deactivate_async(move || audit(&deactivated, "processing deactivated".to_string()));

    let entered = trail.clone();
    machine
        .configure(Payment::Validating)
        .substate_of(Payment::Processing)?
        .permit(Step::Validated, Payment::Charging)?
        .on_entry_async(move |t| audit(&entered, format!("validating after {}", t.trigger())));

    let left = trail.clone();
    machine
        .configure(Payment::Charging)
        .substate_of(Payment::Processing)?
        .permit(Step::Charged, Payment::Settled)?
        .on_entry_async(move |t| charge(t, limit))
        .on_exit_async(move |_| audit(&left, "charge complete".to_string()));

    let settled = trail.clone();
    machine
        .configure(Payment::Settled)
        .on_entry_async(move |_| audit(&settled, "settled".to_string()));

    let transitions = trail.clone();
    machine.on_transitioned_async(move |t| {
        audit(
            &transitions,
            format!("{} -> {}", t.source(), t.destination()),
        )
    });

    Ok(machine)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Async Workflow ===\n");

    let trail = Audit::default();

    println!("Payment within limit:");
    let payment = workflow(&trail, 500)?;
    payment.fire_async_with(Step::Submit, args![120u64]).await?;
    payment.activate_async().await?;
    payment.fire_async(Step::Validated).await?;
    payment.deactivate_async().await?;
    payment.fire_async(Step::Charged).await?;
    println!("  final state: {}\n", payment.state());

    println!("Payment over limit:");
    let payment = workflow(&trail, 500)?;
    payment.fire_async_with(Step::Submit, args![9_000u64]).await?;
    match payment.fire_async(Step::Validated).await {
        Ok(()) => println!("  charged"),
        Err(e) => println!("  charge failed: {}", e),
    }
    println!("  state after failure: {}", payment.state());
    payment.fire_async(Step::Cancel).await?;
    println!("  final state: {}\n", payment.state());

    println!("Sync API on an async machine:");
    let payment = workflow(&trail, 500)?;
    match payment.fire_with(Step::Submit, args![10u64]) {
        Ok(()) => println!("  accepted"),
        Err(e) => println!("  rejected: {}", e),
    }
    println!("  state: {}", payment.state());

    let entries = trail.lock().map(|t| t.len()).unwrap_or_default();
    println!("\nAudit trail holds {} entries", entries);

    Ok(())
}
