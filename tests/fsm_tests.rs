// tests/fsm_tests.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use storeql::fsm::order::{OrderEvent, OrderStatus, order_state_machine};
use storeql::fsm::{FsmError, StateMachine};

// ============================================================================
// Generic Machine
// ============================================================================

#[test]
fn test_trigger_follows_edges() {
    let fsm = StateMachine::new("off");
    fsm.add_transition("off", "toggle", "on");
    fsm.add_transition("on", "toggle", "off");

    assert_eq!(fsm.trigger(&"toggle"), Ok("on"));
    assert_eq!(fsm.current(), "on");
    assert_eq!(fsm.trigger(&"toggle"), Ok("off"));
}

#[test]
fn test_invalid_transition_keeps_state() {
    let fsm = StateMachine::new("off");
    fsm.add_transition("off", "toggle", "on");

    let err = fsm.trigger(&"explode").unwrap_err();
    assert_eq!(
        err,
        FsmError::InvalidTransition {
            state: "off".to_string(),
            event: "explode".to_string(),
        }
    );
    assert_eq!(fsm.current(), "off");
}

#[test]
fn test_state_without_edges() {
    let fsm: StateMachine<&str, &str> = StateMachine::new("alone");
    assert!(!fsm.can_transition(&"anything"));
    assert!(fsm.valid_events().is_empty());
    assert!(fsm.trigger(&"anything").is_err());
}

#[test]
fn test_last_transition_wins() {
    let fsm = StateMachine::new(0);
    fsm.add_transition(0, 'x', 1);
    fsm.add_transition(0, 'x', 2);
    assert_eq!(fsm.valid_events(), vec!['x']);
    assert_eq!(fsm.trigger(&'x'), Ok(2));
}

#[test]
fn test_callbacks_run_in_order_with_old_and_new() {
    let fsm = StateMachine::new(1);
    fsm.add_transition(1, "next", 2);

    let seen = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second"] {
        let seen = Arc::clone(&seen);
        fsm.on_transition("next", move |from: &i32, to: &i32| {
            seen.lock().push((tag, *from, *to));
        });
    }

    fsm.trigger(&"next").unwrap();
    assert_eq!(*seen.lock(), vec![("first", 1, 2), ("second", 1, 2)]);
}

#[test]
fn test_callbacks_only_for_their_event() {
    let fsm = StateMachine::new('a');
    fsm.add_transition('a', 1, 'b');
    fsm.add_transition('b', 2, 'c');

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    fsm.on_transition(2, move |_: &char, _: &char| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    fsm.trigger(&1).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    fsm.trigger(&2).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_callback_can_read_machine() {
    let fsm = Arc::new(StateMachine::new("a"));
    fsm.add_transition("a", "go", "b");

    let observed = Arc::new(Mutex::new(None));
    let machine = Arc::clone(&fsm);
    let slot = Arc::clone(&observed);
    fsm.on_transition("go", move |_: &&str, _: &&str| {
        // Would deadlock if the lock were still held
        *slot.lock() = Some(machine.current());
    });

    fsm.trigger(&"go").unwrap();
    assert_eq!(*observed.lock(), Some("b"));
}

// ============================================================================
// Order Lifecycle
// ============================================================================

#[test]
fn test_order_happy_path() {
    let fsm = order_state_machine();
    assert_eq!(fsm.current(), OrderStatus::Pending);

    assert_eq!(fsm.trigger(&OrderEvent::Confirm), Ok(OrderStatus::Confirmed));
    assert!(fsm.can_transition(&OrderEvent::Process));
    assert!(!fsm.can_transition(&OrderEvent::Ship));
    assert!(fsm.trigger(&OrderEvent::Ship).is_err());
    assert_eq!(fsm.current(), OrderStatus::Confirmed);

    fsm.trigger(&OrderEvent::Process).unwrap();
    fsm.trigger(&OrderEvent::Ship).unwrap();
    fsm.trigger(&OrderEvent::Deliver).unwrap();
    assert_eq!(fsm.current(), OrderStatus::Delivered);
    assert_eq!(fsm.valid_events(), vec![OrderEvent::Refund]);
}

#[test]
fn test_order_cancel_from_every_open_state() {
    let steps = [OrderEvent::Confirm, OrderEvent::Process, OrderEvent::Ship];
    for taken in 0..=steps.len() {
        let fsm = order_state_machine();
        for event in &steps[..taken] {
            fsm.trigger(event).unwrap();
        }
        assert_eq!(fsm.trigger(&OrderEvent::Cancel), Ok(OrderStatus::Cancelled));
        assert_eq!(fsm.trigger(&OrderEvent::Refund), Ok(OrderStatus::Refunded));
        assert!(fsm.current().is_final());
        assert!(fsm.valid_events().is_empty());
    }
}

#[test]
fn test_order_cannot_cancel_after_delivery() {
    let fsm = order_state_machine();
    for event in [OrderEvent::Confirm, OrderEvent::Process, OrderEvent::Ship, OrderEvent::Deliver] {
        fsm.trigger(&event).unwrap();
    }
    let err = fsm.trigger(&OrderEvent::Cancel).unwrap_err();
    assert_eq!(err.to_string(), "invalid transition: no 'CANCEL' edge from state 'delivered'");
}

#[test]
fn test_order_valid_events_in_registration_order() {
    let fsm = order_state_machine();
    assert_eq!(fsm.valid_events(), vec![OrderEvent::Confirm, OrderEvent::Cancel]);
}
