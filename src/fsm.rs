//! # Finite State Machines
//!
//! [`StateMachine`] is a small thread-safe FSM over any state and event types.
//! Transitions are registered up front; [`trigger`](StateMachine::trigger)
//! moves the machine along a registered edge or fails without changing state.
//!
//! The [`order`] module wires it up for the order lifecycle:
//!
//! ```text
//! pending --CONFIRM--> confirmed --PROCESS--> processing --SHIP--> shipped --DELIVER--> delivered
//!
//! pending | confirmed | processing | shipped --CANCEL--> cancelled
//! delivered | cancelled --REFUND--> refunded
//! ```
pub mod order;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("invalid transition: no '{event}' edge from state '{state}'")]
    InvalidTransition { state: String, event: String },
}

type Callback<S> = Arc<dyn Fn(&S, &S) + Send + Sync>;

struct Inner<S, E> {
    current: S,
    // Per source state, edges in registration order.
    transitions: HashMap<S, Vec<(E, S)>>,
    callbacks: HashMap<E, Vec<Callback<S>>>,
}

/// Thread-safe finite state machine.
///
/// All state sits behind one `parking_lot` lock. Callbacks run after the lock
/// is released, so a callback may read the machine (or trigger it again)
/// without deadlocking.
///
/// # Examples
///
/// ```
/// use storeql::fsm::StateMachine;
///
/// let fsm = StateMachine::new("idle");
/// fsm.add_transition("idle", "start", "running");
///
/// assert!(fsm.can_transition(&"start"));
/// assert_eq!(fsm.trigger(&"start").unwrap(), "running");
/// assert!(fsm.trigger(&"start").is_err());
/// ```
pub struct StateMachine<S, E> {
    inner: RwLock<Inner<S, E>>,
}

impl<S, E> StateMachine<S, E>
where
    S: Clone + Eq + Hash + fmt::Display,
    E: Clone + Eq + Hash + fmt::Display,
{
    pub fn new(initial: S) -> Self {
        StateMachine {
            inner: RwLock::new(Inner {
                current: initial,
                transitions: HashMap::new(),
                callbacks: HashMap::new(),
            }),
        }
    }

    /// Register `from --event--> to`. A second edge for the same
    /// `(from, event)` replaces the first.
    pub fn add_transition(&self, from: S, event: E, to: S) {
        let mut inner = self.inner.write();
        let edges = inner.transitions.entry(from).or_default();
        match edges.iter_mut().find(|(existing, _)| *existing == event) {
            Some(edge) => edge.1 = to,
            None => edges.push((event, to)),
        }
    }

    /// Fire `event` and return the new state.
    ///
    /// Callbacks registered for `event` run in registration order with
    /// `(old, new)` once the state has changed.
    pub fn trigger(&self, event: &E) -> Result<S, FsmError> {
        let (old, new, callbacks) = {
            let mut inner = self.inner.write();
            let next = inner
                .transitions
                .get(&inner.current)
                .and_then(|edges| edges.iter().find(|(e, _)| e == event))
                .map(|(_, to)| to.clone());

            let Some(next) = next else {
                return Err(FsmError::InvalidTransition {
                    state: inner.current.to_string(),
                    event: event.to_string(),
                });
            };

            let old = std::mem::replace(&mut inner.current, next.clone());
            let callbacks = inner.callbacks.get(event).cloned().unwrap_or_default();
            (old, next, callbacks)
        };

        debug!(from = %old, to = %new, %event, "state transition");
        for callback in &callbacks {
            callback(&old, &new);
        }
        Ok(new)
    }

    pub fn current(&self) -> S {
        self.inner.read().current.clone()
    }

    pub fn can_transition(&self, event: &E) -> bool {
        let inner = self.inner.read();
        inner
            .transitions
            .get(&inner.current)
            .is_some_and(|edges| edges.iter().any(|(e, _)| e == event))
    }

    /// Events with an edge out of the current state, in registration order.
    pub fn valid_events(&self) -> Vec<E> {
        let inner = self.inner.read();
        inner
            .transitions
            .get(&inner.current)
            .map(|edges| edges.iter().map(|(e, _)| e.clone()).collect())
            .unwrap_or_default()
    }

    pub fn on_transition<F>(&self, event: E, callback: F)
    where
        F: Fn(&S, &S) + Send + Sync + 'static,
    {
        self.inner
            .write()
            .callbacks
            .entry(event)
            .or_default()
            .push(Arc::new(callback));
    }
}
