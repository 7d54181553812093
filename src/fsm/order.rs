use std::fmt;

use super::StateMachine;

/// Lifecycle state of a store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// No further transitions.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Refunded)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderEvent {
    Confirm,
    Process,
    Ship,
    Deliver,
    Cancel,
    Refund,
}

impl OrderEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEvent::Confirm => "CONFIRM",
            OrderEvent::Process => "PROCESS",
            OrderEvent::Ship => "SHIP",
            OrderEvent::Deliver => "DELIVER",
            OrderEvent::Cancel => "CANCEL",
            OrderEvent::Refund => "REFUND",
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type OrderStateMachine = StateMachine<OrderStatus, OrderEvent>;

/// Order lifecycle machine, starting at `pending`.
///
/// Orders move forward one step at a time, can be cancelled before delivery,
/// and can be refunded once delivered or cancelled.
pub fn order_state_machine() -> OrderStateMachine {
    use OrderEvent::*;
    use OrderStatus::*;

    let fsm = StateMachine::new(Pending);

    fsm.add_transition(Pending, Confirm, Confirmed);
    fsm.add_transition(Pending, Cancel, Cancelled);

    fsm.add_transition(Confirmed, Process, Processing);
    fsm.add_transition(Confirmed, Cancel, Cancelled);

    fsm.add_transition(Processing, Ship, Shipped);
    fsm.add_transition(Processing, Cancel, Cancelled);

    fsm.add_transition(Shipped, Deliver, Delivered);
    fsm.add_transition(Shipped, Cancel, Cancelled);

    fsm.add_transition(Delivered, Refund, Refunded);
    fsm.add_transition(Cancelled, Refund, Refunded);

    fsm
}
