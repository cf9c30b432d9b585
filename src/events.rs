use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{MonthKey, PurchaseId};

/// all events emitted by settlement operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// one regular installment was paid
    InstallmentPaid {
        purchase_id: PurchaseId,
        amount: Money,
        /// interest folded into this payment before the reset
        interest_portion: Money,
        paid_installments: u32,
        timestamp: DateTime<Utc>,
    },
    /// one or more future installments were prepaid
    InstallmentsAnticipated {
        purchase_id: PurchaseId,
        months_advanced: u32,
        amount: Money,
        paid_installments: u32,
        timestamp: DateTime<Utc>,
    },
    /// a scheduled month was skipped, with interest capitalized
    MonthDelayed {
        purchase_id: PurchaseId,
        month: MonthKey,
        interest: Money,
        new_total: Money,
        timestamp: DateTime<Utc>,
    },
    /// a bulk payment advanced every eligible purchase
    BatchPaid {
        purchases_paid: u32,
        total_amount: Money,
        timestamp: DateTime<Utc>,
    },
    /// paid_installments reached total_installments
    PurchaseSettled {
        purchase_id: PurchaseId,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
