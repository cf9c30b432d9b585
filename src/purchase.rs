use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::types::{MonthKey, PurchaseId};

/// a single buy split into fixed monthly dues
///
/// the record is plain data: callers load it from storage, run it through the
/// engine operations, and persist the returned copy. nothing here talks to a
/// datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPurchase {
    pub id: PurchaseId,
    pub description: String,
    /// total cost including interest capitalized so far
    pub total_amount: Money,
    /// first scheduled month; the day of month is cosmetic
    pub purchase_date: NaiveDate,
    /// fixed at creation, number of monthly dues
    pub total_installments: u32,
    pub paid_installments: u32,
    /// interest from delays not yet folded into a payment; reset to zero by
    /// every payment or anticipation
    pub accumulated_interest: Money,
    pub last_payment_date: Option<DateTime<Utc>>,
    /// months explicitly skipped by the user, never auto-inferred
    pub delayed_months: BTreeSet<MonthKey>,
    pub card: Option<String>,
    pub paid_for: Option<String>,
}

impl InstallmentPurchase {
    /// create a new purchase at the start of its schedule
    pub fn new(
        description: impl Into<String>,
        total_amount: Money,
        purchase_date: NaiveDate,
        total_installments: u32,
    ) -> Result<Self> {
        if total_installments == 0 {
            return Err(EngineError::InvalidInstallmentCount {
                count: total_installments,
            });
        }
        if total_amount.is_negative() {
            return Err(EngineError::InvalidAmount {
                amount: total_amount,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            description: description.into(),
            total_amount,
            purchase_date,
            total_installments,
            paid_installments: 0,
            accumulated_interest: Money::ZERO,
            last_payment_date: None,
            delayed_months: BTreeSet::new(),
            card: None,
            paid_for: None,
        })
    }

    /// check a stored record against the engine's invariants
    pub fn validate(&self) -> Result<()> {
        if self.total_installments == 0 {
            return Err(EngineError::CorruptRecord {
                id: self.id,
                message: "total_installments is zero".to_string(),
            });
        }
        if self.paid_installments > self.total_installments {
            return Err(EngineError::CorruptRecord {
                id: self.id,
                message: format!(
                    "paid_installments {} exceeds total_installments {}",
                    self.paid_installments, self.total_installments
                ),
            });
        }
        if self.accumulated_interest.is_negative() {
            return Err(EngineError::CorruptRecord {
                id: self.id,
                message: format!("negative accumulated_interest {}", self.accumulated_interest),
            });
        }
        Ok(())
    }

    /// first month of the schedule window
    pub fn start_month(&self) -> MonthKey {
        MonthKey::from_date(self.purchase_date)
    }

    /// base monthly due, total split evenly over the installment count
    pub fn monthly_amount(&self) -> Money {
        self.total_amount.split_over(self.total_installments)
    }

    pub fn remaining_installments(&self) -> u32 {
        self.total_installments.saturating_sub(self.paid_installments)
    }

    pub fn is_settled(&self) -> bool {
        self.paid_installments >= self.total_installments
    }
}
