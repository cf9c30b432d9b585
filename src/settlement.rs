use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::purchase::InstallmentPurchase;
use crate::types::{EntryCategory, EntryType, LedgerEntry, MonthKey};

/// settlement operations over installment purchases
///
/// holds no purchase state of its own: every operation takes a record, returns
/// the updated record plus at most one ledger entry, and collects audit events.
/// callers persist both results transactionally.
pub struct SettlementEngine {
    pub events: EventStore,
}

impl SettlementEngine {
    pub fn new() -> Self {
        Self {
            events: EventStore::new(),
        }
    }

    /// pay one installment
    ///
    /// an exhausted schedule is a tolerated no-op (UI double-click race), the
    /// record comes back unchanged with no entry. otherwise the installment
    /// counter advances, accumulated interest folds into the charged amount
    /// exactly once and resets to zero. `delayed_months` is never touched.
    pub fn pay(
        &mut self,
        purchase: InstallmentPurchase,
        time_provider: &SafeTimeProvider,
    ) -> (InstallmentPurchase, Option<LedgerEntry>) {
        if purchase.is_settled() {
            return (purchase, None);
        }

        let now = time_provider.now();
        let interest_portion = purchase.accumulated_interest;
        let (updated, amount) = apply_payment(purchase, now);

        let entry = LedgerEntry {
            description: updated.description.clone(),
            amount,
            category: EntryCategory::Installments,
            entry_type: EntryType::Expense,
            date: now,
            card: updated.card.clone(),
            paid_for: updated.paid_for.clone(),
        };

        self.events.emit(Event::InstallmentPaid {
            purchase_id: updated.id,
            amount,
            interest_portion,
            paid_installments: updated.paid_installments,
            timestamp: now,
        });
        if updated.is_settled() {
            self.events.emit(Event::PurchaseSettled {
                purchase_id: updated.id,
                timestamp: now,
            });
        }

        (updated, Some(entry))
    }

    /// pay one installment on every eligible purchase in the batch
    ///
    /// all-or-nothing: every record is validated and the whole output batch is
    /// materialized before anything is returned or emitted, so a corrupt record
    /// fails the batch with no observable partial state. already-exhausted
    /// purchases pass through unchanged. emits a single aggregate ledger entry
    /// for the batch sum rather than one per purchase.
    pub fn pay_all(
        &mut self,
        purchases: &[InstallmentPurchase],
        time_provider: &SafeTimeProvider,
    ) -> Result<(Vec<InstallmentPurchase>, Option<LedgerEntry>)> {
        for purchase in purchases {
            purchase.validate()?;
        }

        let now = time_provider.now();
        let mut updated_batch = Vec::with_capacity(purchases.len());
        let mut settled_ids = Vec::new();
        let mut total_amount = Money::ZERO;
        let mut purchases_paid: u32 = 0;

        for purchase in purchases {
            if purchase.is_settled() {
                updated_batch.push(purchase.clone());
                continue;
            }

            let (updated, amount) = apply_payment(purchase.clone(), now);
            total_amount += amount;
            purchases_paid += 1;
            if updated.is_settled() {
                settled_ids.push(updated.id);
            }
            updated_batch.push(updated);
        }

        if purchases_paid == 0 {
            return Ok((updated_batch, None));
        }

        let entry = LedgerEntry {
            description: "monthly installments".to_string(),
            amount: total_amount,
            category: EntryCategory::Installments,
            entry_type: EntryType::Expense,
            date: now,
            card: None,
            paid_for: None,
        };

        self.events.emit(Event::BatchPaid {
            purchases_paid,
            total_amount,
            timestamp: now,
        });
        for purchase_id in settled_ids {
            self.events.emit(Event::PurchaseSettled {
                purchase_id,
                timestamp: now,
            });
        }

        Ok((updated_batch, Some(entry)))
    }

    /// skip the target month, capitalizing the delay's interest
    ///
    /// the month key insert has set semantics and is idempotent, but the
    /// interest is applied on every call even for an already-delayed month,
    /// matching the stored balances of existing data. `paid_installments` is
    /// untouched: a delay postpones an installment, it never forgives one.
    pub fn delay(
        &mut self,
        purchase: InstallmentPurchase,
        month: MonthKey,
        interest: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<InstallmentPurchase> {
        if interest.is_negative() {
            return Err(EngineError::NegativeInterest { amount: interest });
        }

        let mut updated = purchase;
        updated.delayed_months.insert(month);
        updated.total_amount += interest;
        updated.accumulated_interest += interest;

        self.events.emit(Event::MonthDelayed {
            purchase_id: updated.id,
            month,
            interest,
            new_total: updated.total_amount,
            timestamp: time_provider.now(),
        });

        Ok(updated)
    }

    /// prepay future installments ahead of schedule
    ///
    /// `months_to_advance` is silently clamped to `[1, remaining]`, staying
    /// forgiving of UI rounding. the charge is the base monthly amount times
    /// the months advanced: accumulated interest is not charged here, unlike a
    /// regular payment, though it still resets to zero.
    pub fn anticipate(
        &mut self,
        purchase: InstallmentPurchase,
        months_to_advance: u32,
        time_provider: &SafeTimeProvider,
    ) -> (InstallmentPurchase, Option<LedgerEntry>) {
        if purchase.is_settled() {
            return (purchase, None);
        }

        let advanced = months_to_advance
            .max(1)
            .min(purchase.remaining_installments());
        let now = time_provider.now();
        let amount = purchase.monthly_amount().times(advanced);

        let mut updated = purchase;
        updated.paid_installments =
            (updated.paid_installments + advanced).min(updated.total_installments);
        updated.accumulated_interest = Money::ZERO;
        updated.last_payment_date = Some(now);

        let entry = LedgerEntry {
            description: updated.description.clone(),
            amount,
            category: EntryCategory::Installments,
            entry_type: EntryType::Expense,
            date: now,
            card: updated.card.clone(),
            paid_for: updated.paid_for.clone(),
        };

        self.events.emit(Event::InstallmentsAnticipated {
            purchase_id: updated.id,
            months_advanced: advanced,
            amount,
            paid_installments: updated.paid_installments,
            timestamp: now,
        });
        if updated.is_settled() {
            self.events.emit(Event::PurchaseSettled {
                purchase_id: updated.id,
                timestamp: now,
            });
        }

        (updated, Some(entry))
    }

    /// drain collected events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// shared single-installment transition, caller has already ruled out an
/// exhausted schedule
fn apply_payment(
    purchase: InstallmentPurchase,
    now: DateTime<Utc>,
) -> (InstallmentPurchase, Money) {
    let amount = purchase.monthly_amount() + purchase.accumulated_interest;

    let mut updated = purchase;
    updated.paid_installments = (updated.paid_installments + 1).min(updated.total_installments);
    updated.accumulated_interest = Money::ZERO;
    updated.last_payment_date = Some(now);

    (updated, amount)
}
