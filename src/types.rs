use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::EngineError;

/// unique identifier for an installment purchase
pub type PurchaseId = Uuid;

/// a calendar month identified by year and zero-based month index
///
/// serializes to the stored `"<monthIndex>-<year>"` string form (zero-based
/// month, no padding), e.g. january 2024 is `"0-2024"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if month > 11 {
            return Err(EngineError::InvalidMonthKey {
                input: format!("{}-{}", month, year),
            });
        }
        Ok(Self { year, month })
    }

    /// month of the given calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// zero-based month index, 0 = january
    pub fn month(&self) -> u32 {
        self.month
    }

    /// the following calendar month
    pub fn next(&self) -> MonthKey {
        if self.month == 11 {
            MonthKey {
                year: self.year + 1,
                month: 0,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonthKey {
            input: s.to_string(),
        };
        let (month, year) = s.split_once('-').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> String {
        key.to_string()
    }
}

/// projected status of a purchase for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScheduleStatus {
    /// whether the month carries a due installment
    pub is_visible: bool,
    /// whether the month was explicitly marked delayed
    pub is_delayed: bool,
}

/// one purchase's due line for a materialized month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDue {
    pub purchase_id: PurchaseId,
    pub due_amount: Money,
    /// listed for visibility but excluded from the payable total
    pub is_delayed: bool,
}

/// all installments visible in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOverview {
    pub month: MonthKey,
    pub entries: Vec<MonthlyDue>,
    /// sum of dues over visible, non-delayed entries
    pub payable_total: Money,
}

/// ledger category for emitted entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    Installments,
}

/// ledger entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Expense,
}

/// transaction-log record emitted by settlement operations, persisted verbatim
/// by the caller's ledger store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub description: String,
    pub amount: Money,
    pub category: EntryCategory,
    pub entry_type: EntryType,
    pub date: DateTime<Utc>,
    pub card: Option<String>,
    pub paid_for: Option<String>,
}
