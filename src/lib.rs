pub mod decimal;
pub mod errors;
pub mod events;
pub mod purchase;
pub mod schedule;
pub mod settlement;
pub mod types;

// re-export key types
pub use decimal::Money;
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use purchase::InstallmentPurchase;
pub use schedule::{month_installments, project, MAX_PROJECTION_MONTHS};
pub use settlement::SettlementEngine;
pub use types::{
    EntryCategory, EntryType, LedgerEntry, MonthKey, MonthOverview, MonthlyDue, PurchaseId,
    ScheduleStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
