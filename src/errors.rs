use thiserror::Error;

use crate::decimal::Money;
use crate::types::PurchaseId;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid installment count: {count}")]
    InvalidInstallmentCount {
        count: u32,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("corrupt purchase record {id}: {message}")]
    CorruptRecord {
        id: PurchaseId,
        message: String,
    },

    #[error("negative interest amount: {amount}")]
    NegativeInterest {
        amount: Money,
    },

    #[error("invalid month key: {input}")]
    InvalidMonthKey {
        input: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
