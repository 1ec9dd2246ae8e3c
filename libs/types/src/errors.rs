//! Result codes and the validation error taxonomy
//!
//! Every public engine operation terminates in a `ResultCode`; the numeric
//! tags are wire-stable. `OrderError` captures pre-admission validation
//! failures; the engine folds it into `OrderInvalid`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Terminal outcome of a public operation, with wire-stable numeric tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    OrderAccepted,
    CancelAccepted,
    OrderValid,
    OrderNotExists,
    OrderInvalid,
    BOCCannotBook,
    FOKCannotFill,
    IOCCannotFill,
    MarketNoLiquidity,
    SystemError,
}

impl ResultCode {
    /// Numeric tag for on-wire stability
    pub fn code(&self) -> u8 {
        match self {
            ResultCode::OrderAccepted => 1,
            ResultCode::CancelAccepted => 2,
            ResultCode::OrderValid => 3,
            ResultCode::OrderNotExists => 11,
            ResultCode::OrderInvalid => 12,
            ResultCode::BOCCannotBook => 31,
            ResultCode::FOKCannotFill => 32,
            ResultCode::IOCCannotFill => 33,
            ResultCode::MarketNoLiquidity => 34,
            ResultCode::SystemError => 99,
        }
    }

    /// True for the accept-family codes
    pub fn is_accept(&self) -> bool {
        matches!(
            self,
            ResultCode::OrderAccepted | ResultCode::CancelAccepted | ResultCode::OrderValid
        )
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Pre-admission validation failures
///
/// None of these mutate the book.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("invalid volume: {0}")]
    InvalidVolume(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("order {order_id} already present")]
    Duplicate { order_id: String },

    #[error("order {order_id} not found")]
    NotFound { order_id: String },

    #[error("order is not in the prepared state: {status}")]
    NotPrepared { status: String },
}
