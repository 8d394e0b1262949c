//! Error types for math and valuation.

use crate::entities::token::TokenId;
use primitive_types::U256;

/// Errors raised by the fixed-point math layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Tick outside `[MIN_TICK, MAX_TICK]`.
    #[error("tick {0} out of range")]
    InvalidTick(i32),
    /// Sqrt price is zero or outside the valid ratio bounds.
    #[error("invalid sqrt price {0}")]
    InvalidSqrtPrice(U256),
    /// Price cannot be represented as a decimal.
    #[error("price out of representable range")]
    PriceOutOfRange,
    /// Amount too large for a decimal.
    #[error("amount {0} exceeds decimal range")]
    AmountOverflow(U256),
    /// Intermediate overflow.
    #[error("arithmetic overflow")]
    Overflow,
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

/// Errors raised while valuing a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValuationError {
    /// The position snapshot is malformed or does not belong to the pool.
    #[error("invalid position {id}: {reason}")]
    InvalidPosition { id: U256, reason: String },
    /// The pool snapshot lacks a field needed for valuation.
    #[error("incomplete pool state: missing {0}")]
    IncompletePoolState(&'static str),
    /// Token metadata was not registered.
    #[error("unknown token {0}")]
    UnknownToken(TokenId),
    /// Math failure.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl ValuationError {
    pub(crate) fn invalid_position(id: U256, reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            id,
            reason: reason.into(),
        }
    }
}
