use crate::error::MathError;
use crate::math::raw_to_decimal;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token quantity in raw on-chain units together with its human-scale value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
    pub value: Decimal,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Result<Self, MathError> {
        Ok(Self {
            raw,
            decimals,
            value: raw_to_decimal(raw, decimals)?,
        })
    }

    pub fn zero(decimals: u8) -> Self {
        Self {
            raw: U256::zero(),
            decimals,
            value: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}
