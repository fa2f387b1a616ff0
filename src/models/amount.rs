//! Positive decimal checks shared by the money-carrying models.
//!
//! Constructors call [`ensure_positive`] and serde goes through
//! [`deserialize_positive`], so a zero or negative amount cannot enter the
//! store from a request body or a seed file.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};

use crate::error::{PayrollError, PayrollResult};

/// Returns `value` if it is greater than zero.
pub(crate) fn ensure_positive(field: &'static str, value: Decimal) -> PayrollResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(PayrollError::InvalidAmount { field, value });
    }
    Ok(value)
}

pub(crate) fn deserialize_positive<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = <Decimal as Deserialize>::deserialize(deserializer)?;
    if value <= Decimal::ZERO {
        return Err(de::Error::custom(format!(
            "expected a value greater than zero, got {}",
            value
        )));
    }
    Ok(value)
}
