//! Rounding of monetary amounts to the currency's minor unit.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in the default currency's minor unit.
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// Rounds an amount to `scale` decimal places, half away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("3809.523809").unwrap(), 2).to_string(), "3809.52");
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap(), 2).to_string(), "0.13");
/// ```
pub fn round_money(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}
