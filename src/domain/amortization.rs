//! Fixed-payment amortization used to price bank offers.

use crate::error::{LendingError, Result};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

pub const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(100);
pub const MIN_MONTHS: i64 = 1;
pub const MAX_MONTHS: i64 = 500;
pub const MIN_PRINCIPAL: Decimal = dec!(1);
pub const MAX_PRINCIPAL: Decimal = dec!(100000000);

/// Returns the monthly payment for a loan of `principal` repaid over `months`
/// at `annual_rate_percent`, rounded to cents.
///
/// Computes `principal * (r + r / ((1 + r)^months - 1))` with `r` the monthly rate.
/// A zero rate degenerates to straight-line repayment.
pub fn monthly_payment(
    annual_rate_percent: Decimal,
    months: i64,
    principal: Decimal,
) -> Result<Decimal> {
    if annual_rate_percent < Decimal::ZERO || annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
        return Err(LendingError::ValidationError(format!(
            "invalid interest: {annual_rate_percent} must be within 0..=100"
        )));
    }
    if !(MIN_MONTHS..=MAX_MONTHS).contains(&months) {
        return Err(LendingError::ValidationError(format!(
            "invalid duration: {months} months must be within 1..=500"
        )));
    }
    if principal < MIN_PRINCIPAL || principal > MAX_PRINCIPAL {
        return Err(LendingError::ValidationError(format!(
            "invalid loan amount: {principal} must be within 1..=100000000"
        )));
    }

    let periods = Decimal::from(months);
    let rate = annual_rate_percent / dec!(100) / dec!(12);
    if rate.is_zero() {
        return Ok((principal / periods).round_dp(2));
    }

    let growth = (Decimal::ONE + rate)
        .checked_powu(months as u64)
        .ok_or_else(|| LendingError::internal("amortization growth factor overflowed"))?;
    let denominator = growth - Decimal::ONE;
    let payment = principal * (rate + rate / denominator);
    Ok(payment.round_dp(2))
}
