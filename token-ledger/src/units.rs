//! Conversion between display units and base units
//!
//! Display amounts such as `"12.5"` are never represented as floats; they are
//! parsed digit by digit into base units scaled by `10^decimals`.

use crate::types::Amount;
use crate::{Error, Result};

/// `10^decimals` as a base-unit multiplier
pub fn unit(decimals: u8) -> Result<Amount> {
    10u128.checked_pow(u32::from(decimals)).ok_or_else(|| {
        Error::ArithmeticOverflow(format!("10^{} does not fit in 128 bits", decimals))
    })
}

/// Scale a whole number of display units into base units
pub fn scale(units: u64, decimals: u8) -> Result<Amount> {
    u128::from(units)
        .checked_mul(unit(decimals)?)
        .ok_or_else(|| {
            Error::ArithmeticOverflow(format!("{} units at {} decimals", units, decimals))
        })
}

/// Parse a decimal string (`"100"`, `"0.25"`) into base units
pub fn parse_units(value: &str, decimals: u8) -> Result<Amount> {
    let value = value.trim();
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(Error::InvalidArgument(format!("invalid amount {:?}", value)));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidArgument(format!("invalid amount {:?}", value)));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(Error::InvalidArgument(format!(
            "amount {:?} has more than {} fractional digits",
            value, decimals
        )));
    }

    let overflow = || Error::ArithmeticOverflow(format!("amount {:?} at {} decimals", value, decimals));

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| overflow())?
    };
    let mut base = whole_units.checked_mul(unit(decimals)?).ok_or_else(overflow)?;

    if !fraction.is_empty() {
        let padding = u8::try_from(usize::from(decimals) - fraction.len()).map_err(|_| overflow())?;
        let fraction_units = fraction.parse::<u128>().map_err(|_| overflow())?;
        let fraction_base = fraction_units
            .checked_mul(unit(padding)?)
            .ok_or_else(overflow)?;
        base = base.checked_add(fraction_base).ok_or_else(overflow)?;
    }

    Ok(base)
}

/// Render base units as a decimal string, keeping at least one fractional digit
pub fn format_units(amount: Amount, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let digits = amount.to_string();
    let decimals = usize::from(decimals);
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}
