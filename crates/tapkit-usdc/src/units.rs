//! Conversion between decimal amounts and token base units.

use crate::error::{UsdcError, UsdcResult};

/// Parses a decimal amount such as `"1.5"` into base units.
///
/// ```
/// use tapkit_usdc::to_base_units;
///
/// assert_eq!(to_base_units("1.5", 6).unwrap(), 1_500_000);
/// assert!(to_base_units("0.0000001", 6).is_err());
/// ```
pub fn to_base_units(amount: &str, decimals: u8) -> UsdcResult<u128> {
    let invalid = || UsdcError::InvalidAmount(amount.to_string());
    let trimmed = amount.trim();

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > usize::from(decimals) {
        return Err(invalid());
    }

    let scale = 10u128.checked_pow(u32::from(decimals)).ok_or_else(invalid)?;
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<width$}", width = usize::from(decimals));
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Formats base units as a decimal string without trailing zeros.
pub fn format_units(value: u128, decimals: u8) -> String {
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return value.to_string();
    }

    let digits = format!("{value:0>width$}", width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units("10", 6).unwrap(), 10_000_000);
        assert_eq!(to_base_units("0.000001", 6).unwrap(), 1);
        assert_eq!(to_base_units(".5", 6).unwrap(), 500_000);
        assert_eq!(to_base_units(" 2. ", 6).unwrap(), 2_000_000);
    }

    #[test]
    fn test_to_base_units_rejects() {
        for bad in ["", ".", "-1", "1e3", "abc", "1.2.3", "0.1234567"] {
            assert!(
                matches!(to_base_units(bad, 6), Err(UsdcError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(0, 6), "0");
        assert_eq!(format_units(1, 6), "0.000001");
        assert_eq!(format_units(1_500_000, 6), "1.5");
        assert_eq!(format_units(12_000_000, 6), "12");
        assert_eq!(format_units(42, 0), "42");
    }
}
