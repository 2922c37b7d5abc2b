//! Units - hex quantities in, decimal native-currency strings out

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum UnitsError {
    #[error("quantity must start with 0x: {0:?}")]
    MissingPrefix(String),
    #[error("quantity has no digits")]
    Empty,
    #[error("invalid hex quantity: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("quantity does not fit in 128 bits")]
    Overflow,
}

/// Parse an EIP-1474 hex quantity (`0x1bc16d674ec80000`) into smallest units.
pub fn parse_quantity(raw: &str) -> Result<u128, UnitsError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| UnitsError::MissingPrefix(raw.to_string()))?;
    if digits.is_empty() {
        return Err(UnitsError::Empty);
    }

    let padded = if digits.len() % 2 == 1 { format!("0{}", digits) } else { digits.to_string() };
    let bytes = hex::decode(padded)?;
    let significant: Vec<u8> = bytes.into_iter().skip_while(|b| *b == 0).collect();
    if significant.len() > 16 {
        return Err(UnitsError::Overflow);
    }
    Ok(significant.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b)))
}

/// Render smallest units as a decimal string with `decimals` places.
///
/// Always keeps one fractional digit and trims the rest: `0.0`, `1.5`, `12.0`.
pub fn format_units(amount: u128, decimals: u8) -> String {
    let decimals = decimals as usize;
    let digits = amount.to_string();
    let digits = if digits.len() <= decimals { format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits) } else { digits };

    let (whole, frac) = digits.split_at(digits.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() { format!("{}.0", whole) } else { format!("{}.{}", whole, frac) }
}

/// `0x1234...abcd` style display form (first 6, last 4).
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantities() {
        assert_eq!(parse_quantity("0x0"), Ok(0));
        assert_eq!(parse_quantity("0x1"), Ok(1));
        assert_eq!(parse_quantity("0x1bc16d674ec80000"), Ok(2_000_000_000_000_000_000));
        assert_eq!(parse_quantity("0X00ff"), Ok(255));
    }

    #[test]
    fn rejects_bad_quantities() {
        assert_eq!(parse_quantity("12"), Err(UnitsError::MissingPrefix("12".into())));
        assert_eq!(parse_quantity("0x"), Err(UnitsError::Empty));
        assert!(matches!(parse_quantity("0xzz"), Err(UnitsError::InvalidHex(_))));
        let too_big = format!("0x1{}", "0".repeat(32));
        assert_eq!(parse_quantity(&too_big), Err(UnitsError::Overflow));
        let max = format!("0x{}", "f".repeat(32));
        assert_eq!(parse_quantity(&max), Ok(u128::MAX));
    }

    #[test]
    fn invalid_hex_carries_decoder_error() {
        assert_eq!(
            parse_quantity("0xzz"),
            Err(UnitsError::InvalidHex(hex::FromHexError::InvalidHexCharacter { c: 'z', index: 0 }))
        );
    }

    #[test]
    fn formats_native_units() {
        assert_eq!(format_units(0, 18), "0.0");
        assert_eq!(format_units(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(format_units(2_000_000_000_000_000_000, 18), "2.0");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(123_450, 3), "123.45");
        assert_eq!(format_units(7, 0), "7.0");
    }

    #[test]
    fn shortens_addresses() {
        assert_eq!(short_address("0x1234567890123456789012345678901234567890"), "0x1234...7890");
        assert_eq!(short_address("0x1234"), "0x1234");
    }
}
