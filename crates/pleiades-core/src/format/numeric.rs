//! Numeric conventions of the legacy format.
//!
//! FORTRAN output packs scientific notation by dropping the exponent
//! marker (`8.807442000+05` means `8.807442e+05`); a sign immediately
//! after a digit or decimal point is an implied `E`. Values are parsed
//! through that normalization but stored as their original text, so the
//! packed spelling survives a write.

use crate::domain::{ParError, ParResult};
use std::borrow::Cow;

/// Parses a numeric token, accepting both plain and packed notation.
pub fn parse_fortran_f64(field: &'static str, text: &str) -> ParResult<f64> {
    let token = text.trim();
    normalize_exponent(token)
        .parse::<f64>()
        .map_err(|_| ParError::BadNumber {
            field,
            token: token.to_string(),
        })
}

pub fn parse_i32(field: &'static str, text: &str) -> ParResult<i32> {
    let token = text.trim();
    token.parse::<i32>().map_err(|_| ParError::BadNumber {
        field,
        token: token.to_string(),
    })
}

/// Abundance weights carry seven decimal places in a ten-column slot.
pub fn format_abundance(weight: f64) -> String {
    format!("{weight:.7}")
}

fn normalize_exponent(token: &str) -> Cow<'_, str> {
    if token.contains(['e', 'E']) {
        return Cow::Borrowed(token);
    }
    let bytes = token.as_bytes();
    for index in 1..bytes.len() {
        let current = bytes[index];
        if (current == b'+' || current == b'-')
            && (bytes[index - 1].is_ascii_digit() || bytes[index - 1] == b'.')
        {
            return Cow::Owned(format!("{}E{}", &token[..index], &token[index..]));
        }
    }
    Cow::Borrowed(token)
}

#[cfg(test)]
mod tests {
    use super::{format_abundance, parse_fortran_f64, parse_i32};

    #[test]
    fn packed_exponent_notation_is_normalized() {
        assert_eq!(
            parse_fortran_f64("resonance_energy", "8.807442000+05").unwrap(),
            880744.2
        );
        assert_eq!(
            parse_fortran_f64("resonance_energy", " 3.6700-5 ").unwrap(),
            3.67e-5
        );
        assert_eq!(
            parse_fortran_f64("resonance_energy", "-3.6700-5").unwrap(),
            -3.67e-5
        );
    }

    #[test]
    fn plain_and_explicit_notation_still_parse() {
        assert_eq!(parse_fortran_f64("spin", "  3.5").unwrap(), 3.5);
        assert_eq!(parse_fortran_f64("spin", "-1.0").unwrap(), -1.0);
        assert_eq!(parse_fortran_f64("mass_b", "1.008665e0").unwrap(), 1.008665);
        assert_eq!(parse_fortran_f64("mass_b", "2.3E+2").unwrap(), 230.0);
    }

    #[test]
    fn malformed_tokens_name_their_field() {
        let error = parse_fortran_f64("capture_width", "12..3").unwrap_err();
        assert!(error.to_string().contains("capture_width"));
        assert!(parse_i32("igroup", "x7").is_err());
    }

    #[test]
    fn abundance_rendering_matches_the_ten_column_slot() {
        assert_eq!(format_abundance(0.6), "0.6000000");
        assert_eq!(format_abundance(1.0), "1.0000000");
    }
}
