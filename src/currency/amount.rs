//! Fixed-point amount text format
//!
//! Atomic amounts are printed with exactly `number_of_decimal_places`
//! fractional digits, e.g. `12345` with two places is `"123.45"`.

use thiserror::Error;

use super::Currency;

/// Amount parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,
    #[error("Amount has {found} fractional digits, at most {max} allowed")]
    TooManyDecimals { found: usize, max: usize },
    #[error("Amount contains invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("Amount does not fit in 64 bits")]
    Overflow,
}

impl Currency {
    /// Format atomic units as a decimal string
    pub fn format_amount(&self, amount: u64) -> String {
        let places = self.params().number_of_decimal_places as usize;
        let digits = format!("{:0>width$}", amount, width = places + 1);
        if places == 0 {
            return digits;
        }
        let (whole, fraction) = digits.split_at(digits.len() - places);
        format!("{whole}.{fraction}")
    }

    /// Format a signed amount; negatives get a leading `-`
    pub fn format_signed_amount(&self, amount: i64) -> String {
        let formatted = self.format_amount(amount.unsigned_abs());
        if amount < 0 {
            format!("-{formatted}")
        } else {
            formatted
        }
    }

    /// Parse a decimal string into atomic units.
    ///
    /// Surrounding whitespace is ignored, as are trailing fractional zeros
    /// beyond the currency's precision.
    pub fn parse_amount(&self, text: &str) -> Result<u64, AmountError> {
        let places = self.params().number_of_decimal_places as usize;
        let mut text = text.trim();

        let mut digits = String::with_capacity(text.len() + places);
        let fraction_size = match text.find('.') {
            Some(point) => {
                while text.len() - point - 1 > places && text.ends_with('0') {
                    text = &text[..text.len() - 1];
                }
                let fraction_size = text.len() - point - 1;
                if fraction_size > places {
                    return Err(AmountError::TooManyDecimals {
                        found: fraction_size,
                        max: places,
                    });
                }
                digits.push_str(&text[..point]);
                digits.push_str(&text[point + 1..]);
                fraction_size
            }
            None => {
                digits.push_str(text);
                0
            }
        };

        if digits.is_empty() {
            return Err(AmountError::Empty);
        }
        if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(AmountError::InvalidCharacter(c));
        }

        digits.extend(std::iter::repeat('0').take(places - fraction_size));
        digits.parse::<u64>().map_err(|_| AmountError::Overflow)
    }
}
