//! Currency amounts carried by order notifications.

use std::fmt;
use std::str::FromStr;

use super::EnvelopeValidationError;

/// Minor units (paise) per major unit (rupee).
const MINOR_UNITS_PER_MAJOR: u64 = 100;
/// Maximum number of fractional digits accepted when parsing.
pub const AMOUNT_MAX_FRACTION_DIGITS: usize = 2;

/// Positive currency amount stored as integer minor units.
///
/// ## Invariants
/// - The value is strictly positive.
/// - No fractional precision beyond two digits is ever represented, so the
///   rendered amount is exactly what the caller supplied.
///
/// # Examples
/// ```
/// use notifier::domain::Amount;
///
/// let amount: Amount = "499".parse().expect("valid amount");
/// assert_eq!(amount.minor_units(), 49_900);
/// assert_eq!(amount.to_string(), "499.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    minor_units: u64,
}

impl Amount {
    /// Construct an amount from minor units, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeValidationError::NonPositiveAmount`] for zero.
    pub const fn from_minor_units(minor_units: u64) -> Result<Self, EnvelopeValidationError> {
        if minor_units == 0 {
            return Err(EnvelopeValidationError::NonPositiveAmount);
        }
        Ok(Self { minor_units })
    }

    /// Value in minor units.
    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.minor_units
    }

    fn parse_digits(raw: &str, original: &str) -> Result<u64, EnvelopeValidationError> {
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(EnvelopeValidationError::MalformedAmount {
                value: original.to_owned(),
            });
        }
        raw.parse::<u64>()
            .map_err(|_| EnvelopeValidationError::AmountOutOfRange)
    }
}

impl FromStr for Amount {
    type Err = EnvelopeValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EnvelopeValidationError::EmptyAmount);
        }
        if let Some(magnitude) = trimmed.strip_prefix('-') {
            // Reject well-formed negatives distinctly from garbage input.
            return match magnitude.parse::<Self>() {
                Ok(_)
                | Err(
                    EnvelopeValidationError::NonPositiveAmount
                    | EnvelopeValidationError::AmountTooPrecise { .. },
                ) => {
                    Err(EnvelopeValidationError::NonPositiveAmount)
                }
                Err(_) => Err(EnvelopeValidationError::MalformedAmount {
                    value: trimmed.to_owned(),
                }),
            };
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (trimmed, None),
        };

        let major = Self::parse_digits(whole, trimmed)?;
        let minor = match fraction {
            None => 0,
            Some(digits) => {
                let count = digits.chars().count();
                if count > AMOUNT_MAX_FRACTION_DIGITS
                    && digits.chars().all(|c| c.is_ascii_digit())
                {
                    return Err(EnvelopeValidationError::AmountTooPrecise {
                        max_fraction_digits: AMOUNT_MAX_FRACTION_DIGITS,
                    });
                }
                let parsed = Self::parse_digits(digits, trimmed)?;
                if count == 1 {
                    parsed.saturating_mul(10)
                } else {
                    parsed
                }
            }
        };

        let minor_units = major
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .and_then(|units| units.checked_add(minor))
            .ok_or(EnvelopeValidationError::AmountOutOfRange)?;
        Self::from_minor_units(minor_units)
    }
}

impl TryFrom<&str> for Amount {
    type Error = EnvelopeValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.minor_units.div_euclid(MINOR_UNITS_PER_MAJOR);
        let minor = self.minor_units.rem_euclid(MINOR_UNITS_PER_MAJOR);
        write!(f, "{major}.{minor:02}")
    }
}
