use crate::domain::model::{CanonicalPhone, Region};
use crate::domain::ports::PhoneValidator;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
    Permissive,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "permissive" => Ok(ValidationMode::Permissive),
            other => Err(format!(
                "unknown phone validation mode '{}', expected strict or permissive",
                other
            )),
        }
    }
}

/// Whether the number-plan backend was compiled in.
pub fn strict_backend_available() -> bool {
    cfg!(feature = "strict-phone")
}

/// Picks the validator once, at startup. Asking for strict validation on a
/// build without the backend degrades to digits-only with a warning.
pub fn select_validator(mode: ValidationMode) -> Box<dyn PhoneValidator> {
    match mode {
        #[cfg(feature = "strict-phone")]
        ValidationMode::Strict => Box::new(StrictValidator),
        #[cfg(not(feature = "strict-phone"))]
        ValidationMode::Strict => {
            tracing::warn!(
                "⚠️ Number-plan validation is not available in this build, \
                 falling back to digits-only phone handling"
            );
            Box::new(PermissiveFallback)
        }
        ValidationMode::Permissive => Box::new(PermissiveFallback),
    }
}

/// Digits-only fallback. It assumes the country code is already part of the
/// input and performs no validity check: "12" passes, so does a landline
/// without its country code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveFallback;

impl PhoneValidator for PermissiveFallback {
    fn normalize(&self, raw: &str, _region: Region) -> CanonicalPhone {
        let digits: String = raw.trim().chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return CanonicalPhone::invalid();
        }
        CanonicalPhone::from_digits(digits)
    }

    fn name(&self) -> &'static str {
        "permissive"
    }
}

#[cfg(feature = "strict-phone")]
pub use strict::StrictValidator;

#[cfg(feature = "strict-phone")]
mod strict {
    use super::*;
    use phonenumber::country::Id;
    use phonenumber::{Mode, PhoneNumber};

    // Length bounds on any national significant number, whatever the country.
    const MIN_NATIONAL_DIGITS: usize = 2;
    const MAX_NATIONAL_DIGITS: usize = 17;

    /// Parses with the region as fallback country and accepts the number
    /// only when its length is plausible and it falls in an assigned range.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct StrictValidator;

    impl StrictValidator {
        /// Coarse, country-independent length bound. `phonenumber` exposes no
        /// per-region possible-length check, so the precise work is left to
        /// `phonenumber::is_valid`; this only rejects absurd lengths early.
        fn is_possible(number: &PhoneNumber) -> bool {
            let national_digits = number.national().value().to_string().len();
            (MIN_NATIONAL_DIGITS..=MAX_NATIONAL_DIGITS).contains(&national_digits)
        }
    }

    impl PhoneValidator for StrictValidator {
        fn normalize(&self, raw: &str, region: Region) -> CanonicalPhone {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return CanonicalPhone::invalid();
            }

            let number = match phonenumber::parse(Some(country_id(region)), trimmed) {
                Ok(number) => number,
                Err(e) => {
                    tracing::debug!("Could not parse phone {:?}: {:?}", trimmed, e);
                    return CanonicalPhone::invalid();
                }
            };

            if !Self::is_possible(&number) || !phonenumber::is_valid(&number) {
                tracing::debug!("Phone {:?} is not a valid {} number", trimmed, region);
                return CanonicalPhone::invalid();
            }

            let digits: String = number
                .format()
                .mode(Mode::E164)
                .to_string()
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            CanonicalPhone::from_digits(digits)
        }

        fn name(&self) -> &'static str {
            "strict"
        }
    }

    fn country_id(region: Region) -> Id {
        match region {
            Region::CO => Id::CO,
            Region::US => Id::US,
            Region::MX => Id::MX,
            Region::PE => Id::PE,
            Region::EC => Id::EC,
            Region::AR => Id::AR,
            Region::CL => Id::CL,
            Region::VE => Id::VE,
            Region::BR => Id::BR,
            Region::ES => Id::ES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_keeps_digits_only() {
        let validator = PermissiveFallback;
        assert_eq!(
            validator.normalize("(+57) 311-555-7788", Region::CO).as_str(),
            "573115557788"
        );
        assert_eq!(validator.normalize("  ", Region::CO), CanonicalPhone::invalid());
        assert_eq!(validator.normalize("no digits", Region::US), CanonicalPhone::invalid());
        // No plan check: a two digit string passes.
        assert!(validator.normalize("12", Region::CO).is_valid());
    }

    #[test]
    fn test_validation_mode_parsing() {
        assert_eq!("Strict".parse::<ValidationMode>().unwrap(), ValidationMode::Strict);
        assert_eq!(
            "permissive".parse::<ValidationMode>().unwrap(),
            ValidationMode::Permissive
        );
        assert!("loose".parse::<ValidationMode>().is_err());
    }

    #[test]
    fn test_select_permissive() {
        assert_eq!(select_validator(ValidationMode::Permissive).name(), "permissive");
    }

    #[cfg(feature = "strict-phone")]
    mod strict_backend {
        use super::*;

        #[test]
        fn test_formatting_noise_is_ignored() {
            let validator = StrictValidator;
            let inputs = [
                "3105226770",
                "310 522 6770",
                "310-522-6770",
                "(310) 522-6770",
                "+57 310 522 6770",
                "+57 310-522-6770",
                "+573105226770",
            ];
            for input in inputs {
                assert_eq!(
                    validator.normalize(input, Region::CO).as_str(),
                    "573105226770",
                    "input {:?}",
                    input
                );
            }
        }

        #[test]
        fn test_explicit_prefix_overrides_region() {
            let validator = StrictValidator;
            assert_eq!(
                validator.normalize("+1 650-253-0000", Region::CO).as_str(),
                "16502530000"
            );
            assert_eq!(
                validator.normalize("+573101234567", Region::US).as_str(),
                "573101234567"
            );
        }

        #[test]
        fn test_invalid_input_is_empty_not_error() {
            let validator = StrictValidator;
            for input in ["", "   ", "not-a-phone", "123", "+57 000"] {
                assert!(
                    !validator.normalize(input, Region::CO).is_valid(),
                    "input {:?}",
                    input
                );
            }
        }

        #[test]
        fn test_overlong_numbers_are_rejected() {
            let validator = StrictValidator;
            for input in ["+57 3105226770123456789", "31052267701234567890"] {
                assert!(
                    !validator.normalize(input, Region::CO).is_valid(),
                    "input {:?}",
                    input
                );
            }
        }

        #[test]
        fn test_select_strict() {
            assert!(strict_backend_available());
            assert_eq!(select_validator(ValidationMode::Strict).name(), "strict");
        }
    }
}
