//! Bet sizing grammar parsing and validation.
//!
//! Accepts comma-separated mixes of:
//! - `Xc` - fixed chip amount (e.g. "150c")
//! - `X%` - percentage of the current pot (e.g. "50%")
//! - `Xx` - multiple of the previous bet, raises only (e.g. "2x")
//! - `NeM` - geometric sizing over N remaining streets up to a pot multiple
//!   cap of M; either side of the `e` may be omitted (e.g. "e", "2e", "1e2")
//! - `allin` / `a` - shove
//!
//! Validation is per-token and short-circuits on the first invalid token.
//! An empty string is a distinct [`Validity::Empty`] outcome meaning "not
//! yet configured", never an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single parsed bet size token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BetToken {
    /// Fixed chip amount: "150c".
    Constant(f64),

    /// Percentage of the current pot: "50%".
    Percentage(f64),

    /// Multiple of the previous bet, raises only: "2x".
    Scaled(f64),

    /// Geometric sizing across remaining streets: "e", "2e", "1e2".
    /// `streets` unset means "use default"; `pot_cap` unset means uncapped.
    Geometric {
        streets: Option<u32>,
        pot_cap: Option<f64>,
    },

    /// Shove: "allin" or "a".
    AllIn,
}

/// An ordered list of bet size tokens for one (side, street, bet|raise) slot.
///
/// Empty means "no custom size configured".
pub type BetSpec = Vec<BetToken>;

/// Bet grammar error taxonomy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BetError {
    /// No tokens at all - "not yet configured", distinct from invalid.
    #[error("no bet sizes entered")]
    EmptyInput,

    /// Syntax violates the grammar.
    #[error("{0}")]
    MalformedToken(String),

    /// Numerically out of range (negative amount, street count outside 1-100).
    #[error("{0}")]
    OutOfRangeNumeric(String),
}

/// Validation outcome for redisplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// Nothing entered.
    Empty,
    /// Every token parses.
    Valid,
    /// At least one token is malformed or out of range.
    Invalid,
}

/// Result of [`validate_bets`]: parsed tokens plus display text.
///
/// For [`Validity::Valid`], `message` holds the canonicalized comma-joined
/// token text for redisplay; for [`Validity::Invalid`] it holds the first
/// error found.
#[derive(Debug, Clone, PartialEq)]
pub struct BetValidation {
    pub tokens: Option<BetSpec>,
    pub validity: Validity,
    pub message: String,
}

/// Parse a comma-separated bet size string.
///
/// `is_raise` controls whether the scaled (`Xx`) form is permitted.
/// Returns [`BetError::EmptyInput`] when no tokens remain after trimming.
pub fn parse_bet_spec(text: &str, is_raise: bool) -> Result<BetSpec, BetError> {
    let tokens = canonical_tokens(text);
    if tokens.is_empty() {
        return Err(BetError::EmptyInput);
    }

    tokens
        .iter()
        .map(|token| parse_token(token, is_raise))
        .collect()
}

/// Validate a bet size string, producing tokens plus redisplay text.
pub fn validate_bets(text: &str, is_raise: bool) -> BetValidation {
    match parse_bet_spec(text, is_raise) {
        Ok(tokens) => BetValidation {
            tokens: Some(tokens),
            validity: Validity::Valid,
            message: canonical_tokens(text).join(", "),
        },
        Err(BetError::EmptyInput) => BetValidation {
            tokens: None,
            validity: Validity::Empty,
            message: String::new(),
        },
        Err(err) => BetValidation {
            tokens: None,
            validity: Validity::Invalid,
            message: err.to_string(),
        },
    }
}

/// Split on commas, trim, lowercase, drop empties.
fn canonical_tokens(text: &str) -> Vec<String> {
    text.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_token(token: &str, is_raise: bool) -> Result<BetToken, BetError> {
    if token == "allin" || token == "a" {
        return Ok(BetToken::AllIn);
    }

    // Geometric takes precedence over the suffix forms: any token containing
    // an 'e' is interpreted as "<streets>e<pot cap>".
    if token.contains('e') {
        return parse_geometric(token);
    }

    // Tokens are non-empty after tokenization.
    let last = token.chars().last().unwrap_or(' ');
    let prefix = &token[..token.len() - last.len_utf8()];

    match last {
        'x' => {
            if !is_raise {
                return Err(BetError::MalformedToken(
                    "Scaled Bet: Can only use 'x' for raises".to_string(),
                ));
            }
            let mult = parse_amount(prefix, "Scaled Bet")?;
            Ok(BetToken::Scaled(mult))
        }
        'c' => {
            let amount = parse_amount(prefix, "Constant Bet")?;
            Ok(BetToken::Constant(amount))
        }
        '%' => {
            let pct = parse_amount(prefix, "Percentage Bet")?;
            Ok(BetToken::Percentage(pct))
        }
        _ => Err(BetError::MalformedToken(format!(
            "Invalid {}: Must end in 'x', 'c', or '%' or be 'allin'/'a'. Found: {}",
            if is_raise { "Raise" } else { "Bet" },
            last
        ))),
    }
}

/// Parse "<streets>e<pot cap>" around the first 'e'; either side may be
/// omitted to mean "use default".
fn parse_geometric(token: &str) -> Result<BetToken, BetError> {
    let (before, after) = token.split_once('e').unwrap_or((token, ""));

    let streets = if before.is_empty() {
        None
    } else {
        let n: f64 = before.parse().map_err(|_| {
            BetError::MalformedToken(format!(
                "Geometric Bet: Number of streets must be an integer between 1 and 100. Found: {}",
                before
            ))
        })?;
        if n.fract() != 0.0 || !(1.0..=100.0).contains(&n) {
            return Err(BetError::OutOfRangeNumeric(format!(
                "Geometric Bet: Number of streets must be an integer between 1 and 100. Found: {}",
                before
            )));
        }
        Some(n as u32)
    };

    let pot_cap = if after.is_empty() {
        None
    } else {
        let cap: f64 = after.parse().map_err(|_| {
            BetError::MalformedToken(format!(
                "Geometric Bet: Maximum pot limit must be a number. Found: {}",
                after
            ))
        })?;
        Some(cap)
    };

    Ok(BetToken::Geometric { streets, pot_cap })
}

/// Parse a non-negative, finite numeric prefix.
fn parse_amount(prefix: &str, what: &str) -> Result<f64, BetError> {
    let n = prefix
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            BetError::MalformedToken(format!(
                "{}: Must be a non-negative number. Found: {}",
                what, prefix
            ))
        })?;
    if n < 0.0 {
        return Err(BetError::OutOfRangeNumeric(format!(
            "{}: Cannot be negative. Found: {}",
            what, prefix
        )));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_basic_suffixes() {
        assert_eq!(validate_bets("50%", false).validity, Validity::Valid);
        assert_eq!(validate_bets("150c", false).validity, Validity::Valid);
        assert_eq!(validate_bets("allin", false).validity, Validity::Valid);
        assert_eq!(validate_bets("a", false).validity, Validity::Valid);
    }

    #[test]
    fn test_scaled_raise_only() {
        assert_eq!(validate_bets("2x", false).validity, Validity::Invalid);
        assert_eq!(validate_bets("2x", true).validity, Validity::Valid);
        assert_eq!(
            parse_bet_spec("2.5x", true).unwrap(),
            vec![BetToken::Scaled(2.5)]
        );
    }

    #[test]
    fn test_geometric_forms() {
        assert_eq!(
            parse_bet_spec("e", true).unwrap(),
            vec![BetToken::Geometric {
                streets: None,
                pot_cap: None
            }]
        );
        assert_eq!(
            parse_bet_spec("2e", true).unwrap(),
            vec![BetToken::Geometric {
                streets: Some(2),
                pot_cap: None
            }]
        );
        let v = validate_bets("1e2", true);
        assert_eq!(v.validity, Validity::Valid);
        assert_eq!(
            v.tokens.unwrap(),
            vec![BetToken::Geometric {
                streets: Some(1),
                pot_cap: Some(2.0)
            }]
        );
    }

    #[test]
    fn test_geometric_street_bounds() {
        assert!(matches!(
            parse_bet_spec("0e", true),
            Err(BetError::OutOfRangeNumeric(_))
        ));
        assert!(matches!(
            parse_bet_spec("101e", true),
            Err(BetError::OutOfRangeNumeric(_))
        ));
        assert!(matches!(
            parse_bet_spec("2.5e", true),
            Err(BetError::OutOfRangeNumeric(_))
        ));
        assert!(matches!(
            parse_bet_spec("1ex", true),
            Err(BetError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_empty_is_distinct() {
        assert_eq!(validate_bets("", true).validity, Validity::Empty);
        assert_eq!(validate_bets("  ,  , ", true).validity, Validity::Empty);
        assert_eq!(parse_bet_spec("", false), Err(BetError::EmptyInput));
    }

    #[test]
    fn test_mixed_spec() {
        let spec = parse_bet_spec("allin, 150c , 50%, e", false).unwrap();
        assert_eq!(
            spec,
            vec![
                BetToken::AllIn,
                BetToken::Constant(150.0),
                BetToken::Percentage(50.0),
                BetToken::Geometric {
                    streets: None,
                    pot_cap: None
                },
            ]
        );
    }

    #[test]
    fn test_canonical_text() {
        let v = validate_bets(" Allin, 150C , 50% ", false);
        assert_eq!(v.validity, Validity::Valid);
        assert_eq!(v.message, "allin, 150c, 50%");
    }

    #[test]
    fn test_first_error_wins() {
        // The validator short-circuits on the first invalid token.
        let v = validate_bets("50%, 2x, 9q", false);
        assert_eq!(v.validity, Validity::Invalid);
        assert!(v.message.contains("Scaled Bet"), "got: {}", v.message);
    }

    #[test]
    fn test_bad_suffix_message() {
        let v = validate_bets("50", false);
        assert_eq!(v.validity, Validity::Invalid);
        assert!(v.message.contains("Must end in"), "got: {}", v.message);
    }

    #[test]
    fn test_bare_suffixes_rejected() {
        for t in ["c", "x", "%"] {
            assert!(matches!(
                parse_bet_spec(t, true),
                Err(BetError::MalformedToken(_))
            ));
        }
    }

    #[test]
    fn test_non_finite_amounts() {
        // "inf" and "nan" parse as f64 but are not usable sizes.
        assert!(matches!(
            parse_bet_spec("inf%", true),
            Err(BetError::MalformedToken(_))
        ));
        assert!(matches!(
            parse_bet_spec("nanc", true),
            Err(BetError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_negative_amounts() {
        assert!(matches!(
            parse_bet_spec("-50%", true),
            Err(BetError::OutOfRangeNumeric(_))
        ));
        assert!(matches!(
            parse_bet_spec("-1c", true),
            Err(BetError::OutOfRangeNumeric(_))
        ));
    }
}
