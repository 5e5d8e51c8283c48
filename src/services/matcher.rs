//! Condition matcher
//!
//! A [`Matcher`] is one compiled predicate: an operator, its needle and the
//! negation flag. Both sides are compared lower-cased. Negation is spelled
//! out per operator; `ignore` matches regardless of it.

use regex::{Regex, RegexBuilder};

use crate::models::MatchOperator;
use crate::utils::{AppError, AppResult};

/// Compiled form of the needle
#[derive(Debug, Clone)]
enum Predicate {
    Always,
    Equal(String),
    Contains(String),
    InList(Vec<String>),
    StartsWith(String),
    EndsWith(String),
    Pattern(Regex),
    Bool(bool),
}

/// A predicate ready to be applied to many values
#[derive(Debug, Clone)]
pub struct Matcher {
    operator: MatchOperator,
    predicate: Predicate,
    negate: bool,
}

impl Matcher {
    /// Compile `needle` for `operator`
    ///
    /// Fails for patterns that do not compile and for `bool` needles that are
    /// neither `true` nor `false`.
    pub fn new(operator: MatchOperator, needle: &str, negate: bool) -> AppResult<Self> {
        let lowered = needle.to_lowercase();
        let predicate = match operator {
            MatchOperator::Ignore => Predicate::Always,
            MatchOperator::Equal => Predicate::Equal(lowered),
            MatchOperator::In => Predicate::Contains(lowered),
            MatchOperator::InList => {
                Predicate::InList(lowered.split(',').map(|t| t.trim().to_string()).collect())
            }
            MatchOperator::StartsWith => Predicate::StartsWith(lowered),
            MatchOperator::EndsWith => Predicate::EndsWith(lowered),
            MatchOperator::Regex => {
                // Anchored at the start only, like a match and unlike a search
                let regex = RegexBuilder::new(&format!("^(?:{})", needle))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| AppError::InvalidPattern {
                        pattern: needle.to_string(),
                        reason: e.to_string(),
                    })?;
                Predicate::Pattern(regex)
            }
            MatchOperator::Bool => match make_bool(needle) {
                Some(b) => Predicate::Bool(b),
                None => {
                    return Err(AppError::InvalidPattern {
                        pattern: needle.to_string(),
                        reason: "expected 'true' or 'false'".to_string(),
                    })
                }
            },
        };

        Ok(Self {
            operator,
            predicate,
            negate,
        })
    }

    pub fn operator(&self) -> MatchOperator {
        self.operator
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// Apply the predicate to `value`
    pub fn is_match(&self, value: &str) -> bool {
        let negate = self.negate;
        let lowered = || value.to_lowercase();
        match &self.predicate {
            Predicate::Always => true,
            Predicate::Equal(needle) => {
                if negate {
                    lowered() != *needle
                } else {
                    lowered() == *needle
                }
            }
            Predicate::Contains(needle) => {
                if negate {
                    !lowered().contains(needle.as_str())
                } else {
                    lowered().contains(needle.as_str())
                }
            }
            Predicate::InList(tokens) => {
                let value = lowered();
                if negate {
                    tokens.iter().all(|t| *t != value)
                } else {
                    tokens.iter().any(|t| *t == value)
                }
            }
            Predicate::StartsWith(needle) => {
                if negate {
                    !lowered().starts_with(needle.as_str())
                } else {
                    lowered().starts_with(needle.as_str())
                }
            }
            Predicate::EndsWith(needle) => {
                if negate {
                    !lowered().ends_with(needle.as_str())
                } else {
                    lowered().ends_with(needle.as_str())
                }
            }
            Predicate::Pattern(regex) => {
                if negate {
                    !regex.is_match(&lowered())
                } else {
                    regex.is_match(&lowered())
                }
            }
            Predicate::Bool(needle) => match make_bool(value) {
                Some(value) if negate => value != *needle,
                Some(value) => value == *needle,
                // A value that is not a boolean never equals the needle
                None => negate,
            },
        }
    }
}

/// Parse a boolean the way rule documents spell them
pub fn make_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// One-shot match of `value` against `needle`
pub fn match_value(
    value: &str,
    needle: &str,
    operator: MatchOperator,
    negate: bool,
) -> AppResult<bool> {
    Ok(Matcher::new(operator, needle, negate)?.is_match(value))
}

/// One-shot match with the operator given by name
pub fn match_named(value: &str, needle: &str, operator: &str, negate: bool) -> AppResult<bool> {
    match_value(value, needle, operator.parse()?, negate)
}
