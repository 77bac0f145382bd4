use super::{SlugOptions, MIN_TOKENS, SEPARATOR};
use serde::Serialize;
use thiserror::Error;

/// Why a slug was rejected. The `Display` text is the human readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSlug {
    #[error("empty")]
    Empty,
    #[error("slug is {length} characters long, maximum is {max}")]
    TooLong { length: usize, max: usize },
    #[error("slug has {count} token(s), minimum is {min}")]
    TooFewTokens { count: usize, min: usize },
    #[error("slug has {count} tokens, maximum is {max}")]
    TooManyTokens { count: usize, max: usize },
    #[error("duplicated phrase pattern")]
    DuplicatedPhrase,
    #[error("consecutive duplicate token '{0}'")]
    ConsecutiveDuplicate(String),
}

impl InvalidSlug {
    /// Stable identifier used when tallying failures across many records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong { .. } => "too_long",
            Self::TooFewTokens { .. } => "too_few_tokens",
            Self::TooManyTokens { .. } => "too_many_tokens",
            Self::DuplicatedPhrase => "duplicated_phrase",
            Self::ConsecutiveDuplicate(_) => "consecutive_duplicate",
        }
    }
}

/// Check `slug` against the publishing rules with the default limits.
pub fn validate(slug: &str) -> Result<(), InvalidSlug> {
    validate_with(slug, &SlugOptions::default())
}

pub fn validate_with(slug: &str, options: &SlugOptions) -> Result<(), InvalidSlug> {
    if slug.trim().is_empty() {
        return Err(InvalidSlug::Empty);
    }

    let length = slug.chars().count();
    if length > options.max_length {
        return Err(InvalidSlug::TooLong {
            length,
            max: options.max_length,
        });
    }

    let tokens: Vec<&str> = slug.split(SEPARATOR).filter(|t| !t.is_empty()).collect();
    let count = tokens.len();

    if count < MIN_TOKENS {
        return Err(InvalidSlug::TooFewTokens {
            count,
            min: MIN_TOKENS,
        });
    }
    if count > options.max_tokens {
        return Err(InvalidSlug::TooManyTokens {
            count,
            max: options.max_tokens,
        });
    }

    let half = count / 2;
    if half >= 2 && tokens[..half] == tokens[half..half * 2] {
        return Err(InvalidSlug::DuplicatedPhrase);
    }

    if let Some(pair) = tokens.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(InvalidSlug::ConsecutiveDuplicate(pair[0].to_string()));
    }

    Ok(())
}

/// Serializable verdict, the shape handed to API clients and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Validation {
    pub fn of(slug: &str) -> Self {
        validate(slug).into()
    }
}

impl From<Result<(), InvalidSlug>> for Validation {
    fn from(result: Result<(), InvalidSlug>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                reason: None,
            },
            Err(e) => Self {
                valid: false,
                reason: Some(e.to_string()),
            },
        }
    }
}
