//! Caller-side uniqueness for slugs.
//!
//! The slug engine never looks at stored documents. [`SlugPolicy::resolve`]
//! takes its output, substitutes an identifier-based fallback when it is
//! empty, and appends `-2`, `-3`, ... until the [`SlugRegistry`] reports a
//! free slug.

use crate::services::slug::{self, InvalidSlug, SlugOptions, SEPARATOR};
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_FALLBACK_PREFIX: &str = "تفسير-حلم";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Number of trailing identifier characters used in fallback slugs.
const FALLBACK_ID_CHARS: usize = 6;

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("document identifier has no usable characters, cannot build a fallback slug")]
    EmptyIdentifier,
    #[error("fallback slug '{slug}' is invalid: {reason}")]
    InvalidFallback { slug: String, reason: InvalidSlug },
    #[error("no free slug for '{base}' after {attempts} attempts")]
    Exhausted { base: String, attempts: u32 },
    #[error("slug registry lookup failed: {0}")]
    Registry(#[from] rusqlite::Error),
}

/// The set of slugs that are already spoken for.
pub trait SlugRegistry {
    fn is_taken(&mut self, slug: &str) -> Result<bool, SlugError>;

    /// Record `slug` as used. Stores with their own unique index may treat
    /// this as a no-op.
    fn claim(&mut self, slug: &str) -> Result<(), SlugError>;
}

impl SlugRegistry for HashSet<String> {
    fn is_taken(&mut self, slug: &str) -> Result<bool, SlugError> {
        Ok(self.contains(slug))
    }

    fn claim(&mut self, slug: &str) -> Result<(), SlugError> {
        self.insert(slug.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The slug to persist.
    pub slug: String,
    /// Engine output, or the fallback when the engine produced nothing.
    pub base: String,
    pub fallback: bool,
    pub collision: bool,
}

#[derive(Debug, Clone)]
pub struct SlugPolicy {
    pub options: SlugOptions,
    pub fallback_prefix: String,
    pub max_attempts: u32,
}

impl Default for SlugPolicy {
    fn default() -> Self {
        Self {
            options: SlugOptions::default(),
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SlugPolicy {
    /// `"{prefix}-{last six slug characters of id}"`, lowercased. Characters
    /// a slug may not carry are dropped from the id first.
    pub fn fallback_slug(&self, id: &str) -> Result<String, SlugError> {
        let kept: Vec<char> = slug::normalize(id)
            .to_lowercase()
            .chars()
            .filter(|c| slug::is_slug_char(*c))
            .collect();
        if kept.is_empty() {
            return Err(SlugError::EmptyIdentifier);
        }

        let tail: String = kept[kept.len().saturating_sub(FALLBACK_ID_CHARS)..]
            .iter()
            .collect();
        let fallback = format!(
            "{}{}{}",
            self.fallback_prefix.trim_matches(SEPARATOR),
            SEPARATOR,
            tail
        );

        if let Err(reason) = slug::validate_with(&fallback, &self.options) {
            return Err(SlugError::InvalidFallback {
                slug: fallback,
                reason,
            });
        }
        Ok(fallback)
    }

    pub fn resolve<R>(&self, text: &str, id: &str, registry: &mut R) -> Result<Resolution, SlugError>
    where
        R: SlugRegistry + ?Sized,
    {
        let generated = slug::slugify_with(text, &self.options);
        let fallback = generated.is_empty();
        let base = if fallback {
            tracing::debug!(id, "slug engine produced nothing, using fallback");
            self.fallback_slug(id)?
        } else {
            generated
        };

        if !registry.is_taken(&base)? {
            registry.claim(&base)?;
            return Ok(Resolution {
                slug: base.clone(),
                base,
                fallback,
                collision: false,
            });
        }

        for n in 2..self.max_attempts.saturating_add(2) {
            let Some(candidate) = self.suffixed(&base, n) else {
                break;
            };
            if slug::validate_with(&candidate, &self.options).is_err() {
                continue;
            }
            if registry.is_taken(&candidate)? {
                continue;
            }

            tracing::debug!(%base, %candidate, "slug collision resolved");
            registry.claim(&candidate)?;
            return Ok(Resolution {
                slug: candidate,
                base,
                fallback,
                collision: true,
            });
        }

        Err(SlugError::Exhausted {
            base,
            attempts: self.max_attempts,
        })
    }

    /// `base-n`, dropping trailing tokens of `base` until the suffix fits
    /// the token and length limits. `None` when nothing of `base` survives.
    fn suffixed(&self, base: &str, n: u32) -> Option<String> {
        let suffix = n.to_string();
        let mut tokens: Vec<&str> = base.split(SEPARATOR).filter(|t| !t.is_empty()).collect();

        loop {
            if tokens.is_empty() {
                return None;
            }
            let length: usize = tokens.iter().map(|t| t.chars().count()).sum::<usize>()
                + tokens.len()
                + suffix.len();
            if tokens.len() < self.options.max_tokens && length <= self.options.max_length {
                break;
            }
            tokens.pop();
        }

        let separator = SEPARATOR.to_string();
        Some(format!("{}{}{}", tokens.join(separator.as_str()), SEPARATOR, suffix))
    }
}
