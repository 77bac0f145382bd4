//! Slug engine: turns Arabic dream titles into short, SEO friendly URL
//! segments and checks existing segments against the publishing rules.
//!
//! Everything here is pure. Uniqueness against stored documents is the
//! caller's job, see [`crate::services::resolver`].

mod builder;
mod normalize;
mod tokenize;
mod validate;

pub use builder::{build, slugify, slugify_with};
pub use normalize::normalize;
pub use tokenize::{is_slug_char, is_stop_word, tokenize};
pub use validate::{validate, validate_with, InvalidSlug, Validation};

use serde::{Deserialize, Serialize};

pub const SEPARATOR: char = '-';
pub const MIN_TOKENS: usize = 2;
pub const DEFAULT_MAX_LENGTH: usize = 60;
pub const DEFAULT_MAX_TOKENS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugOptions {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for SlugOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}
