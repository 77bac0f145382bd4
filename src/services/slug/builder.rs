use super::tokenize::tokenize;
use super::validate::validate_with;
use super::{SlugOptions, SEPARATOR};

/// Join tokens and cut the result down to `max_length` characters on a token
/// boundary. A single token longer than the limit is cut mid-word.
pub fn build(tokens: &[String], max_length: usize) -> String {
    let separator = SEPARATOR.to_string();
    let joined = tokens.join(separator.as_str());

    let Some((cut, _)) = joined.char_indices().nth(max_length) else {
        return joined;
    };

    let head = &joined[..cut];
    if joined[cut..].starts_with(SEPARATOR) {
        return head.to_string();
    }

    match head.rfind(SEPARATOR) {
        Some(boundary) => head[..boundary].to_string(),
        None => head.to_string(),
    }
}

/// Slugify with the default limits (60 characters, 6 tokens).
pub fn slugify(text: &str) -> String {
    slugify_with(text, &SlugOptions::default())
}

/// Turn free text into a slug, or `""` when no valid slug can be derived.
pub fn slugify_with(text: &str, options: &SlugOptions) -> String {
    let tokens = tokenize(text, options.max_tokens);
    let slug = build(&tokens, options.max_length);

    if slug.is_empty() {
        return slug;
    }

    match validate_with(&slug, options) {
        Ok(()) => slug,
        Err(reason) => {
            tracing::trace!(%slug, %reason, "discarding slug that fails validation");
            String::new()
        }
    }
}
