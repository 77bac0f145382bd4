//! Arabic orthographic normalization.
//!
//! Folds the variants that readers treat as the same letter so that
//! `أحلام` and `احلام` produce the same token.

const ALEF: char = '\u{0627}';
const HEH: char = '\u{0647}';
const TATWEEL: char = '\u{0640}';

/// Alef with hamza above, hamza below and madda.
const ALEF_VARIANTS: [char; 3] = ['\u{0623}', '\u{0625}', '\u{0622}'];

const TEH_MARBUTA: char = '\u{0629}';

/// Tashkeel: U+064B (Fathatan) through U+065F (Wavy hamza below).
#[inline]
fn is_tashkeel(c: char) -> bool {
    ('\u{064B}'..='\u{065F}').contains(&c)
}

/// Canonicalize Arabic text. Every other character passes through untouched.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if c == TATWEEL || is_tashkeel(c) {
            continue;
        }
        if ALEF_VARIANTS.contains(&c) {
            out.push(ALEF);
        } else if c == TEH_MARBUTA {
            out.push(HEH);
        } else {
            out.push(c);
        }
    }

    out
}
