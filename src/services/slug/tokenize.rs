use super::normalize::normalize;
use super::SEPARATOR;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Grammatical particles and SEO filler that never carry meaning in a slug.
/// Entries are stored in normalized form.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // prepositions
        "في", "من", "على", "الى", "عن",
        // conjunctions
        "و", "او", "ثم",
        // interrogatives
        "ما", "هل", "كيف", "ماذا", "لماذا", "اين", "متى",
        // filler
        "بالتفصيل", "دلالات", "معنى", "المنام", "ودلالات", "ومعنى",
        "المعنى", "الدلالات",
    ]
    .into_iter()
    .collect()
});

/// Stems that are dropped when glued to the `و` conjunction, on top of the
/// stop words themselves.
const WAW_STEMS: [&str; 2] = ["دلالات", "معنى"];

const WAW: char = 'و';

static TOKEN_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]+").expect("token boundary pattern is valid"));

/// Arabic-block code points that are punctuation rather than letters.
const ARABIC_PUNCTUATION: [char; 8] = [
    '\u{060C}', // ،
    '\u{061B}', // ؛
    '\u{061F}', // ؟
    '\u{066A}', // ٪
    '\u{066B}', // ٫
    '\u{066C}', // ٬
    '\u{066D}', // ٭
    '\u{06D4}', // ۔
];

/// Number signs, the letter mark and Quranic annotation marks. They are
/// dropped without splitting the word they are attached to.
fn is_annotation_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{0605}' | '\u{061C}' | '\u{0610}'..='\u{061A}' | '\u{06D6}'..='\u{06ED}'
    )
}

fn is_arabic_letter(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
        && !ARABIC_PUNCTUATION.contains(&c)
        && !is_annotation_mark(c)
}

/// Characters a slug token may contain.
pub fn is_slug_char(c: char) -> bool {
    is_arabic_letter(c) || c.is_ascii_alphanumeric()
}

fn is_kept(c: char) -> bool {
    is_slug_char(c) || c.is_whitespace() || c == SEPARATOR
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// `وما`, `ومعنى`: the conjunction glued onto a stop word or filler stem.
fn is_waw_prefixed_filler(token: &str) -> bool {
    if token.chars().count() <= 3 {
        return false;
    }
    match token.strip_prefix(WAW) {
        Some(rest) => is_stop_word(rest) || WAW_STEMS.contains(&rest),
        None => false,
    }
}

/// Produce the ordered, deduplicated, stop-word-free tokens of `text`,
/// keeping at most `max_tokens` of them.
pub fn tokenize(text: &str, max_tokens: usize) -> Vec<String> {
    let cleaned: String = normalize(text)
        .chars()
        .filter(|c| !is_annotation_mark(*c))
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for raw in TOKEN_BOUNDARY.split(&cleaned) {
        if raw.is_empty() {
            continue;
        }
        let token = raw.to_lowercase();

        if seen.contains(&token) {
            continue;
        }
        if is_stop_word(&token) || is_waw_prefixed_filler(&token) {
            continue;
        }

        seen.insert(token.clone());
        tokens.push(token);
    }

    tokens.truncate(max_tokens);
    tokens
}
