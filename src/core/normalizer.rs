use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::LocationKey;

/// Business and legal terms stripped from names before comparison
pub const DEFAULT_STOP_TERMS: &[&str] = &[
    "hotel", "hotels", "restaurant", "restaurants", "ristorante", "gasthaus", "gasthof",
    "garni", "sarl", "sa", "ag", "gmbh", "kg", "ltd", "inc",
];

/// Canonicalizes raw text fields for both record types
///
/// Pure and deterministic: the stop-term set is fixed at construction.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stop_terms: HashSet<String>,
}

impl Normalizer {
    /// Build a normalizer; stop terms are folded the same way as input text
    pub fn new<I, S>(stop_terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_terms = stop_terms
            .into_iter()
            .flat_map(|term| fold(term.as_ref()))
            .collect();

        Self { stop_terms }
    }

    pub fn with_default_stop_terms() -> Self {
        Self::new(DEFAULT_STOP_TERMS)
    }

    /// Normalize a raw name
    ///
    /// Lower-cases, strips diacritics and punctuation, drops stop terms and
    /// collapses whitespace. Blank input yields an empty string, which callers
    /// treat as unmatchable. A name made only of stop terms keeps its folded
    /// tokens instead of vanishing.
    pub fn normalize(&self, raw: &str) -> String {
        let tokens = fold(raw);

        let kept: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|token| !self.stop_terms.contains(*token))
            .collect();

        if kept.is_empty() {
            tokens.join(" ")
        } else {
            kept.join(" ")
        }
    }

    /// Derive the bucket key for a city / postal code pair
    ///
    /// The folded city is the primary key. The postal code is only used when
    /// the city folds to nothing.
    pub fn location_key(&self, city: &str, postal_code: Option<&str>) -> LocationKey {
        let city = fold(city).join(" ");
        if !city.is_empty() {
            return LocationKey::City(city);
        }

        let code: String = postal_code
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if code.is_empty() {
            LocationKey::Unknown
        } else {
            LocationKey::PostalCode(code)
        }
    }

    pub fn stop_terms(&self) -> impl Iterator<Item = &str> {
        self.stop_terms.iter().map(String::as_str)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_default_stop_terms()
    }
}

/// Lower-case, de-accent and tokenize, without stop-term removal
fn fold(raw: &str) -> Vec<String> {
    let mut folded = String::with_capacity(raw.len());
    // letters since the last separator or swallowed abbreviation dot
    let mut segment = 0usize;
    let mut last_alphabetic = false;

    for c in raw.nfkd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            // elisions: "L'Ours" -> "lours"
            '\'' | '\u{2019}' => continue,
            // single-letter abbreviations: "S.A." -> "sa", but "St.Moritz" -> "st moritz"
            '.' if segment == 1 && last_alphabetic => {
                segment = 0;
                continue;
            }
            'ß' => folded.push_str("ss"),
            'æ' | 'Æ' => folded.push_str("ae"),
            'œ' | 'Œ' => folded.push_str("oe"),
            'ø' | 'Ø' => folded.push('o'),
            'ł' | 'Ł' => folded.push('l'),
            c if c.is_alphanumeric() => folded.extend(c.to_lowercase()),
            _ => {
                folded.push(' ');
                segment = 0;
                last_alphabetic = false;
                continue;
            }
        }
        segment += 1;
        last_alphabetic = c.is_alphabetic();
    }

    folded.split_whitespace().map(str::to_string).collect()
}
