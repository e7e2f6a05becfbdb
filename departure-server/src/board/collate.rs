//! Locale-aware ordering of destination names.

use std::cmp::Ordering;
use std::fmt;

use icu_collator::{Collator, CollatorOptions, Numeric};
use icu_locid::Locale;

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "de";

/// String comparison for destination names.
///
/// Uses an ICU collator with numeric ordering switched on, so "Bus 9"
/// sorts before "Bus 10" and "Ödenpullach" sorts among the O's. When no
/// collator can be built the comparison falls back to Unicode scalar order.
pub struct Collation {
    collator: Option<Collator>,
}

impl Collation {
    /// Build a collation for a BCP-47 locale tag such as `de` or `de-AT`.
    pub fn for_locale(tag: &str) -> Self {
        let locale: Locale = match tag.parse() {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!(locale = tag, error = ?e, "invalid collation locale, using scalar order");
                return Self::scalar();
            }
        };

        let mut options = CollatorOptions::new();
        options.numeric = Some(Numeric::On);

        match Collator::try_new(&(&locale).into(), options) {
            Ok(collator) => Self {
                collator: Some(collator),
            },
            Err(e) => {
                tracing::warn!(locale = tag, error = ?e, "no collation data for locale, using scalar order");
                Self::scalar()
            }
        }
    }

    /// Plain Unicode scalar-value ordering.
    pub fn scalar() -> Self {
        Self { collator: None }
    }

    /// Compare two strings.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }

    /// Whether a locale tag parses as a BCP-47 locale.
    pub fn is_valid_locale(tag: &str) -> bool {
        tag.parse::<Locale>().is_ok()
    }
}

impl Default for Collation {
    fn default() -> Self {
        Self::for_locale(DEFAULT_LOCALE)
    }
}

impl fmt::Debug for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.collator.is_some() {
            "icu"
        } else {
            "scalar"
        };
        f.debug_struct("Collation").field("kind", &kind).finish()
    }
}
