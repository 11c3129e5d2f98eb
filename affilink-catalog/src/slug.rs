//! Slug validation and generation.
//!
//! A slug is a run of lowercase ASCII letters, digits and single hyphens
//! that neither starts nor ends with a hyphen. [`validate_format`] checks
//! exactly that; [`SlugRules`] layers a length bound and a reserved-word
//! list on top and owns collision resolution.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{ValidationError, ValidationReason};
use crate::types::Table;

/// Upper bound on slug length, used by [`derive`] and the default rules.
pub const MAX_SLUG_LEN: usize = 100;

/// Words that would shadow routes on the storefront or affiliate plugin.
pub const DEFAULT_RESERVED: &[&str] = &[
    "admin",
    "api",
    "www",
    "mail",
    "ftp",
    "localhost",
    "root",
    "slicewp",
    "affiliate",
    "wp-admin",
    "wp-content",
    "wp-includes",
];

/// Check the structural format of a slug.
pub fn validate_format(candidate: &str) -> Result<(), ValidationError> {
    let reason = if candidate.is_empty() {
        ValidationReason::Empty
    } else if !candidate
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        ValidationReason::InvalidCharacters
    } else if candidate.starts_with('-') || candidate.ends_with('-') {
        ValidationReason::EdgeHyphen
    } else if candidate.contains("--") {
        ValidationReason::ConsecutiveHyphens
    } else {
        return Ok(());
    };
    Err(ValidationError::new(candidate, reason))
}

/// True if no record other than `exclude_id` holds `candidate` (ignoring case).
pub fn is_unique(candidate: &str, table: &Table, exclude_id: Option<&str>) -> bool {
    table.slug_owner(candidate, exclude_id).is_none()
}

/// Derive a slug candidate from a display name.
///
/// Lowercases, decomposes to NFKD and drops combining marks so composed
/// and decomposed spellings agree, folds the few Latin letters that have
/// no decomposition, turns every other non-alphanumeric run into one
/// hyphen, trims hyphens, and caps the result at [`MAX_SLUG_LEN`]. May
/// return an empty string when the name has no usable characters.
pub fn derive(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let lowered = name.to_lowercase();
    for ch in lowered.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if let Some(ascii) = fold_letter(ch) {
            slug.push_str(ascii);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    truncate_slug(&slug, MAX_SLUG_LEN).to_string()
}

/// Resolve `candidate` against `table` using the default rules.
pub fn resolve_collision(candidate: &str, table: &Table) -> Result<String, ValidationError> {
    SlugRules::default().resolve_collision(candidate, table)
}

/// Cut an ASCII slug to `max` bytes and drop any trailing hyphens.
fn truncate_slug(slug: &str, max: usize) -> &str {
    let cut = if slug.len() > max { &slug[..max] } else { slug };
    cut.trim_end_matches('-')
}

fn with_suffix(base: &str, n: usize, max_len: usize) -> String {
    let suffix = format!("-{n}");
    let stem = truncate_slug(base, max_len.saturating_sub(suffix.len()));
    format!("{stem}{suffix}")
}

/// Letters NFKD leaves intact.
fn fold_letter(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'ø' => "o",
        'ł' => "l",
        'đ' | 'ð' => "d",
        'þ' => "th",
        'ı' => "i",
        'ħ' => "h",
        'ŧ' => "t",
        _ => return None,
    };
    Some(folded)
}

// ── Policy ──────────────────────────────────────────────────────────────────

/// Slug policy applied on top of [`validate_format`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugRules {
    pub min_len: usize,
    pub max_len: usize,
    /// Compared case-insensitively.
    pub reserved: Vec<String>,
}

impl Default for SlugRules {
    fn default() -> Self {
        Self {
            min_len: 1,
            max_len: MAX_SLUG_LEN,
            reserved: DEFAULT_RESERVED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SlugRules {
    /// Rules with only the format check and the default length cap.
    pub fn permissive() -> Self {
        Self {
            reserved: Vec::new(),
            ..Self::default()
        }
    }

    /// Format check plus length bounds and reserved words.
    pub fn validate(&self, candidate: &str) -> Result<(), ValidationError> {
        validate_format(candidate)?;
        let len = candidate.len();
        if len < self.min_len {
            return Err(ValidationError::new(
                candidate,
                ValidationReason::TooShort { min: self.min_len },
            ));
        }
        if len > self.max_len {
            return Err(ValidationError::new(
                candidate,
                ValidationReason::TooLong { max: self.max_len },
            ));
        }
        if self.is_reserved(candidate) {
            return Err(ValidationError::new(candidate, ValidationReason::Reserved));
        }
        Ok(())
    }

    pub fn is_reserved(&self, candidate: &str) -> bool {
        self.reserved
            .iter()
            .any(|word| word.eq_ignore_ascii_case(candidate))
    }

    /// Full acceptance check for assigning `candidate` to `record_id`.
    pub fn check_assignable(
        &self,
        candidate: &str,
        table: &Table,
        record_id: &str,
    ) -> Result<(), ValidationError> {
        self.validate(candidate)?;
        match table.slug_owner(candidate, Some(record_id)) {
            Some(owner) => Err(ValidationError::new(
                candidate,
                ValidationReason::Taken {
                    owner: owner.to_string(),
                },
            )),
            None => Ok(()),
        }
    }

    /// Find a free slug starting from `candidate`, suffixing `-2`, `-3`, ...
    pub fn resolve_collision(
        &self,
        candidate: &str,
        table: &Table,
    ) -> Result<String, ValidationError> {
        self.resolve_among(candidate, &table.slug_set(None))
    }

    /// Like [`Self::resolve_collision`], against an explicit set of taken
    /// lowercase slugs.
    ///
    /// Reserved or out-of-bounds attempts are skipped like taken ones. Tries
    /// at most `taken.len() + 2` values; suffixed attempts are pairwise
    /// distinct, so one of them is always free when the policy allows any.
    pub fn resolve_among(
        &self,
        candidate: &str,
        taken: &HashSet<String>,
    ) -> Result<String, ValidationError> {
        validate_format(candidate)?;
        let base = truncate_slug(candidate, self.max_len);
        let mut last_err = None;

        for n in 1..=taken.len() + 2 {
            let attempt = if n == 1 {
                base.to_string()
            } else {
                with_suffix(base, n, self.max_len)
            };
            match self.validate(&attempt) {
                Ok(()) if !taken.contains(&attempt) => return Ok(attempt),
                Ok(()) => {}
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ValidationError::new(
                candidate,
                ValidationReason::Exhausted {
                    attempts: taken.len() + 2,
                },
            )
        }))
    }

    /// Derive a slug from `name` and make it unique within `table`.
    ///
    /// The slug currently held by `exclude_id` does not count as taken.
    /// Returns `None` when the name yields nothing usable.
    pub fn suggest(&self, name: &str, table: &Table, exclude_id: Option<&str>) -> Option<String> {
        let candidate = derive(name);
        if candidate.is_empty() {
            return None;
        }
        self.resolve_among(&candidate, &table.slug_set(exclude_id)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn reason(candidate: &str) -> ValidationReason {
        validate_format(candidate).unwrap_err().reason
    }

    #[test]
    fn test_validate_format_reasons() {
        assert!(validate_format("top-5-starterkit").is_ok());
        assert_eq!(reason(""), ValidationReason::Empty);
        assert_eq!(reason("Bad Slug!"), ValidationReason::InvalidCharacters);
        assert_eq!(reason("Widget"), ValidationReason::InvalidCharacters);
        assert_eq!(reason("-widget"), ValidationReason::EdgeHyphen);
        assert_eq!(reason("widget-"), ValidationReason::EdgeHyphen);
        assert_eq!(reason("wid--get"), ValidationReason::ConsecutiveHyphens);
    }

    #[test]
    fn test_derive_basic() {
        assert_eq!(derive("Top 5 Starterkit"), "top-5-starterkit");
        assert_eq!(derive("Widget"), "widget");
        assert_eq!(derive("  --Hello,  World!! "), "hello-world");
        assert_eq!(derive("!!!"), "");
        assert_eq!(derive(""), "");
    }

    #[test]
    fn test_derive_folds_diacritics() {
        assert_eq!(derive("Café Crème"), "cafe-creme");
        assert_eq!(derive("Straße"), "strasse");
        assert_eq!(derive("ÆON Flux"), "aeon-flux");
        assert_eq!(derive("Łódź Søndag"), "lodz-sondag");
    }

    #[test]
    fn test_derive_ignores_unicode_composition() {
        let composed = "Caf\u{e9}s";
        let decomposed = "Cafe\u{301}s";
        assert_eq!(derive(composed), "cafes");
        assert_eq!(derive(decomposed), derive(composed));
        assert_eq!(derive("A\u{30a}ngstr\u{f6}m"), "angstrom");
    }

    #[test]
    fn test_derive_truncates_without_trailing_hyphen() {
        let name = "ab ".repeat(60);
        let slug = derive(&name);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(validate_format(&slug).is_ok());
        assert_eq!(derive(&"x".repeat(150)).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let name = "Ünïcode — Product (2024 Edition)";
        assert_eq!(derive(name), derive(name));
    }

    #[test]
    fn test_exhausted_reason_names_attempts() {
        let reason = ValidationReason::Exhausted { attempts: 4 };
        assert_eq!(reason.to_string(), "no free slug found after 4 attempts");
    }

    #[test]
    fn test_rules_policy() {
        let rules = SlugRules {
            min_len: 3,
            ..SlugRules::default()
        };
        assert_eq!(
            rules.validate("ab").unwrap_err().reason,
            ValidationReason::TooShort { min: 3 }
        );
        assert_eq!(
            rules.validate(&"a".repeat(101)).unwrap_err().reason,
            ValidationReason::TooLong { max: 100 }
        );
        assert_eq!(
            rules.validate("wp-admin").unwrap_err().reason,
            ValidationReason::Reserved
        );
        assert!(SlugRules::permissive().validate("admin").is_ok());
    }

    #[test]
    fn test_resolve_collision_suffixes() {
        let table = Table::from_records([
            Record::new("1").with_slug("widget"),
            Record::new("2").with_slug("widget-2"),
        ])
        .unwrap();
        assert_eq!(resolve_collision("gadget", &table).unwrap(), "gadget");
        assert_eq!(resolve_collision("widget", &table).unwrap(), "widget-3");
    }

    #[test]
    fn test_resolve_collision_skips_reserved() {
        let table = Table::default();
        assert_eq!(resolve_collision("admin", &table).unwrap(), "admin-2");
    }

    #[test]
    fn test_resolve_collision_respects_max_len() {
        let long = "a".repeat(MAX_SLUG_LEN);
        let table = Table::from_records([Record::new("1").with_slug(long.clone())]).unwrap();
        let resolved = resolve_collision(&long, &table).unwrap();
        assert_eq!(resolved.len(), MAX_SLUG_LEN);
        assert!(resolved.ends_with("-2"));
    }

    #[test]
    fn test_resolve_collision_rejects_bad_candidate() {
        let err = resolve_collision("Not A Slug", &Table::default()).unwrap_err();
        assert_eq!(err.reason, ValidationReason::InvalidCharacters);
    }

    #[test]
    fn test_suggest_ignores_own_slug() {
        let table = Table::from_records([Record::new("1").with_name("Widget").with_slug("widget")])
            .unwrap();
        let rules = SlugRules::default();
        assert_eq!(rules.suggest("Widget", &table, Some("1")).as_deref(), Some("widget"));
        assert_eq!(rules.suggest("Widget", &table, None).as_deref(), Some("widget-2"));
        assert_eq!(rules.suggest("???", &table, None), None);
    }
}
