//! Column label normalization.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest column name produced by [`clean_colname`].
pub const MAX_COLUMN_NAME_LEN: usize = 50;

/// Name used when a label has no alphanumeric characters at all.
pub const FALLBACK_COLUMN_NAME: &str = "col";

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Normalize a raw column label into a lowercase `[a-z0-9_]` token.
///
/// Every character outside `[a-zA-Z0-9]` becomes `_`, runs of `_` collapse,
/// leading and trailing `_` are stripped, the result is lowercased and cut to
/// [`MAX_COLUMN_NAME_LEN`] characters. An empty result becomes `"col"`.
///
/// The function is idempotent.
///
/// ```
/// use sifter::transform::clean_colname;
///
/// assert_eq!(clean_colname("Have you seen any of the 6 films?"), "have_you_seen_any_of_the_6_films");
/// assert_eq!(clean_colname("???"), "col");
/// ```
pub fn clean_colname(name: &str) -> String {
    let replaced = NON_ALPHANUMERIC.replace_all(name, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    let lowered = collapsed.trim_matches('_').to_lowercase();

    // Cutting can expose a trailing '_' that a second pass would strip.
    let truncated: String = lowered.chars().take(MAX_COLUMN_NAME_LEN).collect();
    let cleaned = truncated.trim_end_matches('_');

    if cleaned.is_empty() {
        FALLBACK_COLUMN_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Clean every label and keep the results unique.
///
/// A cleaned name that collides with an earlier one gets a `_2`, `_3`, ...
/// suffix, shortening the base so the name stays within the length cap.
pub fn clean_colnames<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();

    names
        .iter()
        .map(|name| {
            let base = clean_colname(name.as_ref());
            let mut candidate = base.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                n += 1;
                let suffix = format!("_{}", n);
                let keep = (MAX_COLUMN_NAME_LEN - suffix.len()).min(base.len());
                candidate = format!("{}{}", base[..keep].trim_end_matches('_'), suffix);
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_labels() {
        assert_eq!(
            clean_colname("Do you consider yourself to be a fan of the Star Wars film franchise?"),
            "do_you_consider_yourself_to_be_a_fan_of_the_star_w"
        );
        assert_eq!(clean_colname("_c4"), "c4");
        assert_eq!(clean_colname("RespondentID"), "respondentid");
        assert_eq!(clean_colname("Location (Census Region)"), "location_census_region");
    }

    #[test]
    fn test_collapse_and_strip() {
        assert_eq!(clean_colname("  --a   b--  "), "a_b");
        assert_eq!(clean_colname("a__b"), "a_b");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(clean_colname(""), "col");
        assert_eq!(clean_colname("¿¡!"), "col");
        assert_eq!(clean_colname("___"), "col");
    }

    #[test]
    fn test_non_ascii_letters_replaced() {
        assert_eq!(clean_colname("Año"), "a_o");
    }

    #[test]
    fn test_truncation_strips_exposed_underscore() {
        let label = format!("{}_b", "a".repeat(49));
        let once = clean_colname(&label);
        assert_eq!(once, "a".repeat(49));
        assert_eq!(clean_colname(&once), once);
    }

    #[test]
    fn test_truncation_length() {
        let label = "x".repeat(80);
        assert_eq!(clean_colname(&label).len(), MAX_COLUMN_NAME_LEN);
    }

    #[test]
    fn test_clean_colnames_unique() {
        let names = ["Age?", "Age!", "age", "Other"];
        assert_eq!(clean_colnames(&names), vec!["age", "age_2", "age_3", "other"]);
    }

    #[test]
    fn test_clean_colnames_respects_length_cap() {
        let long = "y".repeat(60);
        let names = [long.clone(), long];
        let cleaned = clean_colnames(&names);
        assert_eq!(cleaned[0].len(), MAX_COLUMN_NAME_LEN);
        assert_eq!(cleaned[1].len(), MAX_COLUMN_NAME_LEN);
        assert!(cleaned[1].ends_with("_2"));
        assert_ne!(cleaned[0], cleaned[1]);
    }
}
