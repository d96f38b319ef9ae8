//! Argentine phone-number normalizer.
//!
//! Turns messy, human-typed phone strings — country/area prefixes, local
//! mobile indicators, hyphens, slashes, parenthetical annotations — into
//! the canonical international form `+549<area><local>` the rest of the
//! voice agent standardizes on. Both entry points are pure and never
//! panic: unrecognized input yields an absent result rather than an
//! error.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_ZERO_AREA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,5}").unwrap());
static COMBO_LANDLINE_MOBILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\d\s-]*\d)-154-(\d[\d\s-]*\d?)$").unwrap());

/// Normalizes a single raw phone string to `+549<area><local>`, or
/// `None` if the digits left after stripping can't be reconciled into
/// a plausible number.
///
/// Algorithm: strip everything but digits and a leading `+`; drop the
/// leading `+`; drop a leading `54`; drop a leading `9`; drop a leading
/// `0`; if what remains begins with `15` and is at least 9 digits long,
/// drop the `15` and, if 8 or fewer digits remain, prepend
/// `default_area_code`; otherwise, if 6-8 digits remain, prepend
/// `default_area_code`; reject unless the final digit count falls in
/// 9-12; prefix with `+549`.
pub fn normalize(raw: &str, default_area_code: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let mut digits = cleaned.strip_prefix('+').unwrap_or(&cleaned).to_string();

    if let Some(rest) = digits.strip_prefix("54") {
        digits = rest.to_string();
    }
    if let Some(rest) = digits.strip_prefix('9') {
        digits = rest.to_string();
    }
    if let Some(rest) = digits.strip_prefix('0') {
        digits = rest.to_string();
    }

    if digits.starts_with("15") && digits.len() >= 9 {
        digits = digits[2..].to_string();
        if digits.len() <= 8 {
            digits = format!("{default_area_code}{digits}");
        }
    } else if (6..=8).contains(&digits.len()) {
        digits = format!("{default_area_code}{digits}");
    }

    if digits.len() < 9 || digits.len() > 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(format!("+549{digits}"))
}

/// Splits a raw string that may hold several phone numbers and
/// normalizes each one, returning distinct canonical forms in the
/// order they first appear.
///
/// Splits on `/` and on internal whitespace, except inside a token
/// that starts with `+`. A two-part, space-separated `"0XXX YYYYYY"`
/// token is rejoined into one candidate before normalizing. A token
/// matching the `<landline>-154-<mobile>` convention is expanded into
/// the landline number and the corresponding `15`-prefixed mobile
/// number. The default area code can be upgraded by inspecting the
/// first token: a leading `0` followed by a 3- or 4-digit area code,
/// or a bare 3-digit `3`-prefixed token, becomes the default used for
/// every subsequent token in this call.
pub fn split_and_normalize(raw: &str, default_area_code: &str) -> Vec<String> {
    let segments: Vec<&str> = raw.split('/').map(str::trim).filter(|s| !s.is_empty()).collect();

    let mut candidates: Vec<String> = Vec::new();
    for segment in &segments {
        candidates.extend(expand_segment(segment));
    }

    let mut effective_area_code = default_area_code.to_string();
    if let Some(first) = candidates.first() {
        if let Some(upgraded) = detect_area_code_upgrade(first) {
            effective_area_code = upgraded;
        }
    }

    let mut seen = Vec::new();
    for candidate in &candidates {
        if let Some(normalized) = normalize(candidate, &effective_area_code) {
            if !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
    }
    seen
}

/// Expands one `/`-delimited segment into one or more phone-candidate
/// strings, handling the landline/mobile combo pattern and the
/// space-separated area-code rejoin.
fn expand_segment(segment: &str) -> Vec<String> {
    if let Some(captures) = COMBO_LANDLINE_MOBILE.captures(segment) {
        let landline = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let mobile_local = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        let mobile_local_digits: String =
            mobile_local.chars().filter(|c| c.is_ascii_digit()).collect();
        return vec![landline.to_string(), format!("15{mobile_local_digits}")];
    }

    if segment.starts_with('+') {
        return vec![segment.to_string()];
    }

    let parts: Vec<&str> = segment.split_whitespace().collect();
    if parts.len() == 2 && is_plausible_area_code_prefix(parts[0]) && parts[1].chars().all(|c| c.is_ascii_digit()) {
        return vec![format!("{}{}", parts[0], parts[1])];
    }

    parts.into_iter().map(str::to_string).collect()
}

fn is_plausible_area_code_prefix(token: &str) -> bool {
    token.starts_with('0') && token.len() >= 3 && token.chars().all(|c| c.is_ascii_digit())
}

/// Inspects a candidate's leading digit run for the area-code upgrade
/// pattern described on [`split_and_normalize`].
fn detect_area_code_upgrade(first_candidate: &str) -> Option<String> {
    let leading_run = LEADING_ZERO_AREA.find(first_candidate)?.as_str();

    if let Some(area) = leading_run.strip_prefix('0') {
        if area.len() == 3 || area.len() == 4 {
            return Some(area.to_string());
        }
    }
    if leading_run.len() == 3 && leading_run.starts_with('3') {
        return Some(leading_run.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_local_number_with_default_area_code() {
        let result = normalize("4890284", "343");
        assert_eq!(result, Some("+5493434890284".to_string()));
    }

    #[test]
    fn normalizes_mobile_prefix_with_fifteen() {
        let result = normalize("15-4890284", "343");
        assert_eq!(result, Some("+5493434890284".to_string()));
    }

    #[test]
    fn normalizes_international_prefix() {
        let result = normalize("+54 9 11 4890-2840", "11");
        assert_eq!(result.as_deref(), Some("+5491148902840"));
    }

    #[test]
    fn rejects_too_short_input() {
        assert_eq!(normalize("123", "11"), None);
    }

    #[test]
    fn idempotent_on_already_canonical_number() {
        let once = normalize("0343-4890284", "387").unwrap();
        let twice = normalize(&once, "387").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn shape_matches_expected_regex() {
        let shape = Regex::new(r"^\+549\d{9,12}$").unwrap();
        for raw in ["0343-4890284", "15-4890284", "011 48902840"] {
            if let Some(result) = normalize(raw, "343") {
                assert!(shape.is_match(&result), "{result} did not match shape");
            }
        }
    }

    #[test]
    fn split_phone_scenario_from_seed_tests() {
        let results = split_and_normalize("0343-4890284 / 0343-15467426", "387");
        assert_eq!(results.len(), 2);
        assert_ne!(results[0], results[1]);
        for number in &results {
            assert!(
                number.starts_with("+549343"),
                "{number} did not start with +549343"
            );
        }
    }

    #[test]
    fn split_and_normalize_dedups() {
        let results = split_and_normalize("0343-4890284 / 0343-4890284", "387");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn split_rejoins_space_separated_area_and_local() {
        let results = split_and_normalize("011 48902840", "11");
        assert_eq!(results, vec!["+5491148902840".to_string()]);
    }

    #[test]
    fn split_expands_landline_mobile_combo() {
        let results = split_and_normalize("011-4890284-154-7654321", "11");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn unreconcilable_input_yields_empty_output() {
        assert_eq!(split_and_normalize("not a phone number", "11"), Vec::<String>::new());
    }
}
