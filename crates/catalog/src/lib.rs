//! Catalog matcher.
//!
//! Scores a technician's free-text part or service description against
//! the read-only product catalog using token-set Jaccard similarity,
//! the same kind of fast keyword-overlap scorer the teacher workspace
//! uses as a pre-filter ahead of its cross-encoder reranker
//! (`crates/rag/src/reranker.rs`), here standing alone rather than
//! feeding a heavier second stage.

use std::collections::HashSet;

use voice_agent_core::model::{AlternativeMatch, CatalogEntry, CatalogEntryType};

/// Score below which a candidate is discarded outright.
const DISCARD_THRESHOLD: f32 = 0.2;

/// Bonus applied when the extracted unit matches the catalog entry's
/// unit, case-insensitively.
const UNIT_MATCH_BONUS: f32 = 0.1;

/// Weight applied to the description-token Jaccard score relative to
/// the name-token score.
const DESCRIPTION_WEIGHT: f32 = 0.7;

const STOPWORDS: &[&str] = &["of", "the", "a", "an", "for", "with", "by", "and", "in"];

/// Restricts candidates to one side of the catalog before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Part,
    Service,
}

impl TypeFilter {
    fn matches(self, entry_type: CatalogEntryType) -> bool {
        match (self, entry_type) {
            (TypeFilter::Part, CatalogEntryType::Product) => true,
            (TypeFilter::Service, CatalogEntryType::Service) => true,
            _ => false,
        }
    }
}

/// Matches an extracted part/service name against the catalog.
///
/// Returns the best-scoring entry (if any survives the discard
/// threshold), its confidence score, and up to three runner-up
/// alternatives. Pure and total: an empty or garbled `extracted_name`
/// simply yields no match rather than an error.
pub fn match_item(
    extracted_name: &str,
    extracted_unit: Option<&str>,
    catalog: &[CatalogEntry],
    type_filter: Option<TypeFilter>,
) -> (Option<AlternativeMatch>, f32, Vec<AlternativeMatch>) {
    let name_tokens = tokenize(extracted_name);

    let mut candidates: Vec<&CatalogEntry> = match type_filter {
        Some(filter) => catalog.iter().filter(|e| filter.matches(e.entry_type)).collect(),
        None => catalog.iter().collect(),
    };
    if candidates.is_empty() {
        candidates = catalog.iter().collect();
    }

    let mut scored: Vec<(f32, &CatalogEntry)> = candidates
        .into_iter()
        .map(|entry| (score_entry(&name_tokens, extracted_unit, entry), entry))
        .filter(|(score, _)| *score > DISCARD_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranked = scored.into_iter();
    let best = ranked.next().map(|(score, entry)| to_alternative(entry, score));
    let alternatives: Vec<AlternativeMatch> = ranked
        .take(3)
        .map(|(score, entry)| to_alternative(entry, score))
        .collect();

    let confidence = best.as_ref().map(|m| m.score).unwrap_or(0.0);
    (best, confidence, alternatives)
}

fn to_alternative(entry: &CatalogEntry, score: f32) -> AlternativeMatch {
    AlternativeMatch {
        catalog_id: entry.id.clone(),
        name: entry.name.clone(),
        price: entry.price,
        unit: entry.unit.clone(),
        entry_type: entry.entry_type,
        score,
    }
}

fn score_entry(name_tokens: &HashSet<String>, extracted_unit: Option<&str>, entry: &CatalogEntry) -> f32 {
    let entry_name_tokens = tokenize(&entry.name);
    let name_score = jaccard(name_tokens, &entry_name_tokens);

    let description_score = entry
        .description
        .as_deref()
        .map(|d| jaccard(name_tokens, &tokenize(d)) * DESCRIPTION_WEIGHT)
        .unwrap_or(0.0);

    let mut score = name_score.max(description_score);

    if let Some(unit) = extracted_unit {
        if unit.eq_ignore_ascii_case(&entry.unit) {
            score += UNIT_MATCH_BONUS;
        }
    }

    score.clamp(0.0, 1.0)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Lowercases, strips non-word characters, splits on whitespace,
/// drops stopwords and tokens of length <= 2.
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| word.len() > 2 && !STOPWORDS.contains(&word.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_agent_core::Money;

    fn entry(id: &str, name: &str, description: Option<&str>, unit: &str, entry_type: CatalogEntryType) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price: Money::from_cents(10_000),
            unit: unit.to_string(),
            entry_type,
        }
    }

    #[test]
    fn exact_name_match_scores_high() {
        let catalog = vec![entry(
            "p1",
            "Compressor relay",
            Some("Refrigerator compressor start relay"),
            "piece",
            CatalogEntryType::Product,
        )];
        let (best, confidence, _) = match_item("compressor relay", None, &catalog, Some(TypeFilter::Part));
        assert!(best.is_some());
        assert!(confidence > 0.9);
    }

    #[test]
    fn unit_match_bonus_is_exactly_point_one_and_clamped() {
        let catalog = vec![entry("p1", "hose clamp", None, "piece", CatalogEntryType::Product)];
        let (_, without_bonus, _) = match_item("hose clamp", Some("meter"), &catalog, None);
        let (_, with_bonus, _) = match_item("hose clamp", Some("piece"), &catalog, None);
        assert!((with_bonus - without_bonus - 0.1).abs() < 1e-5);
    }

    #[test]
    fn unit_bonus_clamps_at_one() {
        let catalog = vec![entry("p1", "hose clamp", None, "piece", CatalogEntryType::Product)];
        let (_, confidence, _) = match_item("hose clamp", Some("piece"), &catalog, None);
        assert!(confidence <= 1.0);
    }

    #[test]
    fn token_set_ignores_case_punctuation_and_stopwords() {
        let a = tokenize("Hose Clamp, for the Compressor!");
        let b = tokenize("hose clamp compressor");
        assert_eq!(a, b);
    }

    #[test]
    fn type_filter_falls_back_to_full_catalog_when_empty() {
        let catalog = vec![entry("s1", "drain cleaning", None, "piece", CatalogEntryType::Service)];
        let (best, _, _) = match_item("drain cleaning", None, &catalog, Some(TypeFilter::Part));
        assert!(best.is_some());
    }

    #[test]
    fn low_similarity_is_discarded() {
        let catalog = vec![entry("p1", "refrigerator compressor", None, "piece", CatalogEntryType::Product)];
        let (best, confidence, _) = match_item("unrelated widget xyz", None, &catalog, None);
        assert!(best.is_none());
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn alternatives_capped_at_three() {
        let catalog = vec![
            entry("p1", "compressor relay alpha", None, "piece", CatalogEntryType::Product),
            entry("p2", "compressor relay beta", None, "piece", CatalogEntryType::Product),
            entry("p3", "compressor relay gamma", None, "piece", CatalogEntryType::Product),
            entry("p4", "compressor relay delta", None, "piece", CatalogEntryType::Product),
            entry("p5", "compressor relay epsilon", None, "piece", CatalogEntryType::Product),
        ];
        let (_, _, alternatives) = match_item("compressor relay", None, &catalog, None);
        assert!(alternatives.len() <= 3);
    }

    #[test]
    fn ordering_is_descending_by_score() {
        let catalog = vec![
            entry("p1", "compressor relay exact", None, "piece", CatalogEntryType::Product),
            entry("p2", "relay", None, "piece", CatalogEntryType::Product),
        ];
        let (best, _, alternatives) = match_item("compressor relay exact", None, &catalog, None);
        let best_score = best.unwrap().score;
        if let Some(alt) = alternatives.first() {
            assert!(best_score >= alt.score);
        }
    }
}
