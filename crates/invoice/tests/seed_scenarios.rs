//! End-to-end seed scenario for the Invoice Draft Generator (`spec.md`
//! §8, scenario 5).

use std::time::Duration;

use async_trait::async_trait;

use voice_agent_config::Settings;
use voice_agent_core::model::{
    CatalogEntry, CatalogEntryType, ExtractedPart, Money, TechnicianReport, Unit,
};
use voice_agent_core::traits::{CatalogSource, ChatCompletion, CompletionOptions};
use voice_agent_core::VoiceAgentError;
use voice_agent_invoice::generate_draft;

struct FixedChat(&'static str);

#[async_trait]
impl ChatCompletion for FixedChat {
    async fn complete(&self, _s: &str, _u: &str, _o: CompletionOptions, _d: Duration) -> Result<String, VoiceAgentError> {
        Ok(self.0.to_string())
    }
}

struct FixedCatalog(Vec<CatalogEntry>);

#[async_trait]
impl CatalogSource for FixedCatalog {
    async fn list_price_items(&self, _org: &str, _d: Duration) -> Result<Vec<CatalogEntry>, VoiceAgentError> {
        Ok(self.0.clone())
    }
}

fn entry(id: &str, name: &str, price_cents: i64, unit: &str, entry_type: CatalogEntryType) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        price: Money::from_cents(price_cents),
        unit: unit.to_string(),
        entry_type,
    }
}

#[tokio::test]
async fn scenario_5_mixed_confidence_matches() {
    let report = TechnicianReport {
        parts: vec![
            ExtractedPart {
                name: "relay de arranque compresor".to_string(),
                quantity: 1.0,
                unit: Unit::Piece,
                source_span: "un relay de arranque".to_string(),
                confidence: 0.9,
            },
            ExtractedPart {
                name: "manguera de desagote".to_string(),
                quantity: 2.0,
                unit: Unit::Meter,
                source_span: "dos metros de manguera".to_string(),
                confidence: 0.8,
            },
            ExtractedPart {
                name: "pieza totalmente desconocida xyz".to_string(),
                quantity: 1.0,
                unit: Unit::Piece,
                source_span: "una pieza rara".to_string(),
                confidence: 0.5,
            },
        ],
        overall_confidence: 0.8,
        ..Default::default()
    };
    let raw = serde_json::to_string(&report).unwrap();
    let chat = FixedChat(Box::leak(raw.into_boxed_str()));
    let catalog = FixedCatalog(vec![
        entry("p1", "relay de arranque compresor", 500_00, "piece", CatalogEntryType::Product),
        entry("p2", "manguera de desagote flexible", 150_00, "meter", CatalogEntryType::Product),
    ]);

    let settings = Settings::default();
    let draft = generate_draft(&chat, &catalog, &settings, "org-1", "job-1", "memo de voz").await;

    assert_eq!(draft.line_items.len(), 3);
    assert!(!draft.line_items[0].needs_review);
    assert!(draft.line_items[0].unit_price.is_some());
    assert!(draft.line_items[1].needs_review);
    assert!(draft.line_items[1].unit_price.is_some());
    assert!(draft.line_items[1].review_reason.is_some());
    assert!(draft.line_items[2].unit_price.is_none());
    assert!(draft.line_items[2].needs_review);

    let expected_subtotal = draft.line_items[0].total.unwrap() + draft.line_items[1].total.unwrap();
    assert_eq!(draft.subtotal, expected_subtotal);
    assert!(draft.requires_review);
}
