//! Invoice Draft Generator (`spec.md` §4.5).
//!
//! Turns a technician's voice memo into a priced, review-gated invoice
//! draft: parse the memo into a [`TechnicianReport`], match each part
//! and service against the catalog, price what can be priced, and flag
//! the rest for manual review. Deterministic given deterministic
//! collaborators: no hidden state, no caching.

use std::time::Instant;

use voice_agent_catalog::{match_item, TypeFilter};
use voice_agent_config::Settings;
use voice_agent_core::model::{
    CatalogEntry, DraftLineItem, ExtractedPart, ExtractedService, InvoiceDraft, Money, SourceType, TechnicianReport,
};
use voice_agent_core::traits::{CatalogSource, ChatCompletion, CompletionOptions, ResponseMode};
use voice_agent_core::VoiceAgentError;

const REPORT_SYSTEM_PROMPT: &str = "Sos un asistente que extrae un reporte estructurado de la visita de un técnico a partir de su memo de voz al finalizar el trabajo. Respondé únicamente con un objeto JSON describiendo repuestos usados, servicios realizados, horarios y el estado del equipo.";

/// Generates an [`InvoiceDraft`] for one completed job.
pub async fn generate_draft(
    chat: &dyn ChatCompletion,
    catalog_source: &dyn CatalogSource,
    settings: &Settings,
    organization_id: &str,
    job_id: &str,
    transcription: &str,
) -> InvoiceDraft {
    let start = Instant::now();

    let report = fetch_report(chat, settings, transcription).await;
    let catalog = fetch_catalog(catalog_source, settings, organization_id).await;

    let mut line_items: Vec<DraftLineItem> = Vec::with_capacity(report.parts.len() + report.services.len());
    for part in &report.parts {
        line_items.push(price_part(part, &catalog, settings));
    }
    for service in &report.services {
        line_items.push(price_service(service, &catalog, settings));
    }

    let subtotal = Money::sum(line_items.iter().filter_map(|item| item.total));
    let tax_amount = subtotal.mul_rate(settings.tax_rate);
    let total = subtotal.checked_add(tax_amount).unwrap_or(subtotal);

    let priced: Vec<&DraftLineItem> = line_items.iter().filter(|item| item.unit_price.is_some()).collect();
    let overall_match_confidence = if priced.is_empty() {
        0.0
    } else {
        priced.iter().filter_map(|item| item.match_confidence).sum::<f32>() / priced.len() as f32
    };

    let requires_review = line_items.iter().any(|item| item.needs_review);
    let review_notes: Vec<String> = line_items.iter().filter_map(|item| item.review_reason.clone()).collect();

    InvoiceDraft {
        job_id: job_id.to_string(),
        organization_id: organization_id.to_string(),
        technician_report: report,
        original_transcription: transcription.to_string(),
        line_items,
        subtotal,
        tax_amount,
        total,
        processing_duration_ms: start.elapsed().as_millis() as u64,
        overall_match_confidence,
        requires_review,
        review_notes,
    }
}

async fn fetch_report(chat: &dyn ChatCompletion, settings: &Settings, transcription: &str) -> TechnicianReport {
    let options = CompletionOptions {
        response: ResponseMode::StructuredJson,
        ..Default::default()
    };
    match chat
        .complete(REPORT_SYSTEM_PROMPT, transcription, options, settings.deadlines.extraction())
        .await
    {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "technician report deserialization failed, using empty report");
            TechnicianReport::default()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "technician report completion call failed, using empty report");
            TechnicianReport::default()
        }
    }
}

async fn fetch_catalog(catalog_source: &dyn CatalogSource, settings: &Settings, organization_id: &str) -> Vec<CatalogEntry> {
    match catalog_source.list_price_items(organization_id, settings.deadlines.catalog()).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "catalog fetch failed, every line will require review");
            Vec::new()
        }
    }
}

fn price_part(part: &ExtractedPart, catalog: &[CatalogEntry], settings: &Settings) -> DraftLineItem {
    let (best, confidence, alternatives) = match_item(&part.name, Some(part.unit.as_str()), catalog, Some(TypeFilter::Part));
    let high = settings.thresholds.invoice_high;
    let medium = settings.thresholds.invoice_medium;

    let (unit_price, total, needs_review, review_reason, matched_catalog_id, matched_name, match_confidence) =
        match &best {
            Some(candidate) if confidence >= medium => {
                let unit_price = candidate.price;
                let total = unit_price.mul_rate(part.quantity);
                if confidence >= high {
                    (Some(unit_price), Some(total), false, None, Some(candidate.catalog_id.clone()), Some(candidate.name.clone()), Some(confidence))
                } else {
                    let reason = format!("Coincidencia parcial con \"{}\" ({:.0}% de confianza); verificar precio.", candidate.name, confidence * 100.0);
                    (Some(unit_price), Some(total), true, Some(reason), Some(candidate.catalog_id.clone()), Some(candidate.name.clone()), Some(confidence))
                }
            }
            _ => (
                None,
                None,
                true,
                Some(format!("No se encontró \"{}\" en el catálogo; asignar precio manualmente.", part.name)),
                None,
                None,
                best.as_ref().map(|_| confidence),
            ),
        };

    DraftLineItem {
        description: part.name.clone(),
        quantity: part.quantity,
        unit: part.unit.as_str().to_string(),
        unit_price,
        total,
        tax_rate: settings.tax_rate,
        source_type: if matched_catalog_id.is_some() { SourceType::Part } else { SourceType::Custom },
        source_span: part.source_span.clone(),
        matched_catalog_id,
        matched_name,
        match_confidence,
        alternatives,
        needs_review,
        review_reason,
    }
}

fn price_service(service: &ExtractedService, catalog: &[CatalogEntry], settings: &Settings) -> DraftLineItem {
    let (best, confidence, alternatives) = match_item(&service.description, None, catalog, Some(TypeFilter::Service));
    let high = settings.thresholds.invoice_high;
    let medium = settings.thresholds.invoice_medium;
    let quantity = service
        .duration_minutes
        .map(|minutes| minutes as f64 / 60.0)
        .unwrap_or(1.0);

    let (unit_price, total, needs_review, review_reason, matched_catalog_id, matched_name, match_confidence, unit) =
        match &best {
            Some(candidate) if confidence >= medium => {
                let unit_price = candidate.price;
                let total = unit_price.mul_rate(quantity);
                if confidence >= high {
                    (Some(unit_price), Some(total), false, None, Some(candidate.catalog_id.clone()), Some(candidate.name.clone()), Some(confidence), candidate.unit.clone())
                } else {
                    let reason = format!("Coincidencia parcial con \"{}\" ({:.0}% de confianza); verificar precio.", candidate.name, confidence * 100.0);
                    (Some(unit_price), Some(total), true, Some(reason), Some(candidate.catalog_id.clone()), Some(candidate.name.clone()), Some(confidence), candidate.unit.clone())
                }
            }
            _ => (
                None,
                None,
                true,
                Some(format!(
                    "No se encontró \"{}\" en el catálogo; asignar precio manualmente.",
                    service.description
                )),
                None,
                None,
                best.as_ref().map(|_| confidence),
                "hour".to_string(),
            ),
        };

    DraftLineItem {
        description: service.description.clone(),
        quantity,
        unit,
        unit_price,
        total,
        tax_rate: settings.tax_rate,
        source_type: if matched_catalog_id.is_some() { SourceType::Service } else { SourceType::Custom },
        source_span: service.source_span.clone(),
        matched_catalog_id,
        matched_name,
        match_confidence,
        alternatives,
        needs_review,
        review_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_satisfy_the_invariant() {
        let subtotal = Money::from_cents(10_000);
        let tax = subtotal.mul_rate(0.21);
        let total = subtotal.checked_add(tax).unwrap();
        assert_eq!(total, subtotal + subtotal.mul_rate(0.21));
    }

    #[test]
    fn review_flag_law_holds_for_unpriced_lines() {
        let line = DraftLineItem {
            description: "x".to_string(),
            quantity: 1.0,
            unit: "piece".to_string(),
            unit_price: None,
            total: None,
            tax_rate: 0.21,
            source_type: SourceType::Custom,
            source_span: "x".to_string(),
            matched_catalog_id: None,
            matched_name: None,
            match_confidence: None,
            alternatives: vec![],
            needs_review: true,
            review_reason: Some("no price".to_string()),
        };
        assert!(line.unit_price.is_none() && line.needs_review);
    }
}
