//! Confirmation-message formatting (`spec.md` §4.4, `confirm` node).

use voice_agent_core::model::{JobExtraction, Urgency};

fn service_type_label(service_type: &str) -> String {
    match service_type {
        "plumbing" | "plomeria" => "Plomería".to_string(),
        "electrical" | "electricidad" => "Electricidad".to_string(),
        "appliance_repair" | "electrodomesticos" => "Electrodomésticos".to_string(),
        "hvac" | "aire_acondicionado" => "Aire acondicionado".to_string(),
        "general_maintenance" | "mantenimiento" => "Mantenimiento general".to_string(),
        other => {
            let mut chars = other.replace('_', " ");
            if let Some(first) = chars.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            chars
        }
    }
}

fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Normal => "Normal",
        Urgency::Urgente => "Urgente",
        Urgency::Emergencia => "Emergencia",
    }
}

/// Builds the plain-text, markdown-emphasized confirmation prompt sent
/// to the customer ahead of auto-creating or confirming a job. Only
/// populated fields appear.
pub fn format_confirmation_message(extraction: &JobExtraction) -> String {
    let mut lines = vec!["Antes de continuar, quiero confirmar los datos de tu solicitud:".to_string()];

    if let Some(title) = &extraction.title {
        lines.push(format!("- *Servicio:* {title}"));
    }
    if let Some(service_type) = &extraction.service_type {
        lines.push(format!("- *Tipo:* {}", service_type_label(service_type)));
    }

    let brand_and_model = match (&extraction.appliance_brand, &extraction.appliance_model) {
        (Some(brand), Some(model)) => Some(format!("{brand} {model}")),
        (Some(brand), None) => Some(brand.clone()),
        (None, Some(model)) => Some(model.clone()),
        (None, None) => None,
    };
    if let Some(equipment) = brand_and_model {
        lines.push(format!("- *Equipo:* {equipment}"));
    }

    if let Some(problem) = &extraction.problem_description {
        lines.push(format!("- *Problema:* {problem}"));
    }

    let address = assemble_address(extraction);
    if let Some(address) = address {
        lines.push(format!("- *Dirección:* {address}"));
    }

    let schedule = match (&extraction.preferred_date, &extraction.preferred_time) {
        (Some(date), Some(time)) => Some(format!("{date} {time}")),
        (Some(date), None) => Some(date.clone()),
        (None, Some(time)) => Some(time.clone()),
        (None, None) => None,
    };
    if let Some(schedule) = schedule {
        lines.push(format!("- *Fecha y hora preferida:* {schedule}"));
    }

    if let Some(urgency) = extraction.urgency {
        if urgency != Urgency::Normal {
            lines.push(format!("- *Urgencia:* {}", urgency_label(urgency)));
        }
    }

    lines.push(String::new());
    lines.push("¿Es correcto? Respondé *Sí* para confirmar, o contame qué corregir.".to_string());

    lines.join("\n")
}

/// The outbound message sent once `auto_create` has successfully
/// created the job (`spec.md` §8, seed scenario 1).
pub fn format_auto_create_message(extraction: &JobExtraction) -> String {
    let title = extraction.title.as_deref().unwrap_or("tu solicitud");
    format!("¡Trabajo creado! Ya registramos \"{title}\" y un técnico se va a poner en contacto para coordinar la visita.")
}

fn assemble_address(extraction: &JobExtraction) -> Option<String> {
    let parts: Vec<&str> = [
        extraction.address.as_deref(),
        extraction.city.as_deref(),
        extraction.province.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_populated_fields_appear() {
        let extraction = JobExtraction {
            title: Some("Heladera no enfría".to_string()),
            ..Default::default()
        };
        let message = format_confirmation_message(&extraction);
        assert!(message.contains("Servicio"));
        assert!(!message.contains("Dirección"));
        assert!(!message.contains("Urgencia"));
    }

    #[test]
    fn contains_confirmation_prompt() {
        let message = format_confirmation_message(&JobExtraction::default());
        assert!(message.contains("¿Es correcto?"));
        assert!(message.contains("Sí"));
    }

    #[test]
    fn normal_urgency_is_suppressed() {
        let extraction = JobExtraction {
            urgency: Some(Urgency::Normal),
            ..Default::default()
        };
        let message = format_confirmation_message(&extraction);
        assert!(!message.contains("Urgencia"));
    }

    #[test]
    fn non_normal_urgency_is_shown() {
        let extraction = JobExtraction {
            urgency: Some(Urgency::Urgente),
            ..Default::default()
        };
        let message = format_confirmation_message(&extraction);
        assert!(message.contains("Urgente"));
    }

    #[test]
    fn assembles_full_address() {
        let extraction = JobExtraction {
            address: Some("Av. Siempreviva 742".to_string()),
            city: Some("Springfield".to_string()),
            province: Some("Buenos Aires".to_string()),
            ..Default::default()
        };
        let message = format_confirmation_message(&extraction);
        assert!(message.contains("Av. Siempreviva 742, Springfield, Buenos Aires"));
    }
}
