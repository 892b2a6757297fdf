//! Typed views over webhook records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub const CLIENT_PLACEHOLDER: &str = "[Client Pending]";
pub const PROPERTY_PLACEHOLDER: &str = "[Property Pending]";
pub const UNITS_PLACEHOLDER: &str = "0";
pub const RATE_PLACEHOLDER: &str = "$0.00";
pub const SUMMARY_PLACEHOLDER: &str = "Service details as specified.";

pub const ACCEPTED_STATUS: &str = "accepted";

/// Contract fields rendered on the acceptance page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuote {
    pub client_name: String,
    pub property_label: String,
    pub unit_count: String,
    pub monthly_rate: String,
    pub service_summary: String,
}

impl ContractQuote {
    /// Builds a quote from a normalized record, filling placeholders for
    /// missing or blank entries.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            client_name: field_text(fields, "nombre_cliente", CLIENT_PLACEHOLDER),
            property_label: field_text(fields, "propiedad", PROPERTY_PLACEHOLDER),
            unit_count: field_text(fields, "unidades", UNITS_PLACEHOLDER),
            monthly_rate: field_text(fields, "precio_mensual", RATE_PLACEHOLDER),
            service_summary: field_text(fields, "detalle_servicio", SUMMARY_PLACEHOLDER),
        }
    }
}

fn field_text(fields: &Map<String, Value>, key: &str, placeholder: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f != 0.0) => n.to_string(),
        _ => placeholder.to_string(),
    }
}

/// An acceptance as posted by the acceptance page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceRecord {
    pub record_id: String,
    pub accepted_at: DateTime<Utc>,
    pub status: String,
}

impl AcceptanceRecord {
    /// Recognises an acceptance among submitted form pairs. Returns `None`
    /// when the identifier or status is missing or the timestamp does not
    /// parse.
    pub fn from_form(pairs: &[(String, String)]) -> Option<Self> {
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty())
        };

        let accepted_at = DateTime::parse_from_rfc3339(get("accepted_at")?)
            .ok()?
            .with_timezone(&Utc);

        Some(Self {
            record_id: get("airtable_record_id")?.to_string(),
            accepted_at,
            status: get("status")?.to_string(),
        })
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ACCEPTED_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{SecondsFormat, TimeZone};
    use serde_json::json;

    /// The pairs the acceptance page posts for `record`.
    fn wire_form(record: &AcceptanceRecord) -> Vec<(String, String)> {
        vec![
            ("airtable_record_id".to_string(), record.record_id.clone()),
            (
                "accepted_at".to_string(),
                record.accepted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            ("status".to_string(), record.status.clone()),
        ]
    }

    #[test]
    fn test_quote_from_complete_record() {
        let fields = json!({
            "nombre_cliente": "Palm Court HOA",
            "propiedad": "1200 Palm Ave, Tampa FL",
            "unidades": 180,
            "precio_mensual": "$1,250.00",
            "detalle_servicio": "Pickup 5 nights per week"
        });
        let quote = ContractQuote::from_fields(fields.as_object().unwrap());
        assert_eq!(quote.client_name, "Palm Court HOA");
        assert_eq!(quote.property_label, "1200 Palm Ave, Tampa FL");
        assert_eq!(quote.unit_count, "180");
        assert_eq!(quote.monthly_rate, "$1,250.00");
        assert_eq!(quote.service_summary, "Pickup 5 nights per week");
    }

    #[test]
    fn test_quote_placeholders() {
        let fields = json!({"nombre_cliente": "", "unidades": 0, "propiedad": null});
        let quote = ContractQuote::from_fields(fields.as_object().unwrap());
        assert_eq!(quote.client_name, CLIENT_PLACEHOLDER);
        assert_eq!(quote.property_label, PROPERTY_PLACEHOLDER);
        assert_eq!(quote.unit_count, UNITS_PLACEHOLDER);
        assert_eq!(quote.monthly_rate, RATE_PLACEHOLDER);
        assert_eq!(quote.service_summary, SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let quote = ContractQuote::from_fields(&Map::new());
        let value = serde_json::to_value(&quote).unwrap();
        assert_eq!(value["clientName"], CLIENT_PLACEHOLDER);
        assert_eq!(value["propertyLabel"], PROPERTY_PLACEHOLDER);
        assert_eq!(value["unitCount"], UNITS_PLACEHOLDER);
        assert_eq!(value["monthlyRate"], RATE_PLACEHOLDER);
        assert_eq!(value["serviceSummary"], SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn test_acceptance_form_wire_format() {
        let record = AcceptanceRecord {
            record_id: "rec123".to_string(),
            accepted_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            status: ACCEPTED_STATUS.to_string(),
        };
        assert_eq!(
            wire_form(&record),
            vec![
                ("airtable_record_id".to_string(), "rec123".to_string()),
                ("accepted_at".to_string(), "2024-01-01T00:00:00.000Z".to_string()),
                ("status".to_string(), "accepted".to_string()),
            ]
        );
        assert_eq!(AcceptanceRecord::from_form(&wire_form(&record)), Some(record));
    }

    #[test]
    fn test_acceptance_recognition_requires_all_fields() {
        let pairs = vec![
            ("airtable_record_id".to_string(), "rec123".to_string()),
            ("accepted_at".to_string(), "yesterday".to_string()),
            ("status".to_string(), "accepted".to_string()),
        ];
        assert_eq!(AcceptanceRecord::from_form(&pairs), None);

        let pairs = vec![("accepted_at".to_string(), "2024-01-01T00:00:00.000Z".to_string())];
        assert_eq!(AcceptanceRecord::from_form(&pairs), None);
    }

    #[test]
    fn test_non_accepted_status_is_recognised() {
        let pairs = vec![
            ("airtable_record_id".to_string(), "rec9".to_string()),
            ("accepted_at".to_string(), "2024-03-05T12:30:00.250Z".to_string()),
            ("status".to_string(), "declined".to_string()),
        ];
        let record = AcceptanceRecord::from_form(&pairs).unwrap();
        assert_eq!(record.record_id, "rec9");
        assert!(!record.is_accepted());
        assert_eq!(
            record.accepted_at,
            Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap() + chrono::Duration::milliseconds(250)
        );
    }
}
