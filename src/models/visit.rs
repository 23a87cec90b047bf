// src/models/visit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- ENUMS ---

// Mapeia o CREATE TYPE visit_status do banco. Só existem dois estados:
// uma visita "em andamento" continua 'scheduled' com started_at preenchido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "visit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Scheduled,
    Completed,
}

impl VisitStatus {
    // Etiqueta em espanhol para o informe e o dashboard
    pub fn label(self) -> &'static str {
        match self {
            VisitStatus::Scheduled => "Programada",
            VisitStatus::Completed => "Finalizada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "media_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Photo,
    Video,
    Other,
}

// A ação do fluxo móvel chega como texto, com sinônimos em espanhol.
// Normalizamos na borda para um enum fechado em vez de comparar strings
// espalhadas pelo código.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    Start,
    Complete,
}

impl VisitAction {
    pub fn from_input(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "start" | "iniciar" => Some(VisitAction::Start),
            "complete" | "finalizar" => Some(VisitAction::Complete),
            _ => None,
        }
    }
}

// --- VISITA ---

// Visão completa da visita, com os nomes da cadeia cliente/sucursal/área
// resolvidos por JOIN. É o formato que a API serializa.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetail {
    pub id: Uuid,
    pub area_id: Uuid,
    pub area_name: String,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub dispenser_id: Option<Uuid>,
    pub dispenser_identifier: Option<String>,
    pub inspector_id: Option<Uuid>,
    pub inspector_name: Option<String>,
    pub visited_at: DateTime<Utc>,
    pub notes: String,
    pub status: VisitStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    #[schema(value_type = Object)]
    pub visit_report: Option<Value>,

    // Preenchida à parte quando a resposta inclui as evidências
    #[sqlx(skip)]
    pub media: Vec<VisitMedia>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitMedia {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub media_type: MediaType,
    pub file_url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitPayload {
    pub area_id: Uuid,
    pub dispenser_id: Option<Uuid>,
    pub inspector_id: Option<Uuid>,
    pub visited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

// --- INFORME DA VISITA ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChecklistItem {
    pub item: String,
    #[serde(default)]
    pub status: String,
}

// O documento estruturado que o app móvel envia ao finalizar. As chaves são
// o contrato com o app, por isso ficam em snake_case (sem rename).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VisitReport {
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub comments: String,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub location_verified: bool,
    #[serde(default)]
    pub responsible_name: String,
    // Imagem da assinatura como data-URI
    #[serde(default)]
    pub responsible_signature: String,
    // Preenchidos pelo servidor a partir das coordenadas registradas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<GeoPoint>,
}

impl VisitReport {
    // O app pode mandar o objeto nativo ou uma string com JSON dentro
    // (multipart só transporta texto). JSON quebrado é erro de validação.
    pub fn parse(raw: &Value) -> Result<Self, AppError> {
        match raw {
            Value::String(text) => serde_json::from_str(text).map_err(|_| {
                AppError::validation("El informe de la visita no es un JSON válido.")
            }),
            _ => serde_json::from_value(raw.clone()).map_err(|_| {
                AppError::validation("El informe de la visita tiene un formato inválido.")
            }),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.location_verified {
            return Err(AppError::validation(
                "Debes confirmar la verificación de la ubicación.",
            ));
        }
        if self.responsible_name.trim().is_empty() {
            return Err(AppError::validation(
                "El nombre del responsable es obligatorio.",
            ));
        }
        if self.responsible_signature.trim().is_empty() {
            return Err(AppError::validation(
                "La firma del responsable es obligatoria.",
            ));
        }
        Ok(())
    }

    // Quantos itens do checklist passaram ("ok", sem distinção de maiúsculas)
    pub fn passed_count(&self) -> usize {
        self.checklist
            .iter()
            .filter(|item| item.status.trim().eq_ignore_ascii_case("ok"))
            .count()
    }
}

// Aceita booleanos ou os textos "1"/"true"/"yes"/"si"/"sí" (qualquer caixa).
// Qualquer outra coisa é falso; a validação rejeita depois.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

fn is_truthy(value: &Value) -> bool {
    const TRUTHY: [&str; 5] = ["1", "true", "yes", "si", "sí"];
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => TRUTHY.contains(&text.trim().to_lowercase().as_str()),
        Value::Number(number) => TRUTHY.contains(&number.to_string().as_str()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_report_json() -> Value {
        json!({
            "checklist": [
                {"item": "Nivel de producto", "status": "OK"},
                {"item": "Boquilla limpia", "status": "ok"},
                {"item": "Goteo", "status": "falla"},
            ],
            "comments": "Todo en orden",
            "location_verified": "sí",
            "responsible_name": "María Pérez",
            "responsible_signature": "data:image/png;base64,AAAA",
        })
    }

    #[test]
    fn parse_accepts_native_object() {
        let report = VisitReport::parse(&valid_report_json()).unwrap();
        assert!(report.location_verified);
        assert_eq!(report.checklist.len(), 3);
        assert_eq!(report.responsible_name, "María Pérez");
    }

    #[test]
    fn parse_accepts_json_encoded_string() {
        let encoded = Value::String(valid_report_json().to_string());
        let report = VisitReport::parse(&encoded).unwrap();
        assert!(report.location_verified);
        assert_eq!(report.comments, "Todo en orden");
    }

    #[test]
    fn parse_rejects_broken_json_string() {
        let raw = Value::String("{checklist: sin comillas".to_string());
        let err = VisitReport::parse(&raw).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn truthy_accepts_spanish_synonyms_and_booleans() {
        for value in [json!(true), json!("1"), json!("TRUE"), json!("Yes"), json!("si"), json!("Sí"), json!(1)] {
            assert!(is_truthy(&value), "esperaba truthy: {value}");
        }
        for value in [json!(false), json!("0"), json!("no"), json!(""), json!(null), json!(2)] {
            assert!(!is_truthy(&value), "esperaba falsy: {value}");
        }
    }

    #[test]
    fn validate_requires_location_verified() {
        let mut raw = valid_report_json();
        raw["location_verified"] = json!("no");
        let report = VisitReport::parse(&raw).unwrap();
        assert!(matches!(report.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_requires_name_and_signature() {
        let mut raw = valid_report_json();
        raw["responsible_name"] = json!("   ");
        let report = VisitReport::parse(&raw).unwrap();
        assert!(report.validate().is_err());

        let mut raw = valid_report_json();
        raw["responsible_signature"] = json!("");
        let report = VisitReport::parse(&raw).unwrap();
        assert!(report.validate().is_err());
    }

    #[test]
    fn passed_count_ignores_case() {
        let report = VisitReport::parse(&valid_report_json()).unwrap();
        assert_eq!(report.passed_count(), 2);
    }

    #[test]
    fn action_aliases_normalize() {
        assert_eq!(VisitAction::from_input("start"), Some(VisitAction::Start));
        assert_eq!(VisitAction::from_input("INICIAR"), Some(VisitAction::Start));
        assert_eq!(VisitAction::from_input("complete"), Some(VisitAction::Complete));
        assert_eq!(VisitAction::from_input(" Finalizar "), Some(VisitAction::Complete));
        assert_eq!(VisitAction::from_input("cancelar"), None);
    }
}
