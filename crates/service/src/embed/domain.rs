use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use configs::DashboardIds;

/// Dashboards the portal can embed. Wire names are the portal's Portuguese slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardCategory {
    Financial,
    Pedagogical,
    Agenda,
    Registrar,
}

impl DashboardCategory {
    pub const ALL: [DashboardCategory; 4] = [
        DashboardCategory::Financial,
        DashboardCategory::Pedagogical,
        DashboardCategory::Agenda,
        DashboardCategory::Registrar,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "financeiro" => Some(DashboardCategory::Financial),
            "pedagogico" | "pedagógico" => Some(DashboardCategory::Pedagogical),
            "agenda" => Some(DashboardCategory::Agenda),
            "secretaria" => Some(DashboardCategory::Registrar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardCategory::Financial => "financeiro",
            DashboardCategory::Pedagogical => "pedagogico",
            DashboardCategory::Agenda => "agenda",
            DashboardCategory::Registrar => "secretaria",
        }
    }

    /// Dashboard id registered in Metabase for this category, unless overridden.
    pub fn default_dashboard_id(&self) -> u32 {
        match self {
            DashboardCategory::Financial => 52,
            DashboardCategory::Pedagogical => 53,
            DashboardCategory::Agenda => 54,
            DashboardCategory::Registrar => 55,
        }
    }

    pub fn dashboard_id(&self, overrides: &DashboardIds) -> u32 {
        let configured = match self {
            DashboardCategory::Financial => overrides.financeiro,
            DashboardCategory::Pedagogical => overrides.pedagogico,
            DashboardCategory::Agenda => overrides.agenda,
            DashboardCategory::Registrar => overrides.secretaria,
        };
        configured.unwrap_or_else(|| self.default_dashboard_id())
    }
}

/// Body of `POST /functions/v1/metabase-embed`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedRequest {
    #[serde(default)]
    pub dashboard_type: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_util::string_or_number")]
    pub proesc_id: Option<String>,
}

impl EmbedRequest {
    pub fn new(dashboard_type: &str, proesc_id: &str) -> Self {
        Self {
            dashboard_type: Some(dashboard_type.to_string()),
            proesc_id: Some(proesc_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResource {
    pub dashboard: u32,
}

/// Claims Metabase expects for a signed dashboard embed. Parameter values are
/// lists because Metabase treats every locked parameter as multi-valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedClaims {
    pub resource: EmbedResource,
    pub params: BTreeMap<String, Vec<String>>,
    pub exp: i64,
}

pub const ENTITY_PARAM: &str = "entity_id";

impl EmbedClaims {
    pub fn for_tenant(dashboard_id: u32, entity_id: &str, exp: i64) -> Self {
        let mut params = BTreeMap::new();
        params.insert(ENTITY_PARAM.to_string(), vec![entity_id.to_string()]);
        Self { resource: EmbedResource { dashboard: dashboard_id }, params, exp }
    }
}

/// Successful issuance, serialized as the function's response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedToken {
    pub iframe_url: String,
    pub dashboard_id: u32,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_round_trips_its_slug() {
        for cat in DashboardCategory::ALL {
            assert_eq!(DashboardCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(DashboardCategory::parse("Financeiro "), Some(DashboardCategory::Financial));
        assert_eq!(DashboardCategory::parse("marketing"), None);
    }

    #[test]
    fn overrides_replace_only_their_category() {
        let overrides = DashboardIds { agenda: Some(90), ..Default::default() };
        assert_eq!(DashboardCategory::Agenda.dashboard_id(&overrides), 90);
        assert_eq!(DashboardCategory::Financial.dashboard_id(&overrides), 52);
    }

    #[test]
    fn claims_serialize_in_metabase_shape() {
        let claims = EmbedClaims::for_tenant(52, "4442", 1_700_000_600);
        let v = serde_json::to_value(&claims).unwrap();
        assert_eq!(v["resource"]["dashboard"], 52);
        assert_eq!(v["params"]["entity_id"][0], "4442");
        assert_eq!(v["exp"], 1_700_000_600i64);
    }

    #[test]
    fn request_accepts_numeric_proesc_id() {
        let req: EmbedRequest =
            serde_json::from_value(serde_json::json!({"dashboardType": "agenda", "proescId": 4442})).unwrap();
        assert_eq!(req.proesc_id.as_deref(), Some("4442"));
    }
}
