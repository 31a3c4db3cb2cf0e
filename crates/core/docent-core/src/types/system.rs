//! Service discovery and operational status types

use serde::{Deserialize, Serialize};

/// Service configuration advertised to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Service display name
    #[serde(rename = "NAME", default)]
    pub name: String,

    /// Display names of the searchable indexes, in configured order
    #[serde(rename = "SEARCH_INDEX_NAME_JP_LIST", default)]
    pub index_names: Vec<String>,

    /// IDs of the searchable indexes, aligned with `index_names`
    #[serde(rename = "SEARCH_INDEX_NAME_ID_LIST", default)]
    pub index_ids: Vec<String>,

    /// Models a message may be answered with
    #[serde(rename = "MODEL_LIST", default)]
    pub model_list: Vec<String>,

    /// Model used when the client does not pick one
    #[serde(rename = "DEFAULT_MODEL", default)]
    pub default_model: Option<String>,
}

impl CoreConfig {
    /// Selectable indexes as `(id, display name)` pairs
    pub fn index_options(&self) -> Vec<(String, String)> {
        self.index_ids
            .iter()
            .cloned()
            .zip(self.index_names.iter().cloned())
            .collect()
    }
}

/// Maintenance gate checked before opening a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceStatus {
    /// True while the service is down for maintenance
    pub maintenance: bool,

    /// Operator-facing notice to display
    #[serde(default)]
    pub message: String,

    /// Operational state label
    #[serde(default)]
    pub status: String,
}

/// Sign-in URL handed out by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUrl {
    /// URL to open in a browser
    pub auth_url: String,
}

/// Generic mutation acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Whether the mutation took effect; absent means success
    #[serde(default)]
    pub success: Option<bool>,

    /// Human-readable result message
    #[serde(default)]
    pub message: Option<String>,
}

impl AckResponse {
    /// True unless the server explicitly reported failure
    pub fn ok(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_config_maps_upper_case_keys() {
        let config: CoreConfig = serde_json::from_str(
            r#"{
                "NAME": "docent",
                "SEARCH_INDEX_NAME_JP_LIST": ["Manuals", "Reports"],
                "SEARCH_INDEX_NAME_ID_LIST": ["idx-m", "idx-r"],
                "SEARCH_INDEX_AZURE_ID_LIST": ["idx-m", "idx-r"],
                "MODEL_LIST": ["gpt-4o-mini"],
                "DEFAULT_MODEL": "gpt-4o-mini"
            }"#,
        )
        .unwrap();
        assert_eq!(config.name, "docent");
        assert_eq!(
            config.index_options(),
            vec![
                ("idx-m".to_string(), "Manuals".to_string()),
                ("idx-r".to_string(), "Reports".to_string())
            ]
        );
    }

    #[test]
    fn test_ack_defaults_to_success() {
        assert!(AckResponse::default().ok());
        let failed: AckResponse =
            serde_json::from_str(r#"{"success": false, "message": "no such index"}"#).unwrap();
        assert!(!failed.ok());
    }
}
