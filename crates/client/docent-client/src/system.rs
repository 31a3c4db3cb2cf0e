//! Deployment discovery endpoints

use docent_core::types::{CoreConfig, MaintenanceStatus, SearchIndexType};
use docent_core::Result;
use serde::Deserialize;

use crate::ApiClient;

#[derive(Debug, Deserialize)]
struct CoreName {
    #[serde(rename = "NAME")]
    name: String,
}

impl ApiClient {
    /// Deployment configuration: display name, index lists, model list
    pub async fn core_config(&self) -> Result<CoreConfig> {
        self.send_json(self.client.get(self.url("/core_config"))).await
    }

    /// Display name of the deployment only
    pub async fn core_name(&self) -> Result<String> {
        let body: CoreName = self
            .send_json(self.client.get(self.url("/core_name")))
            .await?;
        Ok(body.name)
    }

    /// Maintenance flag and banner message
    pub async fn maintenance_status(&self) -> Result<MaintenanceStatus> {
        self.send_json(self.client.get(self.url("/maintenance_status")))
            .await
    }

    /// Search index types visible to the signed-in user
    pub async fn search_index_types(&self) -> Result<Vec<SearchIndexType>> {
        self.send_json(self.client.get(self.url("/search_index_types")))
            .await
    }
}
