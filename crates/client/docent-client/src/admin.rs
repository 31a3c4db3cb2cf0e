//! Admin-only endpoints: dashboard, user roles, index maintenance

use docent_core::types::{AckResponse, AdminDashboard, SearchIndexType, UserRole};
use docent_core::Result;
use serde::Serialize;

use crate::ApiClient;

#[derive(Debug, Serialize)]
struct UserRoleBody<'a> {
    user_id: &'a str,
    role: &'a str,
}

#[derive(Debug, Serialize)]
struct RenameIndexBody<'a> {
    index_type_id: &'a str,
    folder_name: &'a str,
}

#[derive(Debug, Serialize)]
struct ReorderIndexesBody<'a> {
    index_type_ids: &'a [String],
}

impl ApiClient {
    /// Usage dashboard: recent chat counts, daily transition, users
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        self.send_json(self.client.get(self.url("/admin"))).await
    }

    /// Change a user's role
    pub async fn update_user_role(&self, user_id: &str, role: UserRole) -> Result<AckResponse> {
        let body = UserRoleBody {
            user_id,
            role: role.as_str(),
        };
        self.send_json(self.client.put(self.url("/user/role")).json(&body))
            .await
    }

    /// All search index types with display order, admin view
    pub async fn admin_search_index_types(&self) -> Result<Vec<SearchIndexType>> {
        self.send_json(self.client.get(self.url("/admin/search_index_types")))
            .await
    }

    /// Rename an index type's display folder
    pub async fn rename_search_index_type(
        &self,
        index_type_id: &str,
        folder_name: &str,
    ) -> Result<AckResponse> {
        let body = RenameIndexBody {
            index_type_id,
            folder_name,
        };
        self.send_json(
            self.client
                .put(self.url("/admin/search_index_type"))
                .json(&body),
        )
        .await
    }

    /// Reorder index types; ids are the complete new order
    pub async fn reorder_search_index_types(&self, index_type_ids: &[String]) -> Result<AckResponse> {
        let body = ReorderIndexesBody { index_type_ids };
        self.send_json(
            self.client
                .put(self.url("/admin/search_index_types/reorder"))
                .json(&body),
        )
        .await
    }
}
