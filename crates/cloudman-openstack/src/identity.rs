//! Keystone (identity) client
//!
//! Only project listing; authentication itself lives in the session module.

use crate::provider::OpenStack;
use async_trait::async_trait;
use cloudman_gateway::{IdentityApi, Project};
use serde::Deserialize;

#[async_trait]
impl IdentityApi for OpenStack {
    async fn list_projects(&self) -> cloudman_gateway::Result<Vec<Project>> {
        let base = &self.session().endpoints().identity;
        let response: ProjectsResponse = self
            .session()
            .get_json(&format!("{base}/projects"))
            .await?;
        Ok(response.projects)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Vec<Project>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_listing() {
        let raw = r#"{"projects": [
            {"id": "f52a01b7", "name": "Science", "enabled": true, "domain_id": "default"},
            {"id": "0a1b2c3d", "name": "Engineering", "enabled": true, "domain_id": "default"}
        ]}"#;
        let response: ProjectsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.projects.len(), 2);
        assert_eq!(response.projects[0].name, "Science");
    }
}
