//! Glance (image) client

use crate::provider::OpenStack;
use async_trait::async_trait;
use cloudman_gateway::{Image, ImageApi};
use serde::Deserialize;

#[async_trait]
impl ImageApi for OpenStack {
    async fn list_images(&self) -> cloudman_gateway::Result<Vec<Image>> {
        let base = &self.session().endpoints().image;
        let response: ImagesResponse = self
            .session()
            .get_json(&format!("{base}/v2/images"))
            .await?;
        Ok(response.images)
    }
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    images: Vec<Image>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_listing_ignores_extra_fields() {
        let raw = r#"{"images": [
            {"id": "img-1", "name": "ubuntu-24.04", "status": "active", "visibility": "public"}
        ]}"#;
        let response: ImagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.images[0].name, "ubuntu-24.04");
    }
}
