//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::announcements::AnnouncementInput;

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<AnnouncementRequest> for AnnouncementInput {
    fn from(req: AnnouncementRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_become_empty() {
        let req: AnnouncementRequest = serde_json::from_str(r#"{"title": "hi"}"#).unwrap();
        let input: AnnouncementInput = req.into();
        assert_eq!(input.title, "hi");
        assert!(input.content.is_empty());
    }

    #[test]
    fn test_response_shapes() {
        let json = serde_json::to_value(CountResponse { count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 3 }));

        let json = serde_json::to_value(VersionResponse {
            version: "3.0.0".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "version": "3.0.0" }));
    }
}
