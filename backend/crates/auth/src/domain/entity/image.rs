//! Stored image (avatars).

use chrono::{DateTime, Utc};
use kernel::id::ImageId;

#[derive(Debug, Clone)]
pub struct Image {
    pub id: ImageId,
    pub content_type: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
