//! Image lookup (avatars).

use std::sync::Arc;

use kernel::id::ImageId;

use crate::domain::entity::image::Image;
use crate::domain::repository::ImageRepository;
use crate::error::{AuthError, AuthResult};

pub struct ImageUseCase<R>
where
    R: ImageRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> ImageUseCase<R>
where
    R: ImageRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: &ImageId) -> AuthResult<Image> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::not_found("Image not found."))
    }
}
