//! API DTOs (Data Transfer Objects)

use kernel::expires_in::ExpiresIn;
use kernel::id::PastyId;
use serde::Deserialize;

use crate::application::create_paste::{CreatePasteInput, PastyInput};
use crate::application::edit_paste::EditPasteInput;
use crate::application::user_pastes::{DEFAULT_PAGE_SIZE, PageRequest};

// ============================================================================
// Pastes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastyRequest {
    #[serde(default)]
    pub id: Option<PastyId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl From<PastyRequest> for PastyInput {
    fn from(req: PastyRequest) -> Self {
        Self {
            id: req.id,
            title: req.title,
            content: req.content,
            language: req.language,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pasties: Vec<PastyRequest>,
    #[serde(default)]
    pub expires_in: ExpiresIn,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<CreatePasteRequest> for CreatePasteInput {
    fn from(req: CreatePasteRequest) -> Self {
        Self {
            title: req.title,
            pasties: req.pasties.into_iter().map(Into::into).collect(),
            expires_in: req.expires_in,
            anonymous: req.anonymous,
            private: req.private,
            pinned: req.pinned,
            encrypted: req.encrypted,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPasteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pasties: Vec<PastyRequest>,
}

impl From<EditPasteRequest> for EditPasteInput {
    fn from(req: EditPasteRequest) -> Self {
        Self {
            title: req.title,
            pasties: req.pasties.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuery {
    pub history: Option<String>,
}

// ============================================================================
// User listings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub tag: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(0),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}
