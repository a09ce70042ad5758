//! Create Paste Use Case

use std::sync::Arc;

use auth::UserContext;
use auth::domain::Scope;
use chrono::Utc;
use kernel::action_log::{ActionLogType, log_action};
use kernel::expires_in::ExpiresIn;
use kernel::id::{PasteId, PastyId, generate_while, generate_while_async};

use crate::application::encryption::{self, EncryptionKeys};
use crate::application::languages::LanguageUseCase;
use crate::domain::entities::{Paste, PasteContent, Pasty};
use crate::domain::repository::{LanguageDetector, PasteStore};
use crate::domain::services::{MAX_PASTY_TITLE_LEN, MAX_TITLE_LEN, normalize_tags};
use crate::error::{PasteError, PasteResult};

/// Pasty as submitted by the client
#[derive(Debug, Clone, Default)]
pub struct PastyInput {
    /// Only honoured on edit
    pub id: Option<PastyId>,
    pub title: String,
    pub content: String,
    /// Name, alias or extension; `None` means Text
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreatePasteInput {
    pub title: String,
    pub pasties: Vec<PastyInput>,
    pub expires_in: ExpiresIn,
    pub anonymous: bool,
    pub private: bool,
    pub pinned: bool,
    pub encrypted: bool,
    pub tags: Vec<String>,
}

/// Shape checks shared by create and edit
pub(crate) fn validate_content(title: &str, pasties: &[PastyInput]) -> PasteResult<()> {
    if pasties.is_empty() {
        return Err(PasteError::bad_request(
            "A paste must have at least one pasty.",
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(PasteError::bad_request(format!(
            "The title can be at most {MAX_TITLE_LEN} characters long."
        )));
    }
    if pasties
        .iter()
        .any(|p| p.title.chars().count() > MAX_PASTY_TITLE_LEN)
    {
        return Err(PasteError::bad_request(format!(
            "Pasty titles can be at most {MAX_PASTY_TITLE_LEN} characters long."
        )));
    }
    Ok(())
}

/// Resolve languages and assign ids unique within the paste.
///
/// With `keep_ids` (edit) a supplied id survives unless an earlier pasty
/// already claimed it. Everything else gets a fresh id.
pub(crate) async fn build_pasties<D>(
    languages: &LanguageUseCase<D>,
    inputs: Vec<PastyInput>,
    keep_ids: bool,
) -> PasteResult<Vec<Pasty>>
where
    D: LanguageDetector + Send + Sync + 'static,
{
    let mut pasties: Vec<Pasty> = Vec::with_capacity(inputs.len());
    let supplied: Vec<PastyId> = if keep_ids {
        inputs.iter().filter_map(|p| p.id.clone()).collect()
    } else {
        Vec::new()
    };

    for input in inputs {
        let language = languages
            .resolve(input.language.as_deref(), &input.content)
            .await?;
        let kept = input
            .id
            .filter(|id| keep_ids && !pasties.iter().any(|p| &p.id == id));
        let id = match kept {
            Some(id) => id,
            None => generate_while(|id: &PastyId| {
                supplied.contains(id) || pasties.iter().any(|p| &p.id == id)
            }),
        };
        pasties.push(Pasty {
            id,
            title: input.title,
            content: input.content,
            language,
        });
    }

    Ok(pasties)
}

pub struct CreatePasteUseCase<R, D>
where
    R: PasteStore,
    D: LanguageDetector + Send + Sync + 'static,
{
    repo: Arc<R>,
    languages: LanguageUseCase<D>,
}

impl<R, D> CreatePasteUseCase<R, D>
where
    R: PasteStore,
    D: LanguageDetector + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, languages: LanguageUseCase<D>) -> Self {
        Self { repo, languages }
    }

    pub async fn execute(
        &self,
        ctx: &UserContext,
        input: CreatePasteInput,
        keys: &EncryptionKeys,
    ) -> PasteResult<Paste> {
        validate_content(&input.title, &input.pasties)?;
        check_create_rules(ctx, &input)?;

        let key = if input.encrypted {
            Some(
                keys.header
                    .as_deref()
                    .ok_or(PasteError::MissingEncryptionKey)?,
            )
        } else {
            None
        };

        let pasties = build_pasties(&self.languages, input.pasties, false).await?;

        let repo = self.repo.clone();
        let id: PasteId = generate_while_async(|id| {
            let repo = repo.clone();
            async move { repo.exists_by_id(&id).await }
        })
        .await?;

        let created_at = Utc::now();
        let owner_id = if input.anonymous {
            None
        } else {
            ctx.user().map(|u| u.id.clone())
        };

        let mut paste = Paste {
            id,
            title: input.title,
            created_at,
            expires_in: input.expires_in,
            deletes_at: input.expires_in.to_deletes_at(created_at),
            owner_id,
            private: input.private,
            pinned: input.pinned,
            tags: normalize_tags(input.tags),
            stars: 0,
            pasties,
            history: Vec::new(),
            encrypted: None,
        };

        if let Some(key) = key {
            let content = PasteContent {
                pasties: paste.pasties.clone(),
                history: Vec::new(),
            };
            paste.encrypted = Some(encryption::seal(&content, key).await?);
        }

        self.repo.create(&paste).await?;
        log_action(self.repo.as_ref(), ActionLogType::PasteCreated, paste.id.as_str()).await;

        tracing::info!(
            paste_id = %paste.id,
            pasties = paste.pasties.len(),
            encrypted = paste.is_encrypted(),
            "Paste created"
        );

        Ok(paste)
    }
}

/// Who may create what, checked in a fixed order
fn check_create_rules(ctx: &UserContext, input: &CreatePasteInput) -> PasteResult<()> {
    let logged_in = ctx.is_logged_in();

    if input.pinned {
        if !logged_in {
            return Err(PasteError::unauthorized(
                "Can't create a pinned paste while unauthorized.",
            ));
        }
        if input.private || input.anonymous {
            return Err(PasteError::unauthorized(
                "Can't create a private or anonymous pinned paste.",
            ));
        }
    }

    if input.private {
        if !logged_in {
            return Err(PasteError::unauthorized(
                "Can't create a private paste while unauthorized.",
            ));
        }
        if input.anonymous {
            return Err(PasteError::bad_request(
                "Can't create a private anonymous paste.",
            ));
        }
    }

    if !input.tags.is_empty() {
        if !logged_in {
            return Err(PasteError::unauthorized(
                "Can't create a tagged paste while unauthorized.",
            ));
        }
        if input.anonymous {
            return Err(PasteError::bad_request(
                "Can't create a tagged anonymous paste.",
            ));
        }
    }

    if logged_in && !input.anonymous {
        ctx.require_scope(&[Scope::Paste])?;
    }

    Ok(())
}
