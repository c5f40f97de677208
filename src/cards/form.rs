use std::path::Path;

use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::dto::{CardPayload, VisitCard};
use super::repo;
use crate::api::ApiError;
use crate::images::{LogoError, LogoFile};
use crate::routes::{Redirect, Route};
use crate::state::AppState;
use crate::view::{Confirm, ViewStatus};

pub const BOT_TOKEN_FORMAT_ERROR: &str = "Invalid bot token format. Bot tokens should follow the format: digits:letters (e.g., 123456789:ABCdefGhIJKlmNoPQRsTUVwxyz)";

pub fn is_valid_bot_token(token: &str) -> bool {
    lazy_static! {
        static ref BOT_TOKEN_RE: Regex = Regex::new(r"^\d+:[A-Za-z0-9_-]{35}$").unwrap();
    }
    BOT_TOKEN_RE.is_match(token)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

/// Create/edit form for a visit card, including the logo picker.
#[derive(Debug)]
pub struct CardForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub bot_token: String,
    /// Logo already stored for the card.
    pub current_logo: Option<String>,
    /// New file waiting to be uploaded on submit.
    pub new_logo: Option<LogoFile>,
    pub status: ViewStatus,
}

impl CardForm {
    pub fn create() -> Self {
        Self::with_mode(FormMode::Create)
    }

    pub fn edit(id: u64) -> Self {
        Self::with_mode(FormMode::Edit(id))
    }

    fn with_mode(mode: FormMode) -> Self {
        Self {
            mode,
            title: String::new(),
            description: String::new(),
            domain: String::new(),
            bot_token: String::new(),
            current_logo: None,
            new_logo: None,
            status: ViewStatus::Idle,
        }
    }

    pub fn card_id(&self) -> Option<u64> {
        match self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    fn fill(&mut self, card: VisitCard) {
        self.title = card.title;
        self.description = card.description;
        self.domain = card.domain.unwrap_or_default();
        self.bot_token = card.telegram_bot_token.unwrap_or_default();
        self.current_logo = card.logo_url;
    }

    /// Edit mode pre-fills the fields from the authenticated detail view.
    #[instrument(skip(self, st))]
    pub async fn load(&mut self, st: &AppState) -> Result<(), ApiError> {
        let Some(id) = self.card_id() else {
            return Ok(());
        };
        self.status.begin()?;
        match repo::detail(&st.api, id).await {
            Ok(card) => {
                self.fill(card);
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => Err(self.status.fail(e, "Failed to load visit card")),
        }
    }

    fn attach(&mut self, picked: Result<LogoFile, LogoError>) -> Result<(), ApiError> {
        match picked {
            Ok(logo) => {
                self.new_logo = Some(logo);
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "logo rejected");
                Err(self
                    .status
                    .fail(ApiError::Validation(e.to_string()), "Invalid logo file"))
            }
        }
    }

    /// File-picker selection. A rejected file is not attached.
    pub async fn select_logo_file(&mut self, path: &Path) -> Result<(), ApiError> {
        let picked = LogoFile::from_path(path).await;
        self.attach(picked)
    }

    /// Drag-and-drop. A rejected file is not attached.
    pub fn drop_logo(
        &mut self,
        file_name: &str,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Result<(), ApiError> {
        let picked = LogoFile::from_drop(file_name, content_type, body);
        self.attach(picked)
    }

    /// Forgets the pending file only; the stored logo is untouched.
    pub fn clear_logo_selection(&mut self) {
        self.new_logo = None;
    }

    /// Deletes the stored logo after an explicit confirmation. Returns
    /// whether anything was sent.
    #[instrument(skip(self, st, confirm))]
    pub async fn remove_logo(
        &mut self,
        st: &AppState,
        confirm: &impl Confirm,
    ) -> Result<bool, ApiError> {
        let Some(id) = self.card_id() else {
            return Ok(false);
        };
        if self.current_logo.is_none() {
            return Ok(false);
        }
        if !confirm.confirm("Are you sure you want to remove the logo?") {
            return Ok(false);
        }
        self.status.begin()?;
        match repo::delete_logo(&st.api, id).await {
            Ok(()) => {
                self.current_logo = None;
                self.status = ViewStatus::Succeeded("Logo removed successfully".into());
                info!(card_id = id, "logo removed");
                Ok(true)
            }
            Err(e) => Err(self.status.fail(e, "Failed to remove logo")),
        }
    }

    /// Client-side checks. Produces the request body on success.
    pub fn validate(&self) -> Result<CardPayload, ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("Title is required".into()));
        }
        let bot_token = self.bot_token.trim();
        if !bot_token.is_empty() && !is_valid_bot_token(bot_token) {
            return Err(ApiError::Validation(BOT_TOKEN_FORMAT_ERROR.into()));
        }
        Ok(CardPayload {
            title: title.to_string(),
            description: self.description.clone(),
            domain: self.domain.trim().to_string(),
            telegram_bot_token: bot_token.to_string(),
        })
    }

    /// Saves the text fields, then uploads the pending logo against the
    /// saved card. Success only when both steps succeed.
    #[instrument(skip(self, st), fields(mode = ?self.mode))]
    pub async fn submit(&mut self, st: &AppState) -> Result<Redirect, ApiError> {
        let fallback = match self.mode {
            FormMode::Create => "Failed to create visit card",
            FormMode::Edit(_) => "Failed to update visit card",
        };
        self.status.begin()?;
        let payload = match self.validate() {
            Ok(payload) => payload,
            Err(e) => return Err(self.status.fail(e, fallback)),
        };

        let saved = match self.mode {
            FormMode::Create => repo::create(&st.api, &payload).await,
            FormMode::Edit(id) => repo::update(&st.api, id, &payload).await,
        };
        let saved = match saved {
            Ok(card) => card,
            Err(e) => return Err(self.status.fail(e, fallback)),
        };

        let created = self.mode == FormMode::Create;
        // the card exists from here on; a retry must update, not create again
        self.mode = FormMode::Edit(saved.id);
        self.current_logo = saved.logo_url.clone();

        if let Some(logo) = self.new_logo.clone() {
            if let Err(e) = repo::upload_logo(&st.api, saved.id, logo).await {
                warn!(card_id = saved.id, error = %e, "card saved but logo upload failed");
                return Err(self.status.fail(e, "Failed to upload logo"));
            }
            self.new_logo = None;
        }

        let message = if created {
            "Visit card created successfully!"
        } else {
            "Visit card updated successfully!"
        };
        info!(card_id = saved.id, created, "visit card saved");
        self.status = ViewStatus::Succeeded(message.into());
        Ok(Redirect::after(Route::Dashboard, st.config.redirect_delay))
    }
}
