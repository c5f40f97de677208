use tracing::{info, instrument};

use super::repo;
use super::users::contains_ci;
use crate::api::ApiError;
use crate::cards::dto::VisitCard;
use crate::cards::repo as card_repo;
use crate::state::AppState;
use crate::view::{Confirm, ViewStatus};

/// `/admin/visit-cards`: every card, filterable, deletable.
#[derive(Debug, Default)]
pub struct CardManager {
    pub cards: Vec<VisitCard>,
    pub search: String,
    pub status: ViewStatus,
}

impl CardManager {
    #[instrument(skip(self, st))]
    pub async fn load(&mut self, st: &AppState) -> Result<(), ApiError> {
        self.status.begin()?;
        match repo::cards(&st.api).await {
            Ok(cards) => {
                self.cards = cards;
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => Err(self.status.fail(e, "Failed to load visit cards")),
        }
    }

    /// Case-insensitive match on title, description, owner name or owner
    /// company.
    pub fn filtered(&self) -> Vec<&VisitCard> {
        let needle = self.search.trim().to_lowercase();
        self.cards
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || contains_ci(&c.title, &needle)
                    || contains_ci(&c.description, &needle)
                    || c.owner_name().is_some_and(|n| contains_ci(n, &needle))
                    || c.owner_company().is_some_and(|n| contains_ci(n, &needle))
            })
            .collect()
    }

    #[instrument(skip(self, st, confirm))]
    pub async fn delete(
        &mut self,
        st: &AppState,
        id: u64,
        confirm: &impl Confirm,
    ) -> Result<bool, ApiError> {
        if !confirm.confirm(
            "Are you sure you want to delete this visit card? This action cannot be undone.",
        ) {
            return Ok(false);
        }
        match card_repo::delete(&st.api, id).await {
            Ok(()) => {
                self.cards.retain(|c| c.id != id);
                info!(card_id = id, "visit card deleted by admin");
                Ok(true)
            }
            Err(e) => Err(self.status.fail(e, "Failed to delete visit card")),
        }
    }
}
