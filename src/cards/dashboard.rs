use tracing::{info, instrument, warn};

use super::dto::VisitCard;
use super::repo;
use crate::api::ApiError;
use crate::auth::{dto::User, repo as auth_repo};
use crate::routes::{Redirect, Route};
use crate::state::AppState;
use crate::view::{Confirm, ViewStatus};

/// The owner's dashboard: profile plus own cards.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub user: Option<User>,
    pub cards: Vec<VisitCard>,
    pub status: ViewStatus,
}

impl Dashboard {
    /// Loads profile then cards. Returns a redirect to the login screen
    /// when there is no session or either call fails; a failure also
    /// drops the stored session.
    #[instrument(skip(self, st))]
    pub async fn load(&mut self, st: &AppState) -> Option<Redirect> {
        if !st.session.is_authenticated() {
            return Some(Redirect::now(Route::Login));
        }
        if self.status.begin().is_err() {
            return None;
        }

        let loaded = async {
            let user = auth_repo::profile(&st.api).await?;
            let cards = repo::my_cards(&st.api).await?;
            Ok::<_, ApiError>((user, cards))
        }
        .await;

        match loaded {
            Ok((user, cards)) => {
                self.user = Some(user);
                self.cards = cards;
                self.status = ViewStatus::Idle;
                None
            }
            Err(e) => {
                warn!(error = %e, "dashboard failed to load; signing out");
                self.status.fail(e, "Failed to load dashboard data");
                if let Err(e) = st.session.sign_out() {
                    warn!(error = %e, "cannot clear session");
                }
                Some(Redirect::now(Route::Login))
            }
        }
    }

    /// Deletes one of the owner's cards after confirmation. Returns whether
    /// the card was removed.
    #[instrument(skip(self, st, confirm))]
    pub async fn delete_card(
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
        match repo::delete(&st.api, id).await {
            Ok(()) => {
                self.cards.retain(|c| c.id != id);
                info!(card_id = id, "visit card deleted");
                Ok(true)
            }
            Err(e) => Err(self.status.fail(e, "Failed to delete visit card")),
        }
    }
}
