use tracing::instrument;

use super::repo;
use crate::api::ApiError;
use crate::auth::dto::User;
use crate::cards::dto::{CardStatistic, VisitCard};
use crate::state::AppState;
use crate::view::ViewStatus;

/// Totals on the admin dashboard. Always recomputed from a fresh fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: usize,
    pub total_cards: usize,
    pub total_views: u64,
    pub total_bot_interactions: u64,
}

impl AdminStats {
    pub fn aggregate(users: &[User], cards: &[VisitCard]) -> Self {
        Self {
            total_users: users.len(),
            total_cards: cards.len(),
            total_views: cards.iter().filter_map(|c| c.view_count).sum(),
            total_bot_interactions: cards.iter().filter_map(|c| c.bot_view_count).sum(),
        }
    }

    /// Users and cards, in that order.
    #[instrument(skip(st))]
    pub async fn fetch(st: &AppState) -> Result<Self, ApiError> {
        let users = repo::users(&st.api).await?;
        let cards = repo::cards(&st.api).await?;
        Ok(Self::aggregate(&users, &cards))
    }
}

/// Rounded mean, 0 for no cards.
pub fn average_views(total_views: u64, cards: usize) -> u64 {
    if cards == 0 {
        return 0;
    }
    let cards = cards as u64;
    (total_views + cards / 2) / cards
}

/// `/admin/statistics`: per-card rows plus totals.
#[derive(Debug, Default)]
pub struct StatisticsReport {
    pub rows: Vec<CardStatistic>,
    pub status: ViewStatus,
}

impl StatisticsReport {
    #[instrument(skip(self, st))]
    pub async fn load(&mut self, st: &AppState) -> Result<(), ApiError> {
        self.status.begin()?;
        match repo::card_stats(&st.api).await {
            Ok(rows) => {
                self.rows = rows;
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => Err(self.status.fail(e, "Failed to load statistics")),
        }
    }

    pub fn total_cards(&self) -> usize {
        self.rows.len()
    }

    pub fn total_views(&self) -> u64 {
        self.rows.iter().map(|r| r.view_count).sum()
    }

    pub fn total_bot_interactions(&self) -> u64 {
        self.rows.iter().map(|r| r.bot_view_count).sum()
    }

    pub fn average_views(&self) -> u64 {
        average_views(self.total_views(), self.total_cards())
    }
}
