use tracing::{debug, instrument, warn};

use super::dto::{Pagination, VisitCard};
use super::repo::{self, DirectoryQuery};
use crate::api::ApiError;
use crate::auth::{claims::Role, repo as auth_repo};
use crate::routes::Route;
use crate::state::AppState;
use crate::view::ViewStatus;

pub const MAX_PAGE_BUTTONS: u32 = 5;

/// Who is looking at the directory; decides the per-row buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewer {
    #[default]
    Anonymous,
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLink {
    pub label: &'static str,
    pub route: Route,
}

/// Buttons for one directory row. Admins get the domain view and the id
/// view side by side; everyone else gets a single one.
pub fn view_links(card: &VisitCard, viewer: Viewer) -> Vec<ViewLink> {
    let by_id = Route::Company(card.id);
    match (viewer, &card.domain) {
        (Viewer::Admin, Some(domain)) => vec![
            ViewLink {
                label: "Domain View",
                route: Route::Domain(domain.clone()),
            },
            ViewLink {
                label: "ID View",
                route: by_id,
            },
        ],
        (_, Some(domain)) => vec![ViewLink {
            label: "View Profile",
            route: Route::Domain(domain.clone()),
        }],
        (_, None) => vec![ViewLink {
            label: "View Profile",
            route: by_id,
        }],
    }
}

/// Page numbers to show as buttons: at most `max` of them around
/// `current`, shifted to stay inside `1..=total`.
pub fn page_window(current: u32, total: u32, max: u32) -> Vec<u32> {
    if total == 0 || max == 0 {
        return Vec::new();
    }
    let (current, total, max) = (i64::from(current), i64::from(total), i64::from(max));
    let mut start = (current - max / 2).max(1);
    let end = (start + max - 1).min(total);
    if end - start + 1 < max {
        start = (end - max + 1).max(1);
    }
    (start..=end).map(|p| p as u32).collect()
}

/// The "Showing a-b of N" line. All zero for an empty result.
pub fn showing_range(page: u32, limit: u32, total: u64) -> (u64, u64, u64) {
    if total == 0 || limit == 0 {
        return (0, 0, total);
    }
    let page = u64::from(page.max(1));
    let limit = u64::from(limit);
    let first = (page - 1) * limit + 1;
    let last = (page * limit).min(total);
    (first, last, total)
}

/// Public directory: paging, search, and the fetched page.
#[derive(Debug)]
pub struct Directory {
    page: u32,
    page_size: u32,
    search: String,
    pub viewer: Viewer,
    pub cards: Vec<VisitCard>,
    pub pagination: Pagination,
    pub status: ViewStatus,
    fetched: Option<DirectoryQuery>,
}

impl Directory {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            viewer: Viewer::Anonymous,
            cards: Vec::new(),
            pagination: Pagination::default(),
            status: ViewStatus::Idle,
            fetched: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn total_pages(&self) -> u32 {
        self.pagination.pages
    }

    pub fn query(&self) -> DirectoryQuery {
        DirectoryQuery::new(self.page, self.page_size, &self.search)
    }

    /// A new term always starts again from the first page.
    pub fn set_search(&mut self, term: &str) -> bool {
        if term == self.search {
            return false;
        }
        self.search = term.to_string();
        self.page = 1;
        true
    }

    /// Ignores pages outside `1..=total_pages` and the current page.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.total_pages() || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn window(&self) -> Vec<u32> {
        page_window(self.page, self.total_pages(), MAX_PAGE_BUTTONS)
    }

    pub fn showing(&self) -> (u64, u64, u64) {
        showing_range(self.page, self.page_size, self.pagination.total)
    }

    pub fn is_stale(&self) -> bool {
        self.fetched.as_ref() != Some(&self.query())
    }

    /// Fetches the current page unless exactly this query was already
    /// fetched. Returns whether a request went out.
    #[instrument(skip(self, st), fields(page = self.page, search = %self.search))]
    pub async fn refresh(&mut self, st: &AppState) -> Result<bool, ApiError> {
        if !self.is_stale() {
            debug!("directory query unchanged");
            return Ok(false);
        }
        let query = self.query();
        self.status.begin()?;
        match repo::public_page(&st.api, &query).await {
            Ok(page) => {
                self.cards = page.visit_cards;
                self.pagination = page.pagination;
                self.fetched = Some(query);
                self.status = ViewStatus::Idle;
                Ok(true)
            }
            Err(e) => Err(self.status.fail(e, "Failed to load companies")),
        }
    }

    /// Works out the viewer from the profile. Any failure means anonymous.
    #[instrument(skip(self, st))]
    pub async fn identify_viewer(&mut self, st: &AppState) -> Viewer {
        self.viewer = if !st.session.is_authenticated() {
            Viewer::Anonymous
        } else {
            match auth_repo::profile(&st.api).await {
                Ok(user) if user.role == Role::Admin => Viewer::Admin,
                Ok(_) => Viewer::User,
                Err(e) => {
                    warn!(error = %e, "profile unavailable; browsing anonymously");
                    Viewer::Anonymous
                }
            }
        };
        self.viewer
    }

    pub fn links(&self, card: &VisitCard) -> Vec<ViewLink> {
        view_links(card, self.viewer)
    }
}
