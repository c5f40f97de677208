use tracing::{debug, instrument, warn};

use super::dto::VisitCard;
use super::repo;
use crate::api::ApiError;
use crate::routes::Route;
use crate::state::AppState;
use crate::view::ViewStatus;

const LOAD_FALLBACK: &str = "Failed to load company information";

/// The two ways a card page is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRoute {
    ById(u64),
    ByDomain(String),
}

impl CardRoute {
    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::Company(id) => Some(CardRoute::ById(*id)),
            Route::Domain(domain) => Some(CardRoute::ByDomain(domain.clone())),
            _ => None,
        }
    }
}

/// Which backend view of a card gets fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEndpoint {
    /// Owner/admin detail, bearer attached. Carries token and counters.
    OwnerDetail,
    PublicById,
    /// Domain alias, never authenticated.
    PublicByDomain,
}

/// Picks exactly one endpoint from the route and whether a token is held.
pub fn resolve(route: &CardRoute, has_token: bool) -> CardEndpoint {
    match (route, has_token) {
        (CardRoute::ByDomain(_), _) => CardEndpoint::PublicByDomain,
        (CardRoute::ById(_), true) => CardEndpoint::OwnerDetail,
        (CardRoute::ById(_), false) => CardEndpoint::PublicById,
    }
}

/// State of the public card page.
#[derive(Debug)]
pub struct CardDetailView {
    pub route: CardRoute,
    pub status: ViewStatus,
    pub card: Option<VisitCard>,
    pub endpoint: Option<CardEndpoint>,
    fetched: bool,
}

impl CardDetailView {
    pub fn new(route: CardRoute) -> Self {
        Self {
            route,
            status: ViewStatus::Idle,
            card: None,
            endpoint: None,
            fetched: false,
        }
    }

    /// Fetches the card once. Later calls on the same view do nothing.
    #[instrument(skip(self, st), fields(route = ?self.route))]
    pub async fn load(&mut self, st: &AppState) -> Result<(), ApiError> {
        if self.fetched {
            debug!("card already fetched for this navigation");
            return Ok(());
        }
        self.fetched = true;
        self.status.begin()?;

        let endpoint = resolve(&self.route, st.session.is_authenticated());
        self.endpoint = Some(endpoint);
        let result = match (&self.route, endpoint) {
            (CardRoute::ByDomain(domain), _) => repo::by_domain(&st.api, domain).await,
            (CardRoute::ById(id), CardEndpoint::OwnerDetail) => repo::detail(&st.api, *id).await,
            (CardRoute::ById(id), _) => repo::public_by_id(&st.api, *id).await,
        };

        match result {
            Ok(card) => {
                self.card = Some(card);
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "card page failed to load");
                Err(self.status.fail(e, LOAD_FALLBACK))
            }
        }
    }

    /// Counters are only shown when the owner detail returned them.
    pub fn shows_stats(&self) -> bool {
        self.endpoint == Some(CardEndpoint::OwnerDetail)
            && self.card.as_ref().is_some_and(|c| c.view_count.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubBackend;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    fn card_router() -> Router {
        let card = |body: serde_json::Value| move || {
            let body = body.clone();
            async move { Json(json!({ "visit_card": body })) }
        };
        Router::new()
            .route(
                "/api/v/:domain",
                get(card(json!({"id": 42, "title": "Acme", "domain": "acme"}))),
            )
            .route(
                "/api/visit-cards/:id",
                get(card(json!({"id": 42, "title": "Acme", "view_count": 5, "bot_view_count": 1}))),
            )
            .route(
                "/api/visit-cards/:id/public",
                get(card(json!({"id": 42, "title": "Acme"}))),
            )
    }

    #[test]
    fn resolution_table() {
        let domain = CardRoute::ByDomain("acme".into());
        assert_eq!(resolve(&domain, true), CardEndpoint::PublicByDomain);
        assert_eq!(resolve(&domain, false), CardEndpoint::PublicByDomain);
        assert_eq!(resolve(&CardRoute::ById(42), true), CardEndpoint::OwnerDetail);
        assert_eq!(resolve(&CardRoute::ById(42), false), CardEndpoint::PublicById);
        assert_eq!(CardRoute::from_route(&Route::Dashboard), None);
    }

    #[tokio::test]
    async fn domain_route_ignores_the_token() {
        let backend = StubBackend::spawn(card_router()).await;
        let st = backend.signed_in_state("admin");

        let route = CardRoute::from_route(&"/v/acme".parse().unwrap()).unwrap();
        let mut view = CardDetailView::new(route);
        view.load(&st).await.unwrap();

        let hits = backend.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri, "/api/v/acme");
        assert!(!hits[0].authorized);
        assert_eq!(view.card.unwrap().domain.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn id_route_with_token_uses_owner_detail() {
        let backend = StubBackend::spawn(card_router()).await;
        let st = backend.signed_in_state("user");

        let mut view = CardDetailView::new(CardRoute::ById(42));
        view.load(&st).await.unwrap();
        // one-shot: a second load is a no-op
        view.load(&st).await.unwrap();

        let hits = backend.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri, "/api/visit-cards/42");
        assert!(hits[0].authorized);
        assert!(view.shows_stats());
    }

    #[tokio::test]
    async fn id_route_without_token_uses_public_view() {
        let backend = StubBackend::spawn(card_router()).await;
        let st = backend.state();

        let mut view = CardDetailView::new(CardRoute::ById(42));
        view.load(&st).await.unwrap();

        let hits = backend.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uri, "/api/visit-cards/42/public");
        assert!(!hits[0].authorized);
        assert!(!view.shows_stats());
    }

    #[tokio::test]
    async fn not_found_shows_the_server_message() {
        let router = Router::new().route(
            "/api/v/:domain",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "Visit card not found"})),
                )
            }),
        );
        let backend = StubBackend::spawn(router).await;
        let st = backend.state();

        let mut view = CardDetailView::new(CardRoute::ByDomain("ghost".into()));
        view.load(&st).await.unwrap_err();
        assert_eq!(view.status.error(), Some("Visit card not found"));
        assert!(view.card.is_none());
    }
}
