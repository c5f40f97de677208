use serde::Serialize;
use tracing::instrument;

use super::dto::{
    CardEnvelope, CardPayload, CardStats, CardStatsEnvelope, CardsEnvelope, PublicCardsPage,
    VisitCard,
};
use crate::api::{ApiClient, ApiError, Auth};
use crate::images::LogoFile;

/// Query of the public directory listing. `search` is left out when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl DirectoryQuery {
    pub fn new(page: u32, limit: u32, search: &str) -> Self {
        let search = search.trim();
        Self {
            page,
            limit,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }
}

#[instrument(skip(api))]
pub async fn my_cards(api: &ApiClient) -> Result<Vec<VisitCard>, ApiError> {
    let envelope: CardsEnvelope = api.get_json("/api/visit-cards/my", Auth::Required).await?;
    Ok(envelope.visit_cards)
}

#[instrument(skip(api))]
pub async fn public_page(api: &ApiClient, query: &DirectoryQuery) -> Result<PublicCardsPage, ApiError> {
    api.get_json_with_query("/api/visit-cards/public", query, Auth::Never)
        .await
}

/// Full record for the owner or an admin.
#[instrument(skip(api))]
pub async fn detail(api: &ApiClient, id: u64) -> Result<VisitCard, ApiError> {
    let envelope: CardEnvelope = api
        .get_json(&format!("/api/visit-cards/{id}"), Auth::Required)
        .await?;
    Ok(envelope.visit_card)
}

#[instrument(skip(api))]
pub async fn public_by_id(api: &ApiClient, id: u64) -> Result<VisitCard, ApiError> {
    let envelope: CardEnvelope = api
        .get_json(&format!("/api/visit-cards/{id}/public"), Auth::Never)
        .await?;
    Ok(envelope.visit_card)
}

#[instrument(skip(api))]
pub async fn by_domain(api: &ApiClient, domain: &str) -> Result<VisitCard, ApiError> {
    let envelope: CardEnvelope = api
        .get_json_segments(&["api", "v", domain], Auth::Never)
        .await?;
    Ok(envelope.visit_card)
}

#[instrument(skip(api, payload), fields(title = %payload.title))]
pub async fn create(api: &ApiClient, payload: &CardPayload) -> Result<VisitCard, ApiError> {
    let envelope: CardEnvelope = api
        .post_json("/api/visit-cards", payload, Auth::Required)
        .await?;
    Ok(envelope.visit_card)
}

#[instrument(skip(api, payload), fields(title = %payload.title))]
pub async fn update(api: &ApiClient, id: u64, payload: &CardPayload) -> Result<VisitCard, ApiError> {
    let envelope: CardEnvelope = api
        .put_json(&format!("/api/visit-cards/{id}"), payload, Auth::Required)
        .await?;
    Ok(envelope.visit_card)
}

#[instrument(skip(api))]
pub async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
    api.delete(&format!("/api/visit-cards/{id}"), Auth::Required)
        .await
}

#[instrument(skip(api, logo), fields(file = %logo.file_name, size = logo.size()))]
pub async fn upload_logo(api: &ApiClient, id: u64, logo: LogoFile) -> Result<(), ApiError> {
    let form = logo.into_form().map_err(ApiError::transport)?;
    api.put_multipart(&format!("/api/visit-cards/{id}/logo"), form)
        .await
}

#[instrument(skip(api))]
pub async fn delete_logo(api: &ApiClient, id: u64) -> Result<(), ApiError> {
    api.delete(&format!("/api/visit-cards/{id}/logo"), Auth::Required)
        .await
}

#[instrument(skip(api))]
pub async fn stats(api: &ApiClient, id: u64) -> Result<CardStats, ApiError> {
    let envelope: CardStatsEnvelope = api
        .get_json(&format!("/api/visit-cards/{id}/stats"), Auth::Required)
        .await?;
    Ok(envelope.stats)
}
