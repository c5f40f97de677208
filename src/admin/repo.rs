use serde::Serialize;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, Auth};
use crate::auth::claims::Role;
use crate::auth::dto::{User, UserEnvelope, UsersEnvelope};
use crate::cards::dto::{CardStatistic, CardsEnvelope, StatsEnvelope, VisitCard};

/// Fields an admin may change on any account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUserUpdate {
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub role: Role,
}

#[instrument(skip(api))]
pub async fn users(api: &ApiClient) -> Result<Vec<User>, ApiError> {
    let envelope: UsersEnvelope = api.get_json("/api/admin/users", Auth::Required).await?;
    Ok(envelope.users)
}

#[instrument(skip(api))]
pub async fn user(api: &ApiClient, id: u64) -> Result<User, ApiError> {
    let envelope: UserEnvelope = api
        .get_json(&format!("/api/admin/users/{id}"), Auth::Required)
        .await?;
    Ok(envelope.user)
}

#[instrument(skip(api, update), fields(role = %update.role))]
pub async fn update_user(api: &ApiClient, id: u64, update: &AdminUserUpdate) -> Result<User, ApiError> {
    let envelope: UserEnvelope = api
        .put_json(&format!("/api/admin/users/{id}"), update, Auth::Required)
        .await?;
    Ok(envelope.user)
}

#[instrument(skip(api))]
pub async fn delete_user(api: &ApiClient, id: u64) -> Result<(), ApiError> {
    api.delete(&format!("/api/admin/users/{id}"), Auth::Required)
        .await
}

#[instrument(skip(api))]
pub async fn cards(api: &ApiClient) -> Result<Vec<VisitCard>, ApiError> {
    let envelope: CardsEnvelope = api
        .get_json("/api/admin/visit-cards", Auth::Required)
        .await?;
    Ok(envelope.visit_cards)
}

#[instrument(skip(api))]
pub async fn card_stats(api: &ApiClient) -> Result<Vec<CardStatistic>, ApiError> {
    let envelope: StatsEnvelope = api
        .get_json("/api/admin/visit-cards/stats", Auth::Required)
        .await?;
    Ok(envelope.all_stats)
}
