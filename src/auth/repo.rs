use serde_json::Value;
use tracing::instrument;

use super::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    User, UserEnvelope,
};
use crate::api::{ApiClient, ApiError, Auth};

#[instrument(skip(api, req), fields(email = %req.email))]
pub async fn login(api: &ApiClient, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
    api.post_json("/api/login", req, Auth::Never).await
}

#[instrument(skip(api, req), fields(email = %req.email))]
pub async fn register(api: &ApiClient, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
    api.post_json("/api/register", req, Auth::Never).await
}

#[instrument(skip(api))]
pub async fn profile(api: &ApiClient) -> Result<User, ApiError> {
    let envelope: UserEnvelope = api.get_json("/api/profile", Auth::Required).await?;
    Ok(envelope.user)
}

#[instrument(skip(api, req))]
pub async fn update_profile(api: &ApiClient, req: &UpdateProfileRequest) -> Result<User, ApiError> {
    let envelope: UserEnvelope = api.put_json("/api/profile", req, Auth::Required).await?;
    Ok(envelope.user)
}

#[instrument(skip(api, req))]
pub async fn change_password(api: &ApiClient, req: &ChangePasswordRequest) -> Result<(), ApiError> {
    let _: Value = api
        .put_json("/api/profile/password", req, Auth::Required)
        .await?;
    Ok(())
}

#[instrument(skip(api))]
pub async fn delete_account(api: &ApiClient) -> Result<(), ApiError> {
    api.delete("/api/profile", Auth::Required).await
}
