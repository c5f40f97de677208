use std::time::Duration;

use tracing::{error, info, instrument, warn};

use super::dto::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use super::repo;
use super::services::{normalize_email, validate_password_change, validate_registration_password};
use crate::api::ApiError;
use crate::routes::{Redirect, Route};
use crate::state::AppState;
use crate::view::ViewStatus;

const PASSWORD_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub status: ViewStatus,
}

impl LoginForm {
    #[instrument(skip(self, st))]
    pub async fn submit(&mut self, st: &AppState) -> Result<Redirect, ApiError> {
        self.status.begin()?;
        let email = match normalize_email(&self.email) {
            Ok(email) => email,
            Err(e) => return Err(self.status.fail(e, "Login failed")),
        };
        let req = LoginRequest {
            email,
            password: self.password.clone(),
        };

        let resp = match repo::login(&st.api, &req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "login rejected");
                return Err(self.status.fail(e, "Login failed"));
            }
        };
        store_token(st, resp.token, &mut self.status)?;
        info!(email = %req.email, "user logged in");
        self.status = ViewStatus::Idle;
        Ok(Redirect::now(Route::Dashboard))
    }
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub company_name: String,
    pub status: ViewStatus,
}

impl RegisterForm {
    #[instrument(skip(self, st))]
    pub async fn submit(&mut self, st: &AppState) -> Result<Redirect, ApiError> {
        self.status.begin()?;
        let email = match normalize_email(&self.email)
            .and_then(|email| validate_registration_password(&self.password).map(|()| email))
        {
            Ok(email) => email,
            Err(e) => return Err(self.status.fail(e, "Registration failed")),
        };
        let req = RegisterRequest {
            email,
            password: self.password.clone(),
            name: self.name.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
        };

        let resp = match repo::register(&st.api, &req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "registration rejected");
                return Err(self.status.fail(e, "Registration failed"));
            }
        };
        store_token(st, resp.token, &mut self.status)?;
        info!(email = %req.email, "user registered");
        self.status = ViewStatus::Idle;
        Ok(Redirect::now(Route::Dashboard))
    }
}

fn store_token(st: &AppState, token: String, status: &mut ViewStatus) -> Result<(), ApiError> {
    st.session.sign_in(token).map(|_| ()).map_err(|e| {
        error!(error = %e, "cannot persist session");
        status.fail(ApiError::Transport(e.to_string()), "Could not save session")
    })
}

/// Forgets token and role, then goes home.
pub fn logout(st: &AppState) -> Result<Redirect, ApiError> {
    st.session.sign_out().map_err(|e| {
        error!(error = %e, "cannot clear session");
        ApiError::Transport(e.to_string())
    })?;
    info!("user logged out");
    Ok(Redirect::now(Route::Home))
}

#[derive(Debug, Default)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub status: ViewStatus,
}

impl ChangePasswordForm {
    #[instrument(skip(self, st))]
    pub async fn submit(&mut self, st: &AppState) -> Result<Redirect, ApiError> {
        // mismatches are reported without locking the form
        if let Err(e) = validate_password_change(&self.new_password, &self.confirm_password) {
            return Err(self.status.fail(e, "Failed to update password"));
        }
        self.status.begin()?;

        let req = ChangePasswordRequest {
            old_password: self.old_password.clone(),
            new_password: self.new_password.clone(),
        };
        if let Err(e) = repo::change_password(&st.api, &req).await {
            warn!(error = %e, "password change rejected");
            return Err(self.status.fail(e, "Failed to update password"));
        }

        self.old_password.clear();
        self.new_password.clear();
        self.confirm_password.clear();
        self.status = ViewStatus::Succeeded("Password updated successfully!".into());
        info!("password changed");
        Ok(Redirect::after(Route::Dashboard, PASSWORD_REDIRECT_DELAY))
    }
}
