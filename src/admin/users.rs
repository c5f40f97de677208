use tracing::{info, instrument};

use super::repo::{self, AdminUserUpdate};
use crate::api::ApiError;
use crate::auth::claims::Role;
use crate::auth::dto::User;
use crate::auth::services::normalize_email;
use crate::routes::{Redirect, Route};
use crate::state::AppState;
use crate::view::{Confirm, ViewStatus};

pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// `/admin/users`: every account, filterable, deletable.
#[derive(Debug, Default)]
pub struct UserManager {
    pub users: Vec<User>,
    pub search: String,
    pub status: ViewStatus,
}

impl UserManager {
    #[instrument(skip(self, st))]
    pub async fn load(&mut self, st: &AppState) -> Result<(), ApiError> {
        self.status.begin()?;
        match repo::users(&st.api).await {
            Ok(users) => {
                self.users = users;
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => Err(self.status.fail(e, "Failed to load users")),
        }
    }

    /// Case-insensitive match on email, name or company.
    pub fn filtered(&self) -> Vec<&User> {
        let needle = self.search.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || contains_ci(&u.email, &needle)
                    || contains_ci(&u.name, &needle)
                    || contains_ci(&u.company_name, &needle)
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
        if !confirm.confirm("Are you sure you want to delete this user? This action cannot be undone.")
        {
            return Ok(false);
        }
        match repo::delete_user(&st.api, id).await {
            Ok(()) => {
                self.users.retain(|u| u.id != id);
                info!(user_id = id, "user deleted");
                Ok(true)
            }
            Err(e) => Err(self.status.fail(e, "Failed to delete user")),
        }
    }
}

/// `/admin/users/:id/edit`.
#[derive(Debug)]
pub struct UserEditor {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub role: Role,
    pub status: ViewStatus,
}

impl UserEditor {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            company_name: String::new(),
            role: Role::User,
            status: ViewStatus::Idle,
        }
    }

    #[instrument(skip(self, st), fields(user_id = self.id))]
    pub async fn load(&mut self, st: &AppState) -> Result<(), ApiError> {
        self.status.begin()?;
        match repo::user(&st.api, self.id).await {
            Ok(user) => {
                self.name = user.name;
                self.email = user.email;
                self.company_name = user.company_name;
                self.role = user.role;
                self.status = ViewStatus::Idle;
                Ok(())
            }
            Err(e) => Err(self.status.fail(e, "Failed to load user")),
        }
    }

    #[instrument(skip(self, st), fields(user_id = self.id))]
    pub async fn submit(&mut self, st: &AppState) -> Result<Redirect, ApiError> {
        self.status.begin()?;
        let email = match normalize_email(&self.email) {
            Ok(email) => email,
            Err(e) => return Err(self.status.fail(e, "Failed to update user")),
        };
        let update = AdminUserUpdate {
            name: self.name.trim().to_string(),
            email,
            company_name: self.company_name.trim().to_string(),
            role: self.role,
        };
        match repo::update_user(&st.api, self.id, &update).await {
            Ok(_) => {
                info!(role = %self.role, "user updated");
                self.status = ViewStatus::Succeeded("User updated successfully!".into());
                Ok(Redirect::after(Route::AdminUsers, st.config.redirect_delay))
            }
            Err(e) => Err(self.status.fail(e, "Failed to update user")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubBackend;
    use axum::{
        routing::{delete, get},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn user(id: u64, email: &str, name: &str, company: &str) -> User {
        User {
            id,
            email: email.into(),
            name: name.into(),
            company_name: company.into(),
            role: Role::User,
        }
    }

    #[test]
    fn filter_is_case_insensitive_over_three_fields() {
        let mut manager = UserManager {
            users: vec![
                user(1, "ann@acme.io", "Ann", "Acme"),
                user(2, "bob@beta.io", "Bob", "Beta Works"),
                user(3, "cy@gamma.io", "Cyrus", "ACME Labs"),
            ],
            ..Default::default()
        };
        manager.search = "acme".into();
        let ids: Vec<u64> = manager.filtered().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3]);

        manager.search = "WORKS".into();
        assert_eq!(manager.filtered()[0].id, 2);

        manager.search.clear();
        assert_eq!(manager.filtered().len(), 3);
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let router = Router::new()
            .route(
                "/api/admin/users",
                get(|| async {
                    Json(json!({"users": [
                        {"id": 1, "email": "ann@acme.io", "role": "admin"},
                        {"id": 2, "email": "bob@beta.io", "role": "user"}
                    ]}))
                }),
            )
            .route(
                "/api/admin/users/:id",
                delete(|| async { Json(json!({"message": "User deleted successfully"})) }),
            );
        let backend = StubBackend::spawn(router).await;
        let st = backend.signed_in_state("admin");

        let mut manager = UserManager::default();
        manager.load(&st).await.unwrap();
        assert_eq!(manager.users.len(), 2);

        assert!(!manager.delete(&st, 2, &false).await.unwrap());
        assert_eq!(backend.hits().len(), 1);

        assert!(manager.delete(&st, 2, &true).await.unwrap());
        assert_eq!(manager.users.len(), 1);
        assert_eq!(backend.hits()[1].uri, "/api/admin/users/2");
    }

    #[tokio::test]
    async fn editor_loads_and_saves() {
        let router = Router::new().route(
            "/api/admin/users/:id",
            get(|| async {
                Json(json!({"user": {"id": 5, "email": "bob@beta.io", "name": "Bob", "company_name": "Beta", "role": "user"}}))
            })
            .put(|Json(body): Json<Value>| async move {
                assert_eq!(body["role"], "admin");
                assert_eq!(body["company_name"], "Beta");
                Json(json!({"user": {"id": 5, "email": "bob@beta.io", "role": "admin"}}))
            }),
        );
        let backend = StubBackend::spawn(router).await;
        let st = backend.signed_in_state("admin");

        let mut editor = UserEditor::new(5);
        editor.load(&st).await.unwrap();
        assert_eq!(editor.name, "Bob");

        editor.role = Role::Admin;
        let redirect = editor.submit(&st).await.unwrap();
        assert_eq!(redirect.to, Route::AdminUsers);
        assert_eq!(editor.status.success(), Some("User updated successfully!"));
    }
}
