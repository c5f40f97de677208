use serde::{Deserialize, Serialize};

use super::claims::Role;

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registration.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub company_name: String,
}

/// Returned by login and register.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub company_name: String,
}

/// A user account as the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UsersEnvelope {
    #[serde(default)]
    pub users: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tolerates_backend_extras() {
        // the backend also serializes timestamps, the password hash and relations
        let raw = r#"{
            "role": "admin",
            "id": 4,
            "created_at": "2024-05-01T10:00:00Z",
            "email": "ops@acme.io",
            "password": "$2a$10$hash",
            "name": "Ops",
            "company_name": "Acme",
            "visit_cards": null
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.id, 4);
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.company_name, "Acme");
    }

    #[test]
    fn register_request_uses_snake_case_company() {
        let body = serde_json::to_value(RegisterRequest {
            email: "a@b.co".into(),
            password: "secret1".into(),
            name: "Ann".into(),
            company_name: "Acme".into(),
        })
        .unwrap();
        assert_eq!(body["company_name"], "Acme");
        assert!(body.get("companyName").is_none());
    }
}
