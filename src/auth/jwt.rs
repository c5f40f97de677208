use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

use super::claims::{Claims, Role};

/// Reads the payload of a bearer token without checking its signature or
/// expiry. The result is for display only (which menu to show); the server
/// makes every authorization decision.
pub fn decode_claims(token: &str) -> anyhow::Result<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token.trim(), &DecodingKey::from_secret(&[]), &validation)?;
    debug!(user_id = ?data.claims.user_id, role = ?data.claims.role, "token payload decoded");
    Ok(data.claims)
}

pub fn decode_role(token: &str) -> anyhow::Result<Option<Role>> {
    decode_claims(token).map(|claims| claims.role())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign token")
    }

    #[test]
    fn decodes_role_from_payload() {
        let token = sign(
            "server-secret",
            &Claims {
                user_id: Some(3),
                role: Some("admin".into()),
                exp: Some(4_102_444_800),
            },
        );
        let claims = decode_claims(&token).expect("decode");
        assert_eq!(claims.user_id, Some(3));
        assert_eq!(claims.role(), Some(Role::Admin));
    }

    #[test]
    fn ignores_signature_and_expiry() {
        // signed with a secret the client never sees, and long expired
        let token = sign(
            "some-other-secret",
            &Claims {
                user_id: Some(9),
                role: Some("user".into()),
                exp: Some(1),
            },
        );
        assert_eq!(decode_role(&token).expect("decode"), Some(Role::User));
    }

    #[test]
    fn missing_or_unknown_role_is_none() {
        let token = sign("s", &Claims::default());
        assert_eq!(decode_role(&token).expect("decode"), None);

        let token = sign(
            "s",
            &Claims {
                role: Some("superuser".into()),
                ..Claims::default()
            },
        );
        assert_eq!(decode_role(&token).expect("decode"), None);
    }

    #[test]
    fn garbage_token_is_an_error() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("a.b.c").is_err());
    }
}
