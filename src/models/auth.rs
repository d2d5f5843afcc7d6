use crate::auth::session::UserProfile;
use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// User block of the token response and body of `GET /auth/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUser {
    pub id: i64,
    pub email: String,
    pub nombre_completo: String,
    pub rol: String,
}

impl From<TokenUser> for UserProfile {
    fn from(user: TokenUser) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            name: user.nombre_completo,
            role: user.rol,
        }
    }
}

/// Successful credential exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: TokenUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parsing() {
        let body = r#"{
            "access_token": "eyJ.abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": 12, "email": "ana@condo.cl", "nombre_completo": "Ana Rojas", "rol": "residente"}
        }"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.expires_in, 3600);

        let profile: UserProfile = parsed.user.into();
        assert_eq!(profile.name, "Ana Rojas");
        assert_eq!(profile.role, "residente");
    }

    #[test]
    fn test_token_response_requires_lifetime() {
        let body = r#"{"access_token": "x", "user": {"id": 1, "email": "a@b.cl", "nombre_completo": "A", "rol": "admin"}}"#;
        assert!(serde_json::from_str::<TokenResponse>(body).is_err());
    }
}
