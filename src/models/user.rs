use base64::Engine;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Mentor => write!(f, "mentor"),
            Role::Mentee => write!(f, "mentee"),
        }
    }
}

/// Linha da tabela "users"
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub profile_image: Option<Vec<u8>>,
    pub skills: Option<String>, // JSON array de strings
    pub is_matched: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub profile_image: Option<String>, // data URL base64
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub profile_image: Option<String>,
}

/// Usuário sem o hash de senha, como vai para o cliente
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub profile_image: Option<String>,
    pub is_matched: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserResponse,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let skills = user
            .skills
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        let profile_image = user.profile_image.as_deref().map(encode_image_data_url);

        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            bio: user.bio,
            skills,
            profile_image,
            is_matched: user.is_matched,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn encode_image_data_url(bytes: &[u8]) -> String {
    let mime = if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        "image/png"
    };
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_roundtrip() {
        let user = User {
            id: 1,
            email: "a@b.c".to_string(),
            password_hash: "x".to_string(),
            name: "Ana".to_string(),
            role: Role::Mentor,
            bio: None,
            profile_image: None,
            skills: Some("[\"rust\",\"sql\"]".to_string()),
            is_matched: false,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };

        let response = UserResponse::from(user);
        assert_eq!(response.skills, vec!["rust", "sql"]);
        assert!(response.profile_image.is_none());
    }

    #[test]
    fn test_image_data_url_mime() {
        assert!(encode_image_data_url(&[0xFF, 0xD8, 0xFF, 0x00]).starts_with("data:image/jpeg"));
        assert!(encode_image_data_url(&[0x89, 0x50, 0x4E, 0x47]).starts_with("data:image/png"));
    }
}
