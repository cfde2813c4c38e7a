use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "pending"),
            MatchStatus::Accepted => write!(f, "accepted"),
            MatchStatus::Rejected => write!(f, "rejected"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Linha da tabela "match_requests", devolvida como está nas respostas
#[derive(Debug, Clone, Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct MatchRequest {
    pub id: i64,
    pub mentor_id: i64,
    pub mentee_id: i64,
    pub message: String,
    pub status: MatchStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequestRequest {
    pub mentor_id: i64,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RequestListQuery {
    pub status: Option<MatchStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
