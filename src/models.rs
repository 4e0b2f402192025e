use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteStatus {
    Draft,
    Published,
    Closed,
    Deleted,
}

impl fmt::Display for VoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoteStatus::Draft => "DRAFT",
            VoteStatus::Published => "PUBLISHED",
            VoteStatus::Closed => "CLOSED",
            VoteStatus::Deleted => "DELETED",
        };
        f.write_str(name)
    }
}

impl FromStr for VoteStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(VoteStatus::Draft),
            "PUBLISHED" => Ok(VoteStatus::Published),
            "CLOSED" => Ok(VoteStatus::Closed),
            "DELETED" => Ok(VoteStatus::Deleted),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VotePermission {
    Public,
    Private,
    LinkOnly,
}

impl fmt::Display for VotePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VotePermission::Public => "PUBLIC",
            VotePermission::Private => "PRIVATE",
            VotePermission::LinkOnly => "LINK_ONLY",
        };
        f.write_str(name)
    }
}

impl FromStr for VotePermission {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(VotePermission::Public),
            "PRIVATE" => Ok(VotePermission::Private),
            "LINK_ONLY" => Ok(VotePermission::LinkOnly),
            other => Err(format!("unknown permission: {other}")),
        }
    }
}

/// One selectable choice within a vote. `vote_count` and `percentage` are
/// server-derived; the list endpoint includes them too, the card renderer just
/// ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOption {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub percentage: f64,
}

/// Server projection of a vote. The API returns the same shape for the list
/// and the detail endpoints; every field is re-fetched after a mutation and
/// never changed client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: VoteStatus,
    pub permission: VotePermission,
    #[serde(default)]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub creator_username: String,
    #[serde(default)]
    pub total_votes: i64,
    #[serde(default)]
    pub has_voted: bool,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub published_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub closed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub options: Vec<VoteOption>,
}

/// Body for both create (POST) and update (PUT).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVoteRequest {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub permission: VotePermission,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}
