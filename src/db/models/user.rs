//! User model (`usuarios`)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Login account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub nome: Option<String>,
    pub hashed_password: String,
    pub role: String,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub nome: Option<String>,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nome: user.nome.clone(),
            role: user.role.clone(),
        }
    }
}
