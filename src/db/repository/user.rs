//! User repository - credential verification against `usuarios`

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use sqlx::PgPool;

use super::RepoResult;
use crate::db::models::User;

/// Look up a user by username and verify the password.
///
/// Returns `None` for unknown username, inactive account or wrong password
/// alike; callers surface all three as the same invalid-credentials error.
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> RepoResult<Option<User>> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id, username, nome, hashed_password, role, ativo, created_at \
         FROM usuarios WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    let Some(user) = user else {
        return Ok(None);
    };

    if !user.ativo {
        return Ok(None);
    }

    let hash = match PasswordHash::new(&user.hashed_password) {
        Ok(h) => h,
        Err(_) => return Ok(None),
    };

    if Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}
