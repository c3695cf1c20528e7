use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::broadcast;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;

/// Resource change notification
///
/// Emitted on every observable mutation (today: order status changes and
/// cash closings). Downstream views subscribe via
/// [`ServerState::subscribe`]; this channel is the single integration point
/// other components observe.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncPayload {
    /// Resource type ("order", "cash_closing")
    pub resource: String,
    /// Change type ("created", "status_changed", "closed")
    pub action: String,
    /// Resource ID
    pub id: String,
    /// Resource data, if available
    pub data: Option<serde_json::Value>,
}

/// Server state - shared handles for all services
///
/// Cloning is shallow (`Arc`/pool clones); handlers receive it via axum's
/// `State` extractor. The pool is the only concurrency primitive: each
/// mutation is one all-or-nothing unit against PostgreSQL.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable)
    pub config: Config,
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT authentication service
    pub jwt_service: Arc<JwtService>,
    /// Change notification channel
    events: broadcast::Sender<SyncPayload>,
}

impl ServerState {
    /// Initialize server state: connect the pool, run migrations, build
    /// services.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let db = DbService::new(&config.database_url).await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let (events, _) = broadcast::channel(256);

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service,
            events,
        })
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Subscribe to resource change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.events.subscribe()
    }

    /// Broadcast a resource change to all subscribers.
    ///
    /// Lagging or absent subscribers are not an error: notifications are
    /// best-effort, the database row is the source of truth.
    pub fn notify<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let payload = SyncPayload {
            resource: resource.to_string(),
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        let _ = self.events.send(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Notification fan-out without a database: drive the channel directly.
    #[tokio::test]
    async fn notify_reaches_subscribers() {
        let (events, _) = broadcast::channel::<SyncPayload>(8);

        let mut rx = events.subscribe();
        events
            .send(SyncPayload {
                resource: "order".into(),
                action: "status_changed".into(),
                id: "abc".into(),
                data: None,
            })
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.resource, "order");
        assert_eq!(received.action, "status_changed");
    }

    // Sending with no subscribers must not panic or error the caller path.
    #[test]
    fn notify_without_subscribers_is_a_noop() {
        let (events, rx) = broadcast::channel::<SyncPayload>(8);
        drop(rx);
        let _ = events.send(SyncPayload {
            resource: "cash_closing".into(),
            action: "closed".into(),
            id: "2024-01-01".into(),
            data: None,
        });
    }
}
