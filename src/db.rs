//! Lazy, single-flight database connection manager.
//!
//! The pool is established on first use, not at startup. While the first
//! attempt is in flight its future is cached, so concurrent callers all
//! await the same attempt instead of racing to open duplicate pools. A
//! failed attempt propagates the error to every waiter and clears the slot,
//! so the next call starts fresh — no permanent poison state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::ApiError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

type ConnectError = Arc<anyhow::Error>;
type ConnectFuture = Shared<BoxFuture<'static, Result<PgPool, ConnectError>>>;
type Connector = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<PgPool>> + Send + Sync>;

enum Slot {
    Idle,
    Connecting(ConnectFuture),
    Ready(PgPool),
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Connector,
    slot: Mutex<Slot>,
}

impl Database {
    /// Connection target comes from `DATABASE_URL`; its absence is checked
    /// fatally in `main` before the server starts. Migrations run inside
    /// the establishment attempt, so a migration failure is a connection
    /// failure and will be retried on the next call.
    pub fn new(url: String) -> Self {
        let connector: Connector = Arc::new(move || {
            let url = url.clone();
            let fut: BoxFuture<'static, anyhow::Result<PgPool>> = async move {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .idle_timeout(Duration::from_secs(600))
                    .max_lifetime(Duration::from_secs(1800))
                    .connect(&url)
                    .await?;
                MIGRATOR.run(&pool).await?;
                Ok(pool)
            }
            .boxed();
            fut
        });
        Self::with_connector(connector)
    }

    /// Test seam — inject how the pool is built (e.g. `connect_lazy`, or a
    /// counting/failing connector for the single-flight tests).
    pub(crate) fn with_connector(connector: Connector) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                slot: Mutex::new(Slot::Idle),
            }),
        }
    }

    /// Returns the process-wide pool, establishing it on first call.
    /// Callable concurrently and repeatedly; once established, later calls
    /// return immediately without re-contacting the store.
    pub async fn ensure(&self) -> Result<PgPool, ApiError> {
        let attempt = {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Ready(pool) => return Ok(pool.clone()),
                Slot::Connecting(fut) => fut.clone(),
                Slot::Idle => {
                    tracing::info!("establishing database connection");
                    let connect = (self.inner.connector)();
                    let fut: ConnectFuture =
                        async move { connect.await.map_err(Arc::new) }.boxed().shared();
                    *slot = Slot::Connecting(fut.clone());
                    fut
                }
            }
        };

        match attempt.clone().await {
            Ok(pool) => {
                let mut slot = self.lock_slot();
                if !matches!(&*slot, Slot::Ready(_)) {
                    tracing::info!("database connection established");
                    *slot = Slot::Ready(pool.clone());
                }
                Ok(pool)
            }
            Err(err) => {
                let mut slot = self.lock_slot();
                // Clear only our own failed attempt; a newer attempt may
                // already occupy the slot.
                if let Slot::Connecting(current) = &*slot {
                    if Shared::ptr_eq(current, &attempt) {
                        *slot = Slot::Idle;
                    }
                }
                Err(ApiError::Internal(anyhow::anyhow!(
                    "database unavailable: {err:#}"
                )))
            }
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.inner.slot.lock().unwrap_or_else(|p| p.into_inner())
    }
}
