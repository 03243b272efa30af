// Process-wide store handle
// Decision: Owned and injected (Arc<StoreHandle>) instead of a global cached client
// Decision: Serialize connection setup behind one async mutex plus a generation counter
//
// The backend is created on first use (or eagerly via `open`), probed before each
// reuse, and replaced when the probe fails. Callers that arrive while a connection
// is being set up wait on the mutex and then reuse the fresh backend.

use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::backend::StorageBackend;
use crate::error::StoreError;
use crate::memory::InMemoryDatabase;
use crate::repositories::Database;

/// Default bound on any single store operation
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default Postgres pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Which backend the handle connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    InMemory,
}

impl FromStr for StorageMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" | "inmemory" => Ok(Self::InMemory),
            other => Err(StoreError::NotConfigured(format!(
                "unknown STORAGE_MODE '{other}' (expected 'postgres' or 'memory')"
            ))),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub mode: StorageMode,
    /// Required in Postgres mode
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub query_timeout: Duration,
    pub run_migrations: bool,
}

impl StoreConfig {
    pub fn postgres(database_url: impl Into<String>) -> Self {
        Self {
            mode: StorageMode::Postgres,
            database_url: Some(database_url.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            run_migrations: true,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            mode: StorageMode::InMemory,
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            run_migrations: false,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Load from environment variables:
    /// - STORAGE_MODE: `postgres` (default) or `memory`
    /// - DATABASE_URL: Postgres connection string
    /// - DATABASE_MAX_CONNECTIONS: pool size (default: 10)
    /// - STORE_TIMEOUT_MS: per-operation timeout (default: 5000)
    /// - RUN_MIGRATIONS: apply migrations on connect (default: true)
    ///
    /// A missing DATABASE_URL is not an error here; `StoreHandle::open` reports it.
    pub fn from_env() -> Result<Self, StoreError> {
        let mode = match std::env::var("STORAGE_MODE") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => StorageMode::Postgres,
        };

        let mut config = match mode {
            StorageMode::Postgres => Self {
                database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
                ..Self::postgres(String::new())
            },
            StorageMode::InMemory => Self::in_memory(),
        };

        if let Some(max) = env_parse::<u32>("DATABASE_MAX_CONNECTIONS")? {
            config.max_connections = max.max(1);
        }
        if let Some(ms) = env_parse::<u64>("STORE_TIMEOUT_MS")? {
            config.query_timeout = Duration::from_millis(ms.max(1));
        }
        if let Some(run) = env_parse::<bool>("RUN_MIGRATIONS")? {
            config.run_migrations = run;
        }

        Ok(config)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, StoreError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StoreError::NotConfigured(format!("invalid value for {name}: '{value}'"))),
        _ => Ok(None),
    }
}

struct Slot {
    backend: Option<StorageBackend>,
    // Bumped every time a new backend is installed
    generation: u64,
    migrated: bool,
}

/// Lazily-connected, health-checked handle to the analytics store
pub struct StoreHandle {
    config: StoreConfig,
    // Shared across reconnects so dev-mode data survives a failed probe
    memory: Arc<InMemoryDatabase>,
    slot: Mutex<Slot>,
    connections: AtomicUsize,
}

impl StoreHandle {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_memory(config, Arc::new(InMemoryDatabase::new()))
    }

    /// Handle over an existing in-memory database (dev mode and tests)
    pub fn in_memory(db: Arc<InMemoryDatabase>) -> Self {
        Self::with_memory(StoreConfig::in_memory(), db)
    }

    fn with_memory(config: StoreConfig, memory: Arc<InMemoryDatabase>) -> Self {
        Self {
            config,
            memory,
            slot: Mutex::new(Slot {
                backend: None,
                generation: 0,
                migrated: false,
            }),
            connections: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn query_timeout(&self) -> Duration {
        self.config.query_timeout
    }

    /// Number of backends created over the handle's lifetime
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Connect eagerly; fails on misconfiguration or an unreachable store
    pub async fn open(&self) -> Result<(), StoreError> {
        let limit = self.config.query_timeout;
        let backend = tokio::time::timeout(limit, self.acquire())
            .await
            .map_err(|_| StoreError::Timeout(limit))??;
        tracing::info!(backend = backend.kind(), "Analytics store opened");
        Ok(())
    }

    /// Drop the current backend; the next `acquire` reconnects
    pub async fn close(&self) {
        let backend = self.slot.lock().await.backend.take();
        if let Some(backend) = backend {
            backend.close().await;
            tracing::info!(backend = backend.kind(), "Analytics store closed");
        }
    }

    /// Probe the current backend without connecting
    pub async fn is_healthy(&self) -> bool {
        let backend = self.slot.lock().await.backend.clone();
        match backend {
            Some(backend) => self.probe(&backend).await,
            None => false,
        }
    }

    /// Name of the configured backend
    pub fn kind(&self) -> &'static str {
        match self.config.mode {
            StorageMode::Postgres => "postgres",
            StorageMode::InMemory => "memory",
        }
    }

    /// Return a live backend, connecting or reconnecting as needed
    pub async fn acquire(&self) -> Result<StorageBackend, StoreError> {
        let (current, seen_generation) = {
            let slot = self.slot.lock().await;
            (slot.backend.clone(), slot.generation)
        };

        if let Some(backend) = current {
            if self.probe(&backend).await {
                return Ok(backend);
            }
            tracing::warn!(backend = backend.kind(), "Store liveness probe failed, reconnecting");
        }

        let mut slot = self.slot.lock().await;
        // Someone else installed a backend while we waited
        if slot.generation != seen_generation {
            if let Some(backend) = &slot.backend {
                return Ok(backend.clone());
            }
        }

        let backend = match self.connect(!slot.migrated).await {
            Ok(backend) => backend,
            Err(e) => {
                // A backend that failed its probe is never handed out again
                if let Some(stale) = slot.backend.take() {
                    stale.close().await;
                }
                return Err(e);
            }
        };
        if let Some(stale) = slot.backend.replace(backend.clone()) {
            stale.close().await;
        }
        slot.generation += 1;
        slot.migrated = true;
        Ok(backend)
    }

    /// Acquire a backend and run `op` against it under the configured timeout
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(StorageBackend) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let limit = self.config.query_timeout;
        tokio::time::timeout(limit, async {
            let backend = self.acquire().await?;
            op(backend).await
        })
        .await
        .map_err(|_| StoreError::Timeout(limit))?
    }

    async fn probe(&self, backend: &StorageBackend) -> bool {
        match backend.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Store probe failed");
                false
            }
        }
    }

    async fn connect(&self, migrate: bool) -> Result<StorageBackend, StoreError> {
        let backend = match self.config.mode {
            StorageMode::InMemory => {
                self.memory.ping().await?;
                StorageBackend::InMemory(self.memory.clone())
            }
            StorageMode::Postgres => {
                let url = self.config.database_url.as_deref().ok_or_else(|| {
                    StoreError::NotConfigured(
                        "DATABASE_URL environment variable required".to_string(),
                    )
                })?;
                let db = Database::connect(
                    url,
                    self.config.max_connections,
                    self.config.query_timeout,
                )
                .await?;
                if migrate && self.config.run_migrations {
                    db.migrate().await?;
                    tracing::info!("Database migrations applied");
                }
                StorageBackend::Postgres(db)
            }
        };

        let total = self.connections.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(backend = backend.kind(), connections = total, "Connected to analytics store");
        Ok(backend)
    }
}
