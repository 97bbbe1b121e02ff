use redis::{AsyncCommands, Client};
use std::fmt::Display;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot,
    },
    task::JoinHandle,
};

use crate::error::{AppError, AppResult};

/// Cache keys for catalog responses
///
/// Keys carry the response language, since TMDb localizes titles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieSearch { language: String, query: String },
    MovieDetails { language: String, movie_id: u64 },
    GenreDiscover { language: String, genre_id: u32 },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieSearch { language, query } => {
                write!(f, "tmdb:{}:search:{}", language, query.trim().to_lowercase())
            }
            CacheKey::MovieDetails { language, movie_id } => {
                write!(f, "tmdb:{}:movie:{}", language, movie_id)
            }
            CacheKey::GenreDiscover { language, genre_id } => {
                write!(f, "tmdb:{}:genre:{}", language, genre_id)
            }
        }
    }
}

/// Creates a Redis client for caching
///
/// Opening a client does not connect; connections are made per operation.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Queued writes beyond this are dropped and refetched on the next miss
const WRITE_BACKLOG: usize = 1024;

/// Work for the background writer
enum CacheCommand {
    Store { key: String, json: String, ttl: u64 },
    /// Removes an entry that no longer decodes into the current model
    Evict { key: String },
}

impl CacheCommand {
    fn key(&self) -> &str {
        match self {
            CacheCommand::Store { key, .. } | CacheCommand::Evict { key } => key,
        }
    }

    async fn execute(self, client: &Client) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        match self {
            CacheCommand::Store { key, json, ttl } => {
                let _: () = conn.set_ex(key, json, ttl).await?;
            }
            CacheCommand::Evict { key } => {
                let _: () = conn.del(key).await?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct WriterStats {
    applied: u64,
    failed: u64,
}

/// Drains cache commands until shutdown or until every `Cache` clone is gone
struct CacheWriter {
    client: Client,
    commands: mpsc::Receiver<CacheCommand>,
}

impl CacheWriter {
    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let Self {
            client,
            mut commands,
        } = self;
        let mut stats = WriterStats::default();
        let mut listening = true;
        tracing::info!(backlog = WRITE_BACKLOG, "Cache writer started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => Self::apply(&client, command, &mut stats).await,
                    None => break,
                },
                signal = &mut shutdown, if listening => {
                    // A dropped handle stops listening, not writing
                    if signal.is_err() {
                        listening = false;
                        continue;
                    }
                    commands.close();
                    while let Some(command) = commands.recv().await {
                        Self::apply(&client, command, &mut stats).await;
                    }
                    break;
                }
            }
        }

        tracing::info!(
            applied = stats.applied,
            failed = stats.failed,
            "Cache writer stopped"
        );
    }

    async fn apply(client: &Client, command: CacheCommand, stats: &mut WriterStats) {
        let key = command.key().to_string();
        match command.execute(client).await {
            Ok(()) => stats.applied += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(error = %e, key = %key, failed = stats.failed, "Cache write failed");
            }
        }
    }
}

/// Handle for stopping the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Stops the writer and waits until every queued command has been attempted
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

/// Read-through store for catalog responses
///
/// Reads hit Redis directly. Writes and evictions are queued for a background
/// task, so filling the cache never delays a catalog response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    commands: mpsc::Sender<CacheCommand>,
}

impl Cache {
    /// Creates the cache and spawns its writer; must be called inside a Tokio runtime
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(WRITE_BACKLOG);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let writer = CacheWriter {
            client: redis_client.clone(),
            commands: commands_rx,
        };
        let task = tokio::spawn(writer.run(shutdown_rx));

        let cache = Self {
            redis_client,
            commands: commands_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Looks a catalog response up by key
    ///
    /// `Ok(None)` is a miss. An entry that no longer deserializes is queued
    /// for eviction and reported as an error.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let key = key.to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.as_str()).await?;

        let Some(json) = cached else {
            return Ok(None);
        };

        serde_json::from_str(&json).map(Some).map_err(|e| {
            let message = format!("Stale cache entry {}: {}", key, e);
            self.enqueue(CacheCommand::Evict { key });
            AppError::Internal(message)
        })
    }

    /// Queues a value for storage without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(json) => self.enqueue(CacheCommand::Store {
                key: key.to_string(),
                json,
                ttl,
            }),
            Err(e) => tracing::error!(error = %e, key = %key, "Cache serialization error"),
        }
    }

    fn enqueue(&self, command: CacheCommand) {
        match self.commands.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                tracing::warn!(key = %command.key(), "Cache write backlog full, dropping write");
            }
            Err(TrySendError::Closed(command)) => {
                tracing::debug!(key = %command.key(), "Cache writer stopped, write skipped");
            }
        }
    }
}
