use std::path::{Path, PathBuf};

use crate::{error::AppResult, models::User};

/// JSON-file persistence for a single user's ratings and watch history
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored user, or a fresh one if nothing has been saved yet
    ///
    /// A file that exists but does not parse is an error; it is never
    /// silently replaced.
    pub async fn load_or_new(&self, user_id: u64, user_name: &str) -> AppResult<User> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let user: User = serde_json::from_slice(&bytes)?;
                tracing::info!(
                    path = %self.path.display(),
                    ratings = user.ratings.len(),
                    watched = user.watch_history.len(),
                    "Loaded user data"
                );
                Ok(user)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No user data file, starting fresh");
                Ok(User::new(user_id, user_name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the user to disk, replacing the previous file atomically
    pub async fn save(&self, user: &User) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(user)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Saved user data");
        Ok(())
    }
}
