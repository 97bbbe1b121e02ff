use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::UserStore,
    error::AppResult,
    models::User,
    services::{CatalogProvider, EngineSettings, RecommendationEngine},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub user_store: Arc<UserStore>,
    pub user: Arc<RwLock<User>>,
    pub settings: EngineSettings,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        user_store: UserStore,
        user: User,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            user_store: Arc::new(user_store),
            user: Arc::new(RwLock::new(user)),
            settings,
        }
    }

    /// Builds a recommendation engine over the current user snapshot
    pub async fn engine(&self) -> RecommendationEngine {
        let snapshot = self.user.read().await.clone();
        RecommendationEngine::new(self.catalog.clone(), snapshot, self.settings.clone()).await
    }

    /// Applies a change to the user and persists it
    ///
    /// The change is made on a copy; the shared user is only replaced once
    /// the copy has been saved, so a failed save leaves memory and disk agreeing.
    pub async fn update_user<F, T>(&self, change: F) -> AppResult<(User, T)>
    where
        F: FnOnce(&mut User) -> AppResult<T>,
    {
        let mut user = self.user.write().await;
        let mut updated = user.clone();
        let outcome = change(&mut updated)?;
        self.user_store.save(&updated).await?;
        *user = updated.clone();
        Ok((updated, outcome))
    }
}
