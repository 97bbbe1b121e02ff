/// Read-through caching for catalog calls.
///
/// Looks the key up first and returns the cached value on a hit. On a miss
/// the block runs, its value is queued for storage, and then returned.
/// A failing cache read is logged and handled as a miss, so an unavailable
/// Redis slows catalog calls down but never fails them.
///
/// # Arguments
/// * `$cache`: a [`Cache`](crate::db::Cache).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live of the stored value in seconds.
/// * `$block`: future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let movies: Vec<Movie> = cached!(self.cache, key, 3600, async move {
///     fetch_from_tmdb().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                None
            }
        };

        if let Some(cached) = hit {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
