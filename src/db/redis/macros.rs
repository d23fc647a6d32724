/// Read-through caching around an async computation.
///
/// Returns the value stored under `$key` when present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live, and
/// returns it. A failed cache read is logged and treated as a miss, so an
/// unavailable Redis only costs the lookup. Errors from the block are
/// propagated with `?`, so the enclosing function must return `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let url: Option<String> = cached!(self.cache, key, POSTER_CACHE_TTL, async move {
///     self.fetch_poster(movie_id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = &$key;
        let hit = match $cache.get_from_cache(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, computing value");
                None
            }
        };

        match hit {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                $cache.set_in_background(key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
