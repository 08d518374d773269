//! Per-trip cache of assembled trip details.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::types::TripDetail;

#[derive(Debug, Clone)]
pub struct TripCache {
    inner: Cache<Uuid, Arc<TripDetail>>,
}

impl TripCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, trip_id: &Uuid) -> Option<Arc<TripDetail>> {
        self.inner.get(trip_id).await
    }

    pub async fn insert(&self, trip_id: Uuid, detail: TripDetail) -> Arc<TripDetail> {
        let detail = Arc::new(detail);
        self.inner.insert(trip_id, detail.clone()).await;
        detail
    }

    /// Returns the cached detail or loads and caches it. Failed loads are not cached.
    pub async fn try_get_or_load<E, F, Fut>(&self, trip_id: Uuid, load: F) -> Result<Arc<TripDetail>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TripDetail, E>>,
    {
        if let Some(cached) = self.get(&trip_id).await {
            return Ok(cached);
        }
        let detail = load().await?;
        Ok(self.insert(trip_id, detail).await)
    }

    pub async fn invalidate(&self, trip_id: &Uuid) {
        self.inner.invalidate(trip_id).await;
    }

    /// Drops every entry, e.g. after exchange rates or currencies change.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
