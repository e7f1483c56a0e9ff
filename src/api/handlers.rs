//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide cache, shared with every other component at startup
    pub cache: Cache<Value>,
}

impl AppState {
    pub fn new(cache: Cache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with a fresh cache built from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Cache::new(config.cache_config()))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set(req.key.clone(), req.value, req.ttl)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let ttl_remaining = state.cache.ttl_remaining(&key).map(|ttl| ttl.as_secs());

    Ok(Json(GetResponse::new(key, value, ttl_remaining)))
}

/// Handler for DELETE /del/:key
///
/// Deleting a missing key succeeds with `deleted: false`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.delete(&key);
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.clear();
    tracing::info!(removed, "cache cleared via admin API");
    Json(ClearResponse { removed })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(Cache::with_default_ttl(300))
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "test_key".to_string(),
            value: json!({"items": [1, 2]}),
            ttl: None,
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"items": [1, 2]}));
        assert!(response.ttl_remaining.unwrap() <= 300);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let result = get_handler(State(test_state()), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler_is_idempotent() {
        let state = test_state();
        state.cache.set("to_delete", json!("value"), None).unwrap();

        let first = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(first.deleted);

        let second = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(!second.deleted);

        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();
        state.cache.set("a", json!(1), None).unwrap();
        state.cache.set("b", json!(2), None).unwrap();

        let response = clear_handler(State(state.clone())).await;
        assert_eq!(response.removed, 2);
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        state.cache.set("k", json!(true), None).unwrap();
        state.cache.get("k");
        state.cache.get("missing");

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.total_entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!("value"),
            ttl: None,
        };
        let result = set_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
