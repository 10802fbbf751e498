//! API key authentication.
//!
//! Every `/api/v1` request must carry an `X-API-KEY` header matching an
//! active row of `api_keys`, unless `API_KEY_REQUIRED=false`.
//!
//! ```text
//! request ──► header present? ──no──► 401 Missing X-API-KEY header
//!                  │
//!                 yes
//!                  ▼
//!          active key matches? ──no──► 401 Invalid API key
//!                  │
//!                 yes
//!                  ▼
//!              handler
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use pos_db::{Database, DbResult};

/// Header carrying the key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware rejecting requests without a valid API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.api_key_required {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ApiError::Unauthorized("Missing X-API-KEY header".to_string()))?;

    if state.db.api_keys().find_active_by_key(&presented).await?.is_none() {
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}

/// Stores `bootstrap_key` when no active key exists yet.
///
/// Returns true when a key was inserted.
pub async fn ensure_bootstrap_key(db: &Database, bootstrap_key: Option<&str>) -> DbResult<bool> {
    let keys = db.api_keys();
    if keys.first_active().await?.is_some() {
        return Ok(false);
    }

    match bootstrap_key {
        Some(key) => {
            keys.insert(key).await?;
            info!("Bootstrap API key stored");
            Ok(true)
        }
        None => {
            if keys.first_by_id().await?.is_some() {
                warn!("Every stored API key is deactivated; all API requests will be rejected");
            } else {
                warn!("No API key stored; set BOOTSTRAP_API_KEY or run the seed binary");
            }
            Ok(false)
        }
    }
}
