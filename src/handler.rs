//! HTTP request handlers for the website tracker API
//!
//! This module implements the core CRUD contract over the record file:
//! - Listing all tracked websites
//! - Creating websites with URL normalization, duplicate detection and an
//!   optional reachability check
//! - Updating a website's name and URL in place
//! - Deleting websites
//!
//! and the admin credential endpoints used by the login flow.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::database::AppState;
use crate::error::ApiError;
use crate::model::{
    Credential, CredentialRequest, IdParams, LoginRequest, LoginResponse, Website, WebsiteRequest,
};
use crate::validation::{ensure_unique, validate};
use crate::verifier::Reachability;

/// Extracts the `?id=` parameter, rejecting missing or blank values
fn require_id(params: IdParams) -> Result<String, ApiError> {
    params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Website ID is required".to_string()))
}

/// Runs the reachability check unless the caller forced the write
async fn verify_unless_forced(state: &AppState, url: &str, force: bool) -> Result<(), ApiError> {
    if force {
        return Ok(());
    }

    match state.verifier.check(url).await {
        Reachability::Reachable => Ok(()),
        Reachability::Unreachable(reason) => {
            warn!(url, reason = %reason, "website failed reachability check");
            Err(ApiError::VerificationFailed(reason))
        }
    }
}

/// Lists all tracked websites
///
/// Records are returned in stored order; sorting is left to the client.
///
/// # Response
///
/// - **200 OK** - JSON array of records
/// - **500 Internal Server Error** - The record file exists but cannot be read or parsed
pub async fn list_websites(State(state): State<AppState>) -> Result<Json<Vec<Website>>, ApiError> {
    let websites = state.websites.list().await?;
    Ok(Json(websites))
}

/// Creates a new website record
///
/// This handler:
/// 1. Validates `name` and `url` and normalizes the URL (`https://` prefix)
/// 2. Rejects URLs already used by another record
/// 3. Checks reachability with a HEAD request unless `force` is set
/// 4. Re-checks uniqueness under the write lock, then appends the record
///
/// # Request Body
///
/// ```json
/// { "name": "Example", "url": "example.com", "force": false }
/// ```
///
/// # Response
///
/// - **201 Created** - The stored record
/// - **400 Bad Request** - Validation failure, or failed reachability check
///   (body carries `"verificationFailed": true`)
/// - **409 Conflict** - URL already tracked
pub async fn create_website(
    State(state): State<AppState>,
    payload: Result<Json<WebsiteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let input = validate(&payload)?;

    // Fail fast on duplicates before spending time on the network check
    let existing = state.websites.list().await?;
    ensure_unique(&existing, &input.url, None)?;

    verify_unless_forced(&state, &input.url, payload.force).await?;

    let website = state
        .websites
        .mutate(|websites| {
            ensure_unique(websites, &input.url, None)?;
            let website = Website::new(input.name, input.url);
            websites.push(website.clone());
            Ok::<_, ApiError>(website)
        })
        .await?;

    info!(id = %website.id, url = %website.url, forced = payload.force, "website created");
    Ok((StatusCode::CREATED, Json(website)))
}

/// Updates the name and URL of an existing website
///
/// Validation, duplicate detection (excluding the record itself) and the
/// reachability check behave exactly as for creation. The id never changes.
///
/// # Example Request
///
/// `PUT /api/websites?id=5b1e0d0c-...`
///
/// # Response
///
/// - **200 OK** - The updated record
/// - **400 Bad Request** - Missing id, validation failure, or failed reachability check
/// - **404 Not Found** - Unknown id
/// - **409 Conflict** - URL used by another record
pub async fn update_website(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
    payload: Result<Json<WebsiteRequest>, JsonRejection>,
) -> Result<Json<Website>, ApiError> {
    let id = require_id(params)?;
    let Json(payload) = payload?;
    let input = validate(&payload)?;

    let existing = state.websites.list().await?;
    if !existing.iter().any(|site| site.id == id) {
        return Err(ApiError::NotFound);
    }
    ensure_unique(&existing, &input.url, Some(id.as_str()))?;

    verify_unless_forced(&state, &input.url, payload.force).await?;

    let website = state
        .websites
        .mutate(|websites| {
            ensure_unique(websites, &input.url, Some(id.as_str()))?;
            let website = websites
                .iter_mut()
                .find(|site| site.id == id)
                .ok_or(ApiError::NotFound)?;
            website.name = input.name;
            website.url = input.url;
            Ok::<_, ApiError>(website.clone())
        })
        .await?;

    info!(id = %website.id, url = %website.url, forced = payload.force, "website updated");
    Ok(Json(website))
}

/// Deletes a website
///
/// # Example Request
///
/// `DELETE /api/websites?id=5b1e0d0c-...`
///
/// # Response
///
/// - **200 OK** - Website deleted
/// - **400 Bad Request** - Missing id
/// - **404 Not Found** - Unknown id
pub async fn delete_website(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<impl IntoResponse, ApiError> {
    let id = require_id(params)?;

    state
        .websites
        .mutate(|websites| {
            let index = websites
                .iter()
                .position(|site| site.id == id)
                .ok_or(ApiError::NotFound)?;
            websites.remove(index);
            Ok::<_, ApiError>(())
        })
        .await?;

    info!(id = %id, "website deleted");
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Website deleted successfully",
            "deleted_id": id
        })),
    ))
}

/// Checks a username/password pair against the credential file
///
/// On success the response carries the API token clients must send in the
/// `Authorization` header (`null` when the server does not require one).
///
/// # Response
///
/// - **200 OK** - `{"success": true, "token": ...}`
/// - **400 Bad Request** - Missing username or password
/// - **401 Unauthorized** - Credentials do not match
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload?;
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    if !state
        .users
        .authenticate(&payload.username, &payload.password)
        .await?
    {
        warn!(user = %payload.username, "login rejected");
        return Err(ApiError::Unauthorized);
    }

    info!(user = %payload.username, "login succeeded");
    Ok(Json(LoginResponse {
        success: true,
        token: state.config.api_token().map(str::to_string),
    }))
}

/// Lists the configured admin user names
///
/// Passwords are never included in the response.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users: Vec<_> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|entry| json!({ "user": entry.user }))
        .collect();
    Ok(Json(users))
}

/// Replaces the admin credential
///
/// # Request Body
///
/// ```json
/// { "user": "admin", "Password": "new-password" }
/// ```
pub async fn update_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    if payload.user.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let user = payload.user.clone();
    state
        .users
        .replace_admin(Credential {
            user: payload.user,
            password: payload.password,
        })
        .await?;

    info!(user = %user, "admin credential updated");
    Ok(Json(json!({
        "success": true,
        "message": "User updated successfully"
    })))
}
