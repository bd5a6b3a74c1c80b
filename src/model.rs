//! Data models for the website tracker
//!
//! This module defines the persisted website record, the request payloads
//! accepted at the HTTP boundary, and the credential entries of the admin
//! user file.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked website as stored in the record file
///
/// # Example
/// ```json
/// {
///   "id": "5b1e0d0c-8f7e-4a51-9d0e-3c1f1b2a9e11",
///   "name": "Example",
///   "url": "https://example.com",
///   "count": 0
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Website {
    /// Opaque identifier assigned at creation, never changed afterwards
    pub id: String,

    /// Display name, not required to be unique
    pub name: String,

    /// Fully-qualified URL, unique across all records
    pub url: String,

    /// Access counter
    ///
    /// The server only writes `0` here. Record files from older deployments
    /// may carry other values, and files without the field read as `0`.
    /// Clients overlay their own locally tracked count.
    #[serde(default)]
    pub count: u64,
}

impl Website {
    /// Creates a new record with a fresh identifier and a zero count
    pub fn new(name: String, url: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            url,
            count: 0,
        }
    }
}

/// Request payload for creating or updating a website
///
/// Missing `name`/`url` fields deserialize as empty strings so that they are
/// reported by validation rather than by the JSON extractor.
///
/// # Example
/// ```json
/// {
///   "name": "Example",
///   "url": "example.com",
///   "force": false
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WebsiteRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    /// Skip the reachability check
    #[serde(default)]
    pub force: bool,
}

/// Query parameters identifying a website for update and delete
///
/// Query string: `?id=5b1e0d0c-...`
#[derive(Deserialize, Debug, Default)]
pub struct IdParams {
    pub id: Option<String>,
}

/// One entry of the admin credential file
///
/// Field names follow the file format: `{"user": "...", "Password": "..."}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,

    #[serde(rename = "Password")]
    pub password: String,
}

/// Request payload for the login endpoint
#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Response returned after a successful login
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub success: bool,

    /// API token to send in the `Authorization` header, if the server requires one
    pub token: Option<String>,
}

/// Request payload for replacing the admin credential
#[derive(Deserialize, Debug, Default)]
pub struct CredentialRequest {
    #[serde(default)]
    pub user: String,

    #[serde(default, rename = "Password")]
    pub password: String,
}
