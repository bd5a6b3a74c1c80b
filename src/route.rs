//! Route definitions for the website tracker API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::database::AppState;
use crate::handler::{
    create_website, delete_website, list_users, list_websites, login, update_user,
    update_website,
};
use crate::middleware::auth_middleware;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /api/websites` - Lists all websites
/// - `POST /api/websites` - Creates a website
/// - `PUT /api/websites?id=` - Updates a website
/// - `DELETE /api/websites?id=` - Deletes a website
/// - `GET /api/manage-users` - Lists admin user names
/// - `POST /api/manage-users` - Replaces the admin credential
/// - `POST /api/auth/login` - Checks credentials (public endpoint)
///
/// All routes except login go through [`auth_middleware`].
///
/// # Example Usage
///
/// ```no_run
/// # use sitetracker::config::Config;
/// # use sitetracker::database::AppState;
/// # use sitetracker::route::create_app;
/// let state = AppState::new(Config::from_env()).unwrap();
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/websites",
            get(list_websites)
                .post(create_website)
                .put(update_website)
                .delete(delete_website),
        )
        .route("/manage-users", get(list_users).post(update_user))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = Router::new()
        .route("/auth/login", post(login))
        .merge(protected);

    Router::new().nest("/api", api_routes).with_state(state)
}
