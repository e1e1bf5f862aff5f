//! # Support Documentation
//!
//! Donation and crowdfunding backend.
//!
//! Visitors donate to the cause in general or to a specific fundraising
//! project. Every attempt is recorded in Redis before the visitor is sent to
//! the hosted payment page, so totals move optimistically; the page that
//! actually moves the money is external and never reports back here.
//!
//!
//!
//! # General Infrastructure
//! - Frontend posts donations to this server and renders the two read views
//!   it serves (donor leaderboard, project progress cards)
//! - Redis holds all durable state: donation records, the by-amount index,
//!   and per-project raised totals
//! - Payment runs on the hosted provider link; we only build the redirect URL
//!   and hand it back with the recorded donation id
//!
//!
//!
//! # Flow
//!
//! - Validate the amount, reject before any write if it is not positive
//! - Append the donation record with a generated id, always
//! - If the donation targets a project, apply the amount to that project's
//!   raised total in one optimistic transaction (lost updates are not
//!   acceptable, stale reads are)
//! - Refresh both views, best effort only
//! - Return the id and payment URL; the frontend opens the URL in a new tab
//!
//!
//!
//! # Notes
//!
//! ## Optimistic recording
//! Records exist before the payment completes. Every record carries
//! `status: pending` so a later reconciliation step (webhook verification on
//! the provider side) can flip it to confirmed or failed. That step is not
//! built here; until it exists, raised totals count intents, not settled
//! money.
//!
//! ## Views
//! Each view keeps the last snapshot it managed to render. A failed store
//! read logs and keeps serving the previous snapshot rather than blanking the
//! page.

use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;

pub mod config;
pub mod database;
pub mod donations;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;
pub mod views;

use routes::{
    donate_handler, donate_link_handler, leaderboard_handler, project_donate_handler,
    projects_handler,
};
use state::State;

pub async fn start_server() {
    let state = State::new().await;

    // Initial load, same as the first page render.
    views::refresh_leaderboard(&state).await;
    views::refresh_projects(&state).await;

    let app = Router::new()
        .route("/donate", post(donate_handler))
        .route("/donate/link", get(donate_link_handler))
        .route("/projects/{project_id}/donate", post(project_donate_handler))
        .route("/leaderboard", get(leaderboard_handler))
        .route("/projects", get(projects_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", state.config.port))
        .await
        .expect("Port misconfigured!");

    info!("Listening on port {}", state.config.port);

    axum::serve(listener, app).await.expect("Server crashed!");
}
