use std::sync::Arc;

use axum::{
    extract::{Path, Query, State as AxumState},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    donations::{payment_link, submit, Receipt, Submission},
    error::AppError,
    state::State,
    utils::to_kobo,
    views::{self, LeaderboardEntry, ProjectCard},
};

#[derive(Deserialize)]
pub struct DonationBody {
    pub amount: f64,
    pub donor: Option<String>,
    pub message: Option<String>,
}

/// General donation to the cause.
pub async fn donate_handler(
    AxumState(state): AxumState<Arc<State>>,
    Json(body): Json<DonationBody>,
) -> Result<Json<Receipt>, AppError> {
    let receipt = submit(
        state,
        Submission {
            amount: body.amount,
            donor: body.donor,
            message: body.message,
            project: None,
        },
    )
    .await?;

    Ok(Json(receipt))
}

/// Donation bound to one project; its raised total moves with the record.
pub async fn project_donate_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(project_id): Path<String>,
    Json(body): Json<DonationBody>,
) -> Result<Json<Receipt>, AppError> {
    let receipt = submit(
        state,
        Submission {
            amount: body.amount,
            donor: body.donor,
            message: body.message,
            project: Some(project_id),
        },
    )
    .await?;

    Ok(Json(receipt))
}

#[derive(Deserialize)]
pub struct LinkQuery {
    pub amount: Option<f64>,
}

#[derive(Serialize)]
pub struct LinkResponse {
    pub payment_url: String,
}

/// Payment URL only, for surfaces that redirect without recording first.
pub async fn donate_link_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(query): Query<LinkQuery>,
) -> Result<Json<LinkResponse>, AppError> {
    let amount = match query.amount {
        Some(amount) => Some(to_kobo(amount)?),
        None => None,
    };

    Ok(Json(LinkResponse {
        payment_url: payment_link(&state.config.payment_link, amount),
    }))
}

pub async fn leaderboard_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Json<Vec<LeaderboardEntry>> {
    views::refresh_leaderboard(&state).await;

    Json(state.views.leaderboard.read().await.clone())
}

pub async fn projects_handler(AxumState(state): AxumState<Arc<State>>) -> Json<Vec<ProjectCard>> {
    views::refresh_projects(&state).await;

    Json(state.views.projects.read().await.clone())
}
