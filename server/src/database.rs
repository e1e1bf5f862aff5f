//! # Redis
//!
//! Store of record.
//!
//! Holds every donation attempt and the per-project raised totals. Donation
//! records are append-only; the only mutable value is a project's `raised`
//! field, updated through the optimistic transaction below.
//!
//! ## Schema
//!
//! - `donation:next` -- **int** counter, source of generated donation ids
//! - `donation:{id}` -- **hash**: amount (kobo **int**), donor (**string**),
//!   message (**string**), project (**string**, empty for general donations),
//!   status (**string**, always `pending` from this service), created_at
//!   (unix millis **int**)
//! - `donations:by_amount` -- **zset**: member = id, score = amount in kobo,
//!   backs the leaderboard query
//! - `project:{id}` -- **hash**: title (**string**), goal (kobo **int**),
//!   raised (kobo **int**)
//! - `projects:index` -- **set** of project ids
//!
//! A donation hash and its zset entry land in one MULTI pipeline. The raised
//! update runs as a WATCH transaction on a connection of its own, since WATCH
//! state is per-connection and the shared manager multiplexes.

use std::{collections::HashMap, time::Duration};

use chrono::Utc;
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{error::AppError, utils::to_kobo};

pub const DONATION_COUNTER: &str = "donation:next";
pub const DONATIONS_BY_AMOUNT: &str = "donations:by_amount";
pub const PROJECTS_INDEX: &str = "projects:index";

pub const STATUS_PENDING: &str = "pending";

pub const LEADERBOARD_SIZE: isize = 10;

const TX_ATTEMPTS: u32 = 16;
const TX_BACKOFF: Duration = Duration::from_millis(5);

pub fn donation_key(id: u64) -> String {
    format!("donation:{id}")
}

pub fn project_key(id: &str) -> String {
    format!("project:{id}")
}

pub async fn init_redis(redis_url: &str) -> (Client, ConnectionManager) {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).expect("Redis misconfigured!");
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .expect("Redis unreachable!");

    (client, connection_manager)
}

pub struct NewDonation {
    pub amount: u64,
    pub donor: String,
    pub message: String,
    pub project: Option<String>,
}

/// Append one donation record and its leaderboard index entry. Records are
/// immutable once written.
pub async fn append_donation(
    mut con: ConnectionManager,
    donation: &NewDonation,
) -> Result<u64, AppError> {
    let id: u64 = con.incr(DONATION_COUNTER, 1).await?;
    let created_at = Utc::now().timestamp_millis();

    let _: () = redis::pipe()
        .atomic()
        .hset_multiple(
            donation_key(id),
            &[
                ("amount", donation.amount.to_string()),
                ("donor", donation.donor.clone()),
                ("message", donation.message.clone()),
                ("project", donation.project.clone().unwrap_or_default()),
                ("status", STATUS_PENDING.to_string()),
                ("created_at", created_at.to_string()),
            ],
        )
        .ignore()
        .zadd(DONATIONS_BY_AMOUNT, id, donation.amount)
        .ignore()
        .query_async(&mut con)
        .await?;

    Ok(id)
}

/// Apply a donation to a project's raised total.
///
/// WATCH-based read-modify-write: a nil EXEC means another client touched the
/// project between our read and our write, so the whole read-modify-write is
/// retried. A missing project is created inside the same transaction with a
/// zero goal. Concurrent submissions to one project serialize here; none are
/// lost.
pub async fn apply_to_project(
    client: &Client,
    project_id: &str,
    amount: u64,
) -> Result<(), AppError> {
    let mut con = client.get_multiplexed_async_connection().await?;
    let key = project_key(project_id);

    for attempt in 1..=TX_ATTEMPTS {
        let _: () = redis::cmd("WATCH").arg(&key).query_async(&mut con).await?;

        let raised: Option<u64> = con.hget(&key, "raised").await?;

        let mut pipe = redis::pipe();
        pipe.atomic();

        match raised {
            Some(previous) => {
                let updated = previous.checked_add(amount).ok_or(AppError::Overflow)?;
                pipe.hset(&key, "raised", updated).ignore();
            }
            None => {
                pipe.hset(&key, "raised", amount)
                    .ignore()
                    .hset_nx(&key, "goal", 0)
                    .ignore()
                    .sadd(PROJECTS_INDEX, project_id)
                    .ignore();
            }
        }

        let committed: Option<()> = pipe.query_async(&mut con).await?;

        if committed.is_some() {
            return Ok(());
        }

        #[cfg(feature = "verbose")]
        tracing::info!("Raised update conflict on {project_id}, attempt {attempt}");

        tokio::time::sleep(TX_BACKOFF * attempt).await;
    }

    Err(AppError::Contention)
}

/// Top donations by amount, raw hashes in descending order.
pub async fn read_top_donations(
    mut con: ConnectionManager,
) -> Result<Vec<HashMap<String, String>>, AppError> {
    let ids: Vec<u64> = con
        .zrevrange(DONATIONS_BY_AMOUNT, 0, LEADERBOARD_SIZE - 1)
        .await?;

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut pipe = redis::pipe();
    for id in &ids {
        pipe.hgetall(donation_key(*id));
    }

    Ok(pipe.query_async(&mut con).await?)
}

/// All projects with their raw hashes. SMEMBERS order is arbitrary, so ids
/// are sorted for a stable card order.
pub async fn read_projects(
    mut con: ConnectionManager,
) -> Result<Vec<(String, HashMap<String, String>)>, AppError> {
    let mut ids: Vec<String> = con.smembers(PROJECTS_INDEX).await?;
    ids.sort();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut pipe = redis::pipe();
    for id in &ids {
        pipe.hgetall(project_key(id));
    }

    let rows: Vec<HashMap<String, String>> = pipe.query_async(&mut con).await?;

    Ok(ids.into_iter().zip(rows).collect())
}

#[derive(Deserialize)]
pub struct SeedProject {
    pub id: String,
    pub title: String,
    pub goal: f64,
}

/// Idempotent startup seed. HSETNX never clobbers a live project, so
/// reseeding an existing store only fills in what is missing.
pub async fn seed_projects(mut con: ConnectionManager, path: &str) {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => {
            info!("No project seed at {path}, skipping");
            return;
        }
    };

    let seeds: Vec<SeedProject> = match serde_json::from_str(&raw) {
        Ok(seeds) => seeds,
        Err(e) => {
            warn!("Invalid project seed {path}: {e}");
            return;
        }
    };

    for seed in &seeds {
        let goal = if seed.goal == 0.0 {
            Ok(0)
        } else {
            to_kobo(seed.goal)
        };

        let goal = match goal {
            Ok(goal) => goal,
            Err(_) => {
                warn!("Skipping seed project {} with invalid goal", seed.id);
                continue;
            }
        };

        let key = project_key(&seed.id);
        let result: Result<(), redis::RedisError> = redis::pipe()
            .atomic()
            .hset_nx(&key, "title", &seed.title)
            .ignore()
            .hset_nx(&key, "goal", goal)
            .ignore()
            .hset_nx(&key, "raised", 0)
            .ignore()
            .sadd(PROJECTS_INDEX, &seed.id)
            .ignore()
            .query_async(&mut con)
            .await;

        if let Err(e) = result {
            warn!("Failed to seed project {}: {e}", seed.id);
        }
    }

    info!("Seeded {} projects from {path}", seeds.len());
}
