//! Read views over the store.
//!
//! Each view holds the last snapshot it managed to render. Refreshing reads
//! the store and swaps the snapshot in; a failed read logs and leaves the
//! previous snapshot serving. Mapping from raw hashes to display rows is kept
//! pure so it can be tested without a store.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    database::{read_projects, read_top_donations},
    donations::ANONYMOUS,
    state::State,
    utils::format_naira,
};

pub const UNTITLED_PROJECT: &str = "Untitled Project";

#[derive(Default)]
pub struct Views {
    pub leaderboard: RwLock<Vec<LeaderboardEntry>>,
    pub projects: RwLock<Vec<ProjectCard>>,
}

#[derive(Clone, Serialize)]
pub struct LeaderboardEntry {
    pub donor: String,
    pub amount: String,
    pub project: bool,
}

#[derive(Clone, Serialize)]
pub struct ProjectCard {
    pub id: String,
    pub title: String,
    pub goal: String,
    pub raised: String,
    pub percent: u32,
    pub contribute: String,
}

pub async fn refresh_leaderboard(state: &State) {
    match read_top_donations(state.redis_connection.clone()).await {
        Ok(rows) => {
            *state.views.leaderboard.write().await = leaderboard_entries(&rows);
        }
        Err(e) => warn!("Failed to refresh leaderboard: {e}"),
    }
}

pub async fn refresh_projects(state: &State) {
    match read_projects(state.redis_connection.clone()).await {
        // Nothing in the store yet, keep whatever static cards are showing.
        Ok(rows) if rows.is_empty() => {}
        Ok(rows) => {
            *state.views.projects.write().await = project_cards(&rows);
        }
        Err(e) => warn!("Failed to refresh projects: {e}"),
    }
}

pub fn leaderboard_entries(rows: &[HashMap<String, String>]) -> Vec<LeaderboardEntry> {
    rows.iter()
        .map(|row| LeaderboardEntry {
            donor: non_empty(row, "donor", ANONYMOUS),
            amount: format_naira(field_u64(row, "amount")),
            project: row.get("project").is_some_and(|p| !p.is_empty()),
        })
        .collect()
}

pub fn project_cards(rows: &[(String, HashMap<String, String>)]) -> Vec<ProjectCard> {
    rows.iter()
        .map(|(id, row)| {
            let goal = field_u64(row, "goal");
            let raised = field_u64(row, "raised");

            ProjectCard {
                id: id.clone(),
                title: non_empty(row, "title", UNTITLED_PROJECT),
                goal: format_naira(goal),
                raised: format_naira(raised),
                percent: progress_percent(raised, goal),
                contribute: format!("/projects/{id}/donate"),
            }
        })
        .collect()
}

/// Completion percentage, clamped to [0, 100]. A zero goal reads as 0 no
/// matter what was raised.
pub fn progress_percent(raised: u64, goal: u64) -> u32 {
    if goal == 0 {
        return 0;
    }

    ((raised as f64 / goal as f64) * 100.0).round().min(100.0) as u32
}

fn field_u64(row: &HashMap<String, String>, field: &str) -> u64 {
    row.get(field).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn non_empty(row: &HashMap<String, String>, field: &str, default: &str) -> String {
    match row.get(field) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{leaderboard_entries, progress_percent, project_cards, UNTITLED_PROJECT};
    use crate::donations::ANONYMOUS;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_progress_percent_clamped() {
        assert_eq!(progress_percent(0, 1_000_000), 0);
        assert_eq!(progress_percent(300_000, 1_000_000), 30);
        assert_eq!(progress_percent(1_000_000, 1_000_000), 100);
        assert_eq!(progress_percent(2_000_000, 1_000_000), 100);
    }

    #[test]
    fn test_progress_percent_zero_goal() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(500_000, 0), 0);
    }

    #[test]
    fn test_progress_percent_rounds() {
        assert_eq!(progress_percent(1, 300), 0);
        assert_eq!(progress_percent(2, 300), 1);
        assert_eq!(progress_percent(500, 3000), 17);
    }

    #[test]
    fn test_leaderboard_entry_mapping() {
        let rows = vec![
            row(&[("donor", "Ada"), ("amount", "500000"), ("project", "")]),
            row(&[("donor", ""), ("amount", "200000"), ("project", "proj1")]),
        ];

        let entries = leaderboard_entries(&rows);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].donor, "Ada");
        assert_eq!(entries[0].amount, "₦5,000");
        assert!(!entries[0].project);
        assert_eq!(entries[1].donor, ANONYMOUS);
        assert_eq!(entries[1].amount, "₦2,000");
        assert!(entries[1].project);
    }

    #[test]
    fn test_project_card_mapping() {
        let rows = vec![(
            "proj1".to_string(),
            row(&[("title", "Borehole"), ("goal", "1000000"), ("raised", "500000")]),
        )];

        let cards = project_cards(&rows);

        assert_eq!(cards[0].id, "proj1");
        assert_eq!(cards[0].title, "Borehole");
        assert_eq!(cards[0].goal, "₦10,000");
        assert_eq!(cards[0].raised, "₦5,000");
        assert_eq!(cards[0].percent, 50);
        assert_eq!(cards[0].contribute, "/projects/proj1/donate");
    }

    #[test]
    fn test_project_card_defaults() {
        let rows = vec![("lazy".to_string(), row(&[("goal", "0"), ("raised", "200000")]))];

        let cards = project_cards(&rows);

        assert_eq!(cards[0].title, UNTITLED_PROJECT);
        assert_eq!(cards[0].percent, 0);
        assert_eq!(cards[0].raised, "₦2,000");
    }
}
