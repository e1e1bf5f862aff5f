//! Donation coordination.
//!
//! A submission validates, appends the record, applies the amount to the
//! targeted project, refreshes both views, and hands back the id plus the
//! payment redirect URL. The append strictly precedes the project update, so
//! the worst partial failure is a recorded donation with no aggregate update,
//! never a raised total with no record behind it.

use std::sync::Arc;

use crate::{
    database::{append_donation, apply_to_project, NewDonation},
    error::AppError,
    state::State,
    utils::{naira_string, to_kobo},
    views,
};

pub const ANONYMOUS: &str = "Anonymous";

pub struct Submission {
    pub amount: f64,
    pub donor: Option<String>,
    pub message: Option<String>,
    pub project: Option<String>,
}

#[derive(serde::Serialize)]
pub struct Receipt {
    pub id: u64,
    pub payment_url: String,
}

pub async fn submit(state: Arc<State>, submission: Submission) -> Result<Receipt, AppError> {
    let amount = to_kobo(submission.amount)?;

    let donation = NewDonation {
        amount,
        donor: normalize_donor(submission.donor),
        message: submission.message.unwrap_or_default(),
        project: submission
            .project
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    };

    let id = append_donation(state.redis_connection.clone(), &donation).await?;

    if let Some(project) = &donation.project {
        apply_to_project(&state.redis_client, project, amount).await?;
    }

    // Best effort; a failed refresh never fails the donation.
    views::refresh_leaderboard(&state).await;
    views::refresh_projects(&state).await;

    Ok(Receipt {
        id,
        payment_url: payment_link(&state.config.payment_link, Some(amount)),
    })
}

/// Hosted payment URL, with the amount appended as a query when known.
/// Whether the destination honors it is up to the provider.
pub fn payment_link(base: &str, amount: Option<u64>) -> String {
    match amount {
        Some(kobo) => format!("{base}?amount={}", naira_string(kobo)),
        None => base.to_string(),
    }
}

pub fn normalize_donor(donor: Option<String>) -> String {
    match donor {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_donor, payment_link, ANONYMOUS};

    const BASE: &str = "https://flutterwave.com/donate/jjejspsyo9eh";

    #[test]
    fn test_payment_link_with_amount() {
        assert_eq!(
            payment_link(BASE, Some(500_000)),
            "https://flutterwave.com/donate/jjejspsyo9eh?amount=5000"
        );
        assert_eq!(
            payment_link(BASE, Some(123_456)),
            "https://flutterwave.com/donate/jjejspsyo9eh?amount=1234.56"
        );
    }

    #[test]
    fn test_payment_link_without_amount() {
        assert_eq!(payment_link(BASE, None), BASE);
    }

    #[test]
    fn test_normalize_donor_defaults() {
        assert_eq!(normalize_donor(None), ANONYMOUS);
        assert_eq!(normalize_donor(Some("".to_string())), ANONYMOUS);
        assert_eq!(normalize_donor(Some("   ".to_string())), ANONYMOUS);
    }

    #[test]
    fn test_normalize_donor_trims() {
        assert_eq!(normalize_donor(Some(" Ada ".to_string())), "Ada");
    }
}
