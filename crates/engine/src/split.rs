//! The share allocator.
//!
//! Turns a total, a payer and per-participant percentage weights into the
//! signed per-user shares stored on an expense. Positive share = the user is
//! owed money, negative = the user owes money.
//!
//! Each share is `round(total * pct / 100)`, rounded half away from zero
//! independently per participant, with the total the payer fronted netted
//! against their own share. No residual-redistribution pass runs: with
//! fractional percentages the literal sum of shares can drift from zero by
//! up to one minor unit per participant. Whole-percent splits of the amounts
//! this app sees in practice round exactly.

use crate::{EngineError, Money, shares::NewShare};

/// How close to 100 the percentage sum must be.
const PERCENTAGE_EPSILON: f64 = 1e-6;

/// Recovers per-participant percentages from cumulative slider boundaries.
///
/// The split slider exposes one handle between each pair of adjacent
/// participants, so `boundaries` holds the cumulative positions for all but
/// the last participant, ascending in `0..=100`. Percentages are the
/// successive differences; the final participant gets whatever remains, so
/// the result always sums to exactly 100.
pub fn percentages_from_boundaries(boundaries: &[f64]) -> Vec<f64> {
    let mut percentages = Vec::with_capacity(boundaries.len() + 1);
    let mut prev = 0.0;
    for &boundary in boundaries {
        percentages.push(boundary - prev);
        prev = boundary;
    }
    percentages.push(100.0 - prev);
    percentages
}

/// Allocates `total` over `portions` (`(user_id, percentage)` pairs), with
/// `paid_by` fronting the whole amount.
///
/// Every participant's share is their allocated portion; the payer's is
/// additionally reduced by `total` (they paid, so the group owes them the
/// rest).
pub fn allocate(
    total: Money,
    paid_by: i32,
    portions: &[(i32, f64)],
) -> Result<Vec<NewShare>, EngineError> {
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "total must be positive".to_string(),
        ));
    }
    if portions.is_empty() {
        return Err(EngineError::InvalidShares(
            "at least one participant is required".to_string(),
        ));
    }
    if !portions.iter().any(|(user_id, _)| *user_id == paid_by) {
        return Err(EngineError::InvalidShares(
            "payer is not among the participants".to_string(),
        ));
    }
    for (user_id, percentage) in portions {
        if *percentage < 0.0 {
            return Err(EngineError::InvalidShares(format!(
                "negative percentage for user {user_id}"
            )));
        }
    }
    let sum: f64 = portions.iter().map(|(_, percentage)| percentage).sum();
    if (sum - 100.0).abs() > PERCENTAGE_EPSILON {
        return Err(EngineError::InvalidShares(format!(
            "percentages sum to {sum}, expected 100"
        )));
    }

    let shares = portions
        .iter()
        .map(|&(user_id, percentage)| {
            let allocated = (total.minor() as f64 * percentage / 100.0).round() as i64;
            let fronted = if user_id == paid_by { total.minor() } else { 0 };
            NewShare {
                user_id,
                share: Money::new(allocated - fronted),
            }
        })
        .collect();

    Ok(shares)
}
