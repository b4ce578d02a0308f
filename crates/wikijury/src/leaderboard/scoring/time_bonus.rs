use super::super::schema::{CanonicalTable, EnrollmentStatus};
use std::fmt;

const MAX_BONUS: f64 = 0.1;

/// Why the enrollment bonus fell back to a neutral multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBonusSkipped {
    NoEnrollmentColumn,
    Unparseable { row: usize, value: String },
    MissingTimestamp { username: String },
    ZeroRange,
}

impl fmt::Display for TimeBonusSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBonusSkipped::NoEnrollmentColumn => write!(f, "no enrollment timestamp column"),
            TimeBonusSkipped::Unparseable { row, value } => {
                write!(f, "enrollment timestamp '{value}' on row {row} is not a date")
            }
            TimeBonusSkipped::MissingTimestamp { username } => {
                write!(f, "no enrollment timestamp for '{username}'")
            }
            TimeBonusSkipped::ZeroRange => write!(f, "every contributor enrolled on the same day"),
        }
    }
}

/// Multiplier per contributor, aligned with `table.contributors`.
///
/// The earliest enrollee gets `1.1`, the latest exactly `1.0`, linear in
/// whole days between them.
pub fn time_bonus_multipliers(table: &CanonicalTable) -> Result<Vec<f64>, TimeBonusSkipped> {
    match &table.enrollment {
        EnrollmentStatus::Absent => return Err(TimeBonusSkipped::NoEnrollmentColumn),
        EnrollmentStatus::Unparseable { row, value } => {
            return Err(TimeBonusSkipped::Unparseable {
                row: *row,
                value: value.clone(),
            })
        }
        EnrollmentStatus::Complete => {}
    }

    let timestamps = table
        .contributors
        .iter()
        .map(|metrics| {
            metrics
                .enrolled_at
                .ok_or_else(|| TimeBonusSkipped::MissingTimestamp {
                    username: metrics.username.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (Some(earliest), Some(latest)) = (timestamps.iter().min(), timestamps.iter().max()) else {
        return Err(TimeBonusSkipped::ZeroRange);
    };
    let range_days = (*latest - *earliest).num_days();
    if range_days <= 0 {
        return Err(TimeBonusSkipped::ZeroRange);
    }

    let range_days = range_days as f64;
    Ok(timestamps
        .iter()
        .map(|timestamp| {
            let offset_days = (*timestamp - *earliest).num_days() as f64;
            1.0 + MAX_BONUS * (1.0 - offset_days / range_days)
        })
        .collect())
}
