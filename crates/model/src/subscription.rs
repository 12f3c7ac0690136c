use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::cell::{leading_float, CellValue};

/// Duration cell value for a subscription that never ends.
pub const INFINITE_MARK: &str = "Б";
pub const DEFAULT_DAYS: i64 = 30;
const MILLIS_IN_MONTH: f64 = 30.0 * 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DurationPolicy {
    Infinite,
    DefaultThirtyDays,
    /// Number of 30-day months.
    Explicit { months: f64 },
}

impl DurationPolicy {
    /// Reads the duration cell. Never fails: anything unrecognized is the 30-day default.
    pub fn resolve(cell: Option<&CellValue>) -> DurationPolicy {
        match cell {
            Some(CellValue::Number(months)) if months.is_finite() => {
                DurationPolicy::Explicit { months: *months }
            }
            Some(CellValue::Text(text)) => match leading_float(text) {
                Some(months) => DurationPolicy::Explicit { months },
                None if text == INFINITE_MARK => DurationPolicy::Infinite,
                None => DurationPolicy::DefaultThirtyDays,
            },
            _ => DurationPolicy::DefaultThirtyDays,
        }
    }

    /// `None` for infinite subscriptions or durations too large to represent.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            DurationPolicy::Infinite => None,
            DurationPolicy::DefaultThirtyDays => Duration::try_days(DEFAULT_DAYS),
            DurationPolicy::Explicit { months } => {
                let millis = (months * MILLIS_IN_MONTH).round();
                if millis.is_finite() && millis.abs() < i64::MAX as f64 {
                    Duration::try_milliseconds(millis as i64)
                } else {
                    None
                }
            }
        }
    }
}

/// One parsed ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// 0-based row in the sheet.
    pub row: usize,
    pub subscriber_id: i64,
    pub recorded_at: DateTime<FixedOffset>,
    pub duration: DurationPolicy,
}
