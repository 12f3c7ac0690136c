use chrono::{DateTime, FixedOffset};
use model::subscription::DurationPolicy;

/// Moment the subscription stops being valid. `None` if it never does.
pub fn expires_at(
    recorded_at: DateTime<FixedOffset>,
    policy: DurationPolicy,
) -> Option<DateTime<FixedOffset>> {
    recorded_at.checked_add_signed(policy.duration()?)
}

pub fn is_expired(
    recorded_at: DateTime<FixedOffset>,
    policy: DurationPolicy,
    now: DateTime<FixedOffset>,
) -> bool {
    match expires_at(recorded_at, policy) {
        Some(expires_at) => expires_at < now,
        None => false,
    }
}
