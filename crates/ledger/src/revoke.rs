use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use model::subscription::SubscriptionRecord;

use crate::{expiry::expires_at, members::ChatMembers};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Revocation {
    /// Subscribers removed from the chat in this pass.
    pub revoked: BTreeSet<i64>,
    pub failed: BTreeSet<i64>,
}

/// Unbans every expired subscriber one by one. A failed unban is logged and
/// left for the next pass.
pub async fn revoke(
    chat: &dyn ChatMembers,
    chat_id: i64,
    expired: &[&SubscriptionRecord],
    now: DateTime<FixedOffset>,
) -> Revocation {
    let mut revocation = Revocation::default();
    for record in expired {
        let user_id = record.subscriber_id;
        if let Err(err) = chat.unban_chat_member(chat_id, user_id).await {
            log::error!("Failed to unban {}: {:#}", user_id, err);
            revocation.failed.insert(user_id);
            continue;
        }

        let expired_at = expires_at(record.recorded_at, record.duration);
        log::info!(
            "Unban {}: subscribed {}, expired {}, now {}, duration {} days",
            user_id,
            record.recorded_at,
            expired_at
                .map(|date| date.to_string())
                .unwrap_or_else(|| "never".to_owned()),
            now,
            record
                .duration
                .duration()
                .map(|duration| duration.num_days())
                .unwrap_or_default(),
        );
        revocation.revoked.insert(user_id);
    }
    revocation
}
