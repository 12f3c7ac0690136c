use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Chat member status as named by the Telegram Bot API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// False for members who already left the chat and for privileged ones.
    pub fn is_revocable(&self) -> bool {
        !matches!(
            self,
            MemberStatus::Kicked
                | MemberStatus::Left
                | MemberStatus::Creator
                | MemberStatus::Administrator
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user_id: i64,
    pub status: MemberStatus,
}
