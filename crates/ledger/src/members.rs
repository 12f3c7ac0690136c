use async_trait::async_trait;
use eyre::Result;
use futures_util::{stream, StreamExt as _};
use model::member::ChatMember;

const MAX_PARALLEL_LOOKUPS: usize = 16;

/// Chat the subscribers are members of.
#[async_trait]
pub trait ChatMembers: Send + Sync {
    /// Fails when the user was never in the chat.
    async fn chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember>;

    /// Removes the user from the chat, without banning them.
    async fn unban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<()>;
}

/// Looks up every id concurrently and keeps the lookups that succeeded.
pub async fn reconcile<I>(chat: &dyn ChatMembers, chat_id: i64, ids: I) -> Vec<ChatMember>
where
    I: IntoIterator<Item = i64>,
{
    stream::iter(ids)
        .map(|user_id| async move { (user_id, chat.chat_member(chat_id, user_id).await) })
        .buffer_unordered(MAX_PARALLEL_LOOKUPS)
        .filter_map(|(user_id, result)| async move {
            match result {
                Ok(member) => Some(member),
                Err(err) => {
                    log::debug!("No chat member {}: {:#}", user_id, err);
                    None
                }
            }
        })
        .collect()
        .await
}

pub fn revocable(members: Vec<ChatMember>) -> impl Iterator<Item = ChatMember> {
    members.into_iter().filter(|member| {
        let revocable = member.status.is_revocable();
        if !revocable {
            log::debug!("Skipping {} member {}", member.status, member.user_id);
        }
        revocable
    })
}
