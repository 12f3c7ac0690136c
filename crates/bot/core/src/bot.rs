use async_trait::async_trait;
use eyre::{eyre, Context as _, Error};
use ledger::members::ChatMembers;
use model::member::{ChatMember, MemberStatus};
use teloxide::{
    prelude::Requester as _,
    types::{ChatId, ChatMemberStatus, UserId},
    Bot,
};

#[derive(Clone)]
pub struct TgBot {
    bot: Bot,
}

impl TgBot {
    pub fn new(bot: Bot) -> Self {
        TgBot { bot }
    }

    pub fn from_token(token: &str) -> Self {
        TgBot::new(Bot::new(token))
    }
}

fn tg_user(id: i64) -> Result<UserId, Error> {
    u64::try_from(id)
        .map(UserId)
        .map_err(|_| eyre!("Invalid telegram user id: {}", id))
}

pub fn member_status(status: ChatMemberStatus) -> MemberStatus {
    match status {
        ChatMemberStatus::Owner => MemberStatus::Creator,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Kicked,
    }
}

#[async_trait]
impl ChatMembers for TgBot {
    async fn chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember, Error> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), tg_user(user_id)?)
            .await
            .context(format!("Failed to get chat member {}", user_id))?;
        Ok(ChatMember {
            user_id,
            status: member_status(member.kind.status()),
        })
    }

    /// Telegram removes a current member on unban, leaving them free to rejoin.
    async fn unban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<(), Error> {
        self.bot
            .unban_chat_member(ChatId(chat_id), tg_user(user_id)?)
            .await
            .context(format!("Failed to unban chat member {}", user_id))?;
        log::debug!("Unbanned {} in chat {}", user_id, chat_id);
        Ok(())
    }
}
