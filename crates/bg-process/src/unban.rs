use async_trait::async_trait;
use eyre::{Context as _, Error, Result};
use ledger::Ledger;
use log::info;

use crate::Task;

#[derive(Clone)]
pub struct UnbanBg {
    ledger: Ledger,
    schedule: String,
}

#[async_trait]
impl Task for UnbanBg {
    const NAME: &'static str = "unban";

    fn cron(&self) -> &str {
        &self.schedule
    }

    async fn process(&mut self) -> Result<(), Error> {
        let now = self.ledger.now();
        let report = self
            .ledger
            .revoke_expired(now)
            .await
            .context("revoke_expired")?;
        if !report.revoked.is_empty() {
            info!("Unbanned subscribers: {:?}", report.revoked);
        }
        Ok(())
    }
}

impl UnbanBg {
    pub fn new(ledger: Ledger, schedule: impl Into<String>) -> UnbanBg {
        UnbanBg {
            ledger,
            schedule: schedule.into(),
        }
    }
}
