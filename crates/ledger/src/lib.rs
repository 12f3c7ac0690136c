pub mod expiry;
pub mod highlight;
pub mod members;
pub mod revoke;
pub mod rows;
pub mod subscribers;

#[cfg(test)]
mod fakes;

use std::{fmt, sync::Arc};

use chrono::{DateTime, FixedOffset, Utc};
use eyre::{Context as _, Result};
use log::{debug, info};
use members::{reconcile, revocable, ChatMembers};
use storage::{grid::CellRange, Spreadsheet};
use subscribers::Subscribers;

/// What one pass over the sheet did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub records: usize,
    pub subscribers: usize,
    pub members: usize,
    pub expired: usize,
    pub revoked: Vec<i64>,
    pub failed: Vec<i64>,
    pub highlighted_rows: usize,
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} subscribers, {} in chat, {} expired, {} unbanned, {} failed, {} rows highlighted",
            self.records,
            self.subscribers,
            self.members,
            self.expired,
            self.revoked.len(),
            self.failed.len(),
            self.highlighted_rows
        )
    }
}

#[derive(Clone)]
pub struct Ledger {
    sheet: Arc<dyn Spreadsheet>,
    chat: Arc<dyn ChatMembers>,
    chat_id: i64,
    tz: FixedOffset,
}

impl Ledger {
    pub fn new(
        sheet: Arc<dyn Spreadsheet>,
        chat: Arc<dyn ChatMembers>,
        chat_id: i64,
        tz: FixedOffset,
    ) -> Self {
        Ledger {
            sheet,
            chat,
            chat_id,
            tz,
        }
    }

    /// Current time in the sheet's offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Reads the sheet, unbans members whose last subscription ran out before
    /// `now` and paints their rows. Sheet errors abort the pass.
    pub async fn revoke_expired(&self, now: DateTime<FixedOffset>) -> Result<PassReport> {
        let mut grid = self
            .sheet
            .load_cells(CellRange::columns(0, rows::COLUMNS))
            .await
            .context("load_cells")?;

        let subscribers = Subscribers::collect(rows::rows(&grid, self.tz));
        let mut report = PassReport {
            records: subscribers.record_count(),
            subscribers: subscribers.len(),
            ..Default::default()
        };

        let members = reconcile(self.chat.as_ref(), self.chat_id, subscribers.ids()).await;
        report.members = members.len();

        let mut expired = vec![];
        for member in revocable(members) {
            let Some(last) = subscribers.last(member.user_id) else {
                debug!("Chat member {} is not in the sheet", member.user_id);
                continue;
            };
            if expiry::is_expired(last.recorded_at, last.duration, now) {
                expired.push(last);
            }
        }
        report.expired = expired.len();

        let revocation = revoke::revoke(self.chat.as_ref(), self.chat_id, &expired, now).await;
        report.highlighted_rows = highlight::highlight(&mut grid, &revocation.revoked, self.tz);
        report.revoked = revocation.revoked.into_iter().collect();
        report.failed = revocation.failed.into_iter().collect();

        self.sheet
            .save_updated_cells(&mut grid)
            .await
            .context("save_updated_cells")?;

        info!("Pass finished: {}", report);
        Ok(report)
    }
}
