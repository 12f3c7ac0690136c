use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use eyre::{bail, eyre, Result};
use model::member::{ChatMember, MemberStatus};
use parking_lot::Mutex;
use storage::{
    grid::{CellGrid, CellRange},
    Spreadsheet,
};

use crate::members::ChatMembers;

pub struct FakeChat {
    statuses: HashMap<i64, MemberStatus>,
    failing_unbans: HashSet<i64>,
    lookups: AtomicUsize,
    unbanned: Mutex<Vec<i64>>,
}

impl FakeChat {
    pub fn new(statuses: HashMap<i64, MemberStatus>) -> Self {
        FakeChat {
            statuses,
            failing_unbans: HashSet::new(),
            lookups: AtomicUsize::new(0),
            unbanned: Mutex::new(vec![]),
        }
    }

    pub fn fail_unban(mut self, user_id: i64) -> Self {
        self.failing_unbans.insert(user_id);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn unbanned(&self) -> Vec<i64> {
        self.unbanned.lock().clone()
    }
}

#[async_trait]
impl ChatMembers for FakeChat {
    async fn chat_member(&self, _chat_id: i64, user_id: i64) -> Result<ChatMember> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let status = self
            .statuses
            .get(&user_id)
            .copied()
            .ok_or_else(|| eyre!("Bad Request: user not found"))?;
        Ok(ChatMember { user_id, status })
    }

    async fn unban_chat_member(&self, _chat_id: i64, user_id: i64) -> Result<()> {
        if self.failing_unbans.contains(&user_id) {
            bail!("Bad Request: not enough rights to restrict/unrestrict chat member");
        }
        self.unbanned.lock().push(user_id);
        Ok(())
    }
}

pub struct FakeSheet {
    grid: Mutex<CellGrid>,
    fail_load: bool,
    saves: AtomicUsize,
}

impl FakeSheet {
    pub fn new(grid: CellGrid) -> Self {
        FakeSheet {
            grid: Mutex::new(grid),
            fail_load: false,
            saves: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        FakeSheet {
            fail_load: true,
            ..FakeSheet::new(CellGrid::default())
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn grid(&self) -> CellGrid {
        self.grid.lock().clone()
    }
}

#[async_trait]
impl Spreadsheet for FakeSheet {
    async fn load_cells(&self, _range: CellRange) -> Result<CellGrid> {
        if self.fail_load {
            bail!("Sheets API error 503: backend unavailable");
        }
        Ok(self.grid.lock().clone())
    }

    async fn save_updated_cells(&self, grid: &mut CellGrid) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut saved = grid.clone();
        saved.clear_updates();
        *self.grid.lock() = saved;
        grid.clear_updates();
        Ok(())
    }
}
