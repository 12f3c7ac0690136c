pub mod auth;
pub mod google;
pub mod grid;

use async_trait::async_trait;
use eyre::Result;
use grid::{CellGrid, CellRange};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
    #[error("Sheets API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Bad service account credentials: {0}")]
    Credentials(String),
}

/// Spreadsheet the subscription ledger lives in.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Fetches a rectangular region into memory.
    async fn load_cells(&self, range: CellRange) -> Result<CellGrid>;

    /// Writes every modified cell of the grid in one round trip.
    async fn save_updated_cells(&self, grid: &mut CellGrid) -> Result<()>;
}
