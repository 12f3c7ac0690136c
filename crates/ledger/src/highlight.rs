use std::collections::BTreeSet;

use chrono::FixedOffset;
use model::cell::Color;
use storage::grid::CellGrid;

use crate::rows::{rows, DATE_COLUMN, DURATION_COLUMN, ID_COLUMN};

pub const REVOKED_COLOR: Color = Color::RED;

/// Paints every ledger row of the revoked subscribers, old rows included.
/// Returns the number of rows painted.
pub fn highlight(grid: &mut CellGrid, revoked: &BTreeSet<i64>, tz: FixedOffset) -> usize {
    if revoked.is_empty() {
        return 0;
    }

    let marked = rows(grid, tz)
        .filter(|record| revoked.contains(&record.subscriber_id))
        .map(|record| record.row)
        .collect::<Vec<_>>();

    for &row in &marked {
        for column in [ID_COLUMN, DATE_COLUMN, DURATION_COLUMN] {
            grid.set_background(row, column, REVOKED_COLOR);
        }
    }
    marked.len()
}
