use chrono::FixedOffset;
use model::{
    cell::CellValue,
    serial::serial_to_datetime,
    subscription::{DurationPolicy, SubscriptionRecord},
};
use storage::grid::CellGrid;

pub const ID_COLUMN: usize = 0;
pub const DATE_COLUMN: usize = 1;
pub const DURATION_COLUMN: usize = 2;
/// Number of ledger columns, starting at column A.
pub const COLUMNS: usize = 3;

/// Parses one ledger row. Rows with a missing or non-numeric id or date are dropped.
pub fn parse_row(
    row: usize,
    id: &CellValue,
    date: &CellValue,
    duration: Option<&CellValue>,
    tz: &FixedOffset,
) -> Option<SubscriptionRecord> {
    if id.is_blank() || date.is_blank() {
        return None;
    }
    if !id.is_numeric_or_text() || !date.is_numeric_or_text() {
        return None;
    }

    let subscriber_id = id.as_int()?;
    let recorded_at = serial_to_datetime(date.as_float()?, tz)?;

    Some(SubscriptionRecord {
        row,
        subscriber_id,
        recorded_at,
        duration: DurationPolicy::resolve(duration),
    })
}

/// Unset, or a formula that evaluated to "".
fn is_vacant(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => true,
        CellValue::Text(text) => text.is_empty(),
        _ => false,
    }
}

/// Streams records from the top of the grid until the first row with neither id nor date.
pub fn rows(grid: &CellGrid, tz: FixedOffset) -> impl Iterator<Item = SubscriptionRecord> + '_ {
    (0..grid.end_row())
        .take_while(move |&row| {
            !(is_vacant(grid.value(row, ID_COLUMN)) && is_vacant(grid.value(row, DATE_COLUMN)))
        })
        .filter_map(move |row| {
            let record = parse_row(
                row,
                grid.value(row, ID_COLUMN),
                grid.value(row, DATE_COLUMN),
                grid.cell(row, DURATION_COLUMN).map(|cell| &cell.value),
                &tz,
            );
            if record.is_none() {
                log::trace!("Skipping row {}", row + 1);
            }
            record
        })
}
