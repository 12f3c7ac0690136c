use std::collections::BTreeSet;

use model::cell::{CellValue, Color};

static EMPTY: CellValue = CellValue::Empty;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub background: Option<Color>,
}

/// Rectangle of cells to load. `end_row: None` means every row of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_row: usize,
    pub end_row: Option<usize>,
    pub start_column: usize,
    pub end_column: usize,
}

impl CellRange {
    pub fn columns(start_column: usize, end_column: usize) -> CellRange {
        CellRange {
            start_row: 0,
            end_row: None,
            start_column,
            end_column,
        }
    }

    /// A1 notation of the range on the named sheet, e.g. `'Sheet 1'!A1:C`.
    pub fn to_a1(&self, sheet_name: &str) -> String {
        let sheet = sheet_name.replace('\'', "''");
        let start = format!("{}{}", column_letters(self.start_column), self.start_row + 1);
        let end_column = column_letters(self.end_column.saturating_sub(1).max(self.start_column));
        match self.end_row {
            Some(end_row) => format!("'{}'!{}:{}{}", sheet, start, end_column, end_row),
            None => format!("'{}'!{}:{}", sheet, start, end_column),
        }
    }
}

pub fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (column % 26) as u8);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// In-memory copy of a loaded sheet region.
///
/// Coordinates are absolute sheet coordinates. Reads outside the loaded
/// region return an empty cell. Background changes are remembered until
/// the grid is saved.
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
    sheet_id: i64,
    start_row: usize,
    start_column: usize,
    rows: Vec<Vec<Cell>>,
    dirty: BTreeSet<(usize, usize)>,
}

impl CellGrid {
    pub fn new(sheet_id: i64, start_row: usize, start_column: usize, rows: Vec<Vec<Cell>>) -> Self {
        CellGrid {
            sheet_id,
            start_row,
            start_column,
            rows,
            dirty: BTreeSet::new(),
        }
    }

    pub fn from_values(rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| Cell {
                        value,
                        background: None,
                    })
                    .collect()
            })
            .collect();
        CellGrid::new(0, 0, 0, rows)
    }

    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    /// One past the last loaded row.
    pub fn end_row(&self) -> usize {
        self.start_row + self.rows.len()
    }

    fn local(&self, row: usize, column: usize) -> Option<(usize, usize)> {
        Some((
            row.checked_sub(self.start_row)?,
            column.checked_sub(self.start_column)?,
        ))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        let (row, column) = self.local(row, column)?;
        self.rows.get(row)?.get(column)
    }

    pub fn value(&self, row: usize, column: usize) -> &CellValue {
        self.cell(row, column)
            .map(|cell| &cell.value)
            .unwrap_or(&EMPTY)
    }

    pub fn background(&self, row: usize, column: usize) -> Option<Color> {
        self.cell(row, column).and_then(|cell| cell.background)
    }

    /// Paints a cell inside the loaded region. Returns false for cells outside it.
    pub fn set_background(&mut self, row: usize, column: usize, color: Color) -> bool {
        let Some((local_row, local_column)) = self.local(row, column) else {
            return false;
        };
        let Some(cells) = self.rows.get_mut(local_row) else {
            return false;
        };
        if cells.len() <= local_column {
            cells.resize_with(local_column + 1, Cell::default);
        }
        cells[local_column].background = Some(color);
        self.dirty.insert((row, column));
        true
    }

    pub fn dirty_cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.dirty
            .iter()
            .filter_map(|&(row, column)| Some((row, column, self.cell(row, column)?)))
    }

    pub fn has_updates(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear_updates(&mut self) {
        self.dirty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(2), "C");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_a1_range() {
        assert_eq!(CellRange::columns(0, 3).to_a1("Subs"), "'Subs'!A1:C");
        assert_eq!(
            CellRange {
                start_row: 1,
                end_row: Some(100),
                start_column: 1,
                end_column: 3,
            }
            .to_a1("Bob's"),
            "'Bob''s'!B2:C100"
        );
    }

    #[test]
    fn test_reads_outside_region_are_empty() {
        let grid = CellGrid::from_values(vec![vec![CellValue::Number(1.0)]]);
        assert_eq!(grid.value(0, 0), &CellValue::Number(1.0));
        assert_eq!(grid.value(0, 5), &CellValue::Empty);
        assert_eq!(grid.value(9, 0), &CellValue::Empty);
        assert_eq!(grid.end_row(), 1);
    }

    #[test]
    fn test_offset_region() {
        let grid = CellGrid::new(
            7,
            10,
            2,
            vec![vec![Cell {
                value: CellValue::text("x"),
                background: None,
            }]],
        );
        assert_eq!(grid.value(10, 2), &CellValue::text("x"));
        assert_eq!(grid.value(0, 0), &CellValue::Empty);
        assert_eq!(grid.end_row(), 11);
        assert_eq!(grid.sheet_id(), 7);
    }

    #[test]
    fn test_background_updates_are_tracked() {
        let mut grid = CellGrid::from_values(vec![
            vec![CellValue::Number(1.0)],
            vec![CellValue::Number(2.0), CellValue::Number(3.0)],
        ]);
        assert!(!grid.has_updates());

        assert!(grid.set_background(0, 2, Color::RED));
        assert!(grid.set_background(1, 0, Color::RED));
        assert!(!grid.set_background(5, 0, Color::RED));

        assert_eq!(grid.background(0, 2), Some(Color::RED));
        assert_eq!(grid.background(1, 1), None);
        let dirty = grid
            .dirty_cells()
            .map(|(row, column, _)| (row, column))
            .collect::<Vec<_>>();
        assert_eq!(dirty, vec![(0, 2), (1, 0)]);

        grid.clear_updates();
        assert!(!grid.has_updates());
        assert_eq!(grid.background(0, 2), Some(Color::RED));
    }
}
