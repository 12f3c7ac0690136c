use std::path::Path;

use async_trait::async_trait;
use eyre::{eyre, Context as _, Result};
use model::cell::{CellValue, Color};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::{
    auth::ServiceAccount,
    grid::{Cell, CellGrid, CellRange},
    SheetError, Spreadsheet,
};

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
const LOAD_FIELDS: &str = "sheets(properties(sheetId,title),data(startRow,startColumn,\
rowData(values(effectiveValue,effectiveFormat/backgroundColorStyle))))";
const BACKGROUND_FIELD: &str = "userEnteredFormat.backgroundColorStyle";

/// One tab of a Google spreadsheet, addressed by title.
pub struct GoogleSheets {
    client: reqwest::Client,
    auth: ServiceAccount,
    spreadsheet_id: String,
    sheet_name: String,
}

impl GoogleSheets {
    pub fn new(auth: ServiceAccount, spreadsheet_id: &str, sheet_name: &str) -> Self {
        GoogleSheets {
            client: reqwest::Client::new(),
            auth,
            spreadsheet_id: spreadsheet_id.to_owned(),
            sheet_name: sheet_name.to_owned(),
        }
    }

    pub fn with_credentials(
        credentials: &Path,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<Self> {
        let auth = ServiceAccount::from_file(credentials)?;
        log::info!("Using service account {}", auth.client_email());
        Ok(GoogleSheets::new(auth, spreadsheet_id, sheet_name))
    }

    fn url(&self, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(BASE_URL)?;
        url.path_segments_mut()
            .map_err(|_| eyre!("Bad sheets base url"))?
            .pop_if_empty()
            .push(&format!("{}{}", self.spreadsheet_id, suffix));
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SheetError::Api {
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

#[async_trait]
impl Spreadsheet for GoogleSheets {
    async fn load_cells(&self, range: CellRange) -> Result<CellGrid> {
        let token = self.auth.token(&self.client).await?;
        let a1 = range.to_a1(&self.sheet_name);
        let response = self
            .client
            .get(self.url("")?)
            .bearer_auth(token)
            .query(&[
                ("ranges", a1.as_str()),
                ("includeGridData", "true"),
                ("fields", LOAD_FIELDS),
            ])
            .send()
            .await
            .context("Failed to load cells")?;
        let response: SpreadsheetResponse = Self::check(response)
            .await?
            .json()
            .await
            .context("Failed to decode cells")?;
        grid_from_response(response, &self.sheet_name, &range)
    }

    async fn save_updated_cells(&self, grid: &mut CellGrid) -> Result<()> {
        let Some(body) = batch_update_body(grid) else {
            return Ok(());
        };
        let token = self.auth.token(&self.client).await?;
        let response = self
            .client
            .post(self.url(":batchUpdate")?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("Failed to save cells")?;
        Self::check(response).await?;
        grid.clear_updates();
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetResponse>,
}

#[derive(Debug, Deserialize)]
struct SheetResponse {
    properties: SheetProperties,
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    start_row: usize,
    #[serde(default)]
    start_column: usize,
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    effective_value: Option<ExtendedValue>,
    effective_format: Option<CellFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendedValue {
    number_value: Option<f64>,
    string_value: Option<String>,
    bool_value: Option<bool>,
    formula_value: Option<String>,
    error_value: Option<ErrorValue>,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellFormat {
    background_color_style: Option<ColorStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorStyle {
    rgb_color: Option<RgbColor>,
}

#[derive(Debug, Deserialize)]
struct RgbColor {
    #[serde(default)]
    red: f32,
    #[serde(default)]
    green: f32,
    #[serde(default)]
    blue: f32,
}

impl From<ExtendedValue> for CellValue {
    fn from(value: ExtendedValue) -> Self {
        if let Some(number) = value.number_value {
            CellValue::Number(number)
        } else if let Some(text) = value.string_value {
            CellValue::Text(text)
        } else if let Some(flag) = value.bool_value {
            CellValue::Bool(flag)
        } else if let Some(error) = value.error_value {
            CellValue::Error(error.kind.unwrap_or_default())
        } else if let Some(formula) = value.formula_value {
            CellValue::Text(formula)
        } else {
            CellValue::Empty
        }
    }
}

impl From<CellData> for Cell {
    fn from(data: CellData) -> Self {
        let background = data
            .effective_format
            .and_then(|format| format.background_color_style)
            .and_then(|style| style.rgb_color)
            .map(|rgb| Color {
                red: rgb.red,
                green: rgb.green,
                blue: rgb.blue,
            });
        Cell {
            value: data.effective_value.map(CellValue::from).unwrap_or_default(),
            background,
        }
    }
}

fn grid_from_response(
    response: SpreadsheetResponse,
    sheet_name: &str,
    range: &CellRange,
) -> Result<CellGrid> {
    let sheet = response
        .sheets
        .into_iter()
        .find(|sheet| sheet.properties.title == sheet_name)
        .ok_or_else(|| SheetError::SheetNotFound(sheet_name.to_owned()))?;

    let (start_row, start_column, rows): (usize, usize, Vec<Vec<Cell>>) = match sheet.data.into_iter().next() {
        Some(data) => (
            data.start_row,
            data.start_column,
            data.row_data
                .into_iter()
                .map(|row| row.values.into_iter().map(Cell::from).collect())
                .collect(),
        ),
        None => (range.start_row, range.start_column, vec![]),
    };
    Ok(CellGrid::new(
        sheet.properties.sheet_id,
        start_row,
        start_column,
        rows,
    ))
}

/// `None` when there is nothing to save.
fn batch_update_body(grid: &CellGrid) -> Option<Value> {
    let requests = grid
        .dirty_cells()
        .filter_map(|(row, column, cell)| {
            let color = cell.background?;
            Some(json!({
                "updateCells": {
                    "rows": [{
                        "values": [{
                            "userEnteredFormat": {
                                "backgroundColorStyle": {
                                    "rgbColor": {
                                        "red": color.red,
                                        "green": color.green,
                                        "blue": color.blue,
                                    }
                                }
                            }
                        }]
                    }],
                    "fields": BACKGROUND_FIELD,
                    "start": {
                        "sheetId": grid.sheet_id(),
                        "rowIndex": row,
                        "columnIndex": column,
                    }
                }
            }))
        })
        .collect::<Vec<_>>();
    if requests.is_empty() {
        None
    } else {
        Some(json!({ "requests": requests }))
    }
}
