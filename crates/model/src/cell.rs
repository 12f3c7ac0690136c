use serde::{Deserialize, Serialize};

/// Value of a single spreadsheet cell as the sheet reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(String),
}

impl CellValue {
    pub fn text<S: Into<String>>(text: S) -> CellValue {
        CellValue::Text(text.into())
    }

    /// No value at all. Blank text is still a value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty, blank text, zero, NaN or `false`.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Text(s) => s.is_empty(),
            CellValue::Bool(b) => !b,
            CellValue::Error(_) => false,
        }
    }

    pub fn is_numeric_or_text(&self) -> bool {
        matches!(self, CellValue::Number(_) | CellValue::Text(_))
    }

    /// Integer part of the value. Text is read up to the first non-digit.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) => {
                let n = n.trunc();
                if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
                    Some(n as i64)
                } else {
                    None
                }
            }
            CellValue::Text(s) => leading_int(s),
            _ => None,
        }
    }

    /// Float value. Text is read up to the first character that can't continue a number.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => leading_float(s),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_owned())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const RED: Color = Color {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
    };
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn digits_len(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_digit()).count()
}

pub fn leading_int(s: &str) -> Option<i64> {
    let (negative, rest) = split_sign(s.trim_start());
    let len = digits_len(rest);
    if len == 0 {
        return None;
    }
    let value = rest[..len].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

pub fn leading_float(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let (_, rest) = split_sign(trimmed);
    let sign_len = trimmed.len() - rest.len();

    let int_len = digits_len(rest);
    let mut end = int_len;
    let mut frac_len = 0;
    if rest[end..].starts_with('.') {
        frac_len = digits_len(&rest[end + 1..]);
        end += 1 + frac_len;
    }
    if int_len == 0 && frac_len == 0 {
        return None;
    }

    let exp = &rest[end..];
    if exp.starts_with('e') || exp.starts_with('E') {
        let (_, exp_digits) = split_sign(&exp[1..]);
        let exp_len = digits_len(exp_digits);
        if exp_len > 0 {
            end += exp.len() - exp_digits.len() + exp_len;
        }
    }

    let value = trimmed[..sign_len + end].parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
