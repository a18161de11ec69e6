use std::fmt;

#[derive(Debug, PartialEq)]
pub enum ParseArrayError {
    Empty,
    InvalidNumber(usize, String),
}

impl std::error::Error for ParseArrayError {}

impl fmt::Display for ParseArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseArrayError::Empty => write!(f, "empty array cell"),
            ParseArrayError::InvalidNumber(slot, token) => write!(f, "slot {} is not a number: \"{}\"", slot, token),
        }
    }
}

/// A server index past the end of an array cell.
#[derive(Debug, PartialEq)]
pub struct InsufficientSlots {
    pub server_id: usize,
    pub slots: usize,
}

impl std::error::Error for InsufficientSlots {}

impl fmt::Display for InsufficientSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no slot for server {} (cell has {} slots)", self.server_id, self.slots)
    }
}

/// Parse an array cell holding one measurement per server.
/// Accepts `[1.0],[2.0]`, `[1.0,2.0]` and `[1.0, 2.0]`: tokens are comma separated and brackets are ignored.
pub fn parse_array(cell: &str) -> Result<Vec<f64>, ParseArrayError> {
    if cell.trim().is_empty() { return Err(ParseArrayError::Empty); }

    cell.split(',')
        .enumerate()
        .map(|(slot, token)| {
            let number = token.trim().trim_start_matches('[').trim_end_matches(']').trim();
            match fast_float::parse::<f64, _>(number) {
                Ok(value) => Ok(value),
                Err(_) => Err(ParseArrayError::InvalidNumber(slot, token.to_string())),
            }
        })
        .collect()
}

pub fn select_slot(values: &[f64], server_id: usize) -> Result<f64, InsufficientSlots> {
    values.get(server_id).copied().ok_or(InsufficientSlots { server_id, slots: values.len() })
}

/// Format a measurement so that whole numbers keep one fractional digit (`2.0`, not `2`).
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0. {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
