//! CSV profile loader
//!
//! Profiles are plain comma-separated text with a header row. Two columns
//! are required, in any order:
//!
//! ```text
//! time_ms,voltage
//! 1000,20
//! 2500,45.5
//! ```
//!
//! Other columns are ignored. Blank lines and whitespace around fields are
//! skipped. Unparsable and non-finite numbers are errors; negative times
//! are passed on and clamped by the core.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use variac_core::{Profile, Step};

/// Step duration column (milliseconds)
pub const TIME_COLUMN: &str = "time_ms";

/// Target voltage column (volts)
pub const VOLTAGE_COLUMN: &str = "voltage";

#[derive(Debug, thiserror::Error)]
pub enum ProfileLoadError {
    #[error("failed to read profile {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("profile has no header row")]
    MissingHeader,
    #[error("missing `{0}` column")]
    MissingColumn(&'static str),
    #[error("line {line}: missing `{column}` field")]
    MissingField { line: usize, column: &'static str },
    #[error("line {line}: invalid `{column}` value `{value}`")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Column positions found in the header
#[derive(Debug, Clone, Copy)]
struct Columns {
    time: usize,
    voltage: usize,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, ProfileLoadError> {
        let names: Vec<&str> = split_fields(header).collect();
        let find = |column: &'static str| {
            names
                .iter()
                .position(|name| *name == column)
                .ok_or(ProfileLoadError::MissingColumn(column))
        };

        Ok(Self {
            time: find(TIME_COLUMN)?,
            voltage: find(VOLTAGE_COLUMN)?,
        })
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|field| field.trim().trim_matches('"'))
}

fn field<'a>(
    fields: &[&'a str],
    index: usize,
    line: usize,
    column: &'static str,
) -> Result<&'a str, ProfileLoadError> {
    fields
        .get(index)
        .copied()
        .filter(|value| !value.is_empty())
        .ok_or(ProfileLoadError::MissingField { line, column })
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    line: usize,
    column: &'static str,
    finite: impl Fn(&T) -> bool,
) -> Result<T, ProfileLoadError> {
    value
        .parse::<T>()
        .ok()
        .filter(|number| finite(number))
        .ok_or_else(|| ProfileLoadError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}

/// Parse CSV text into a profile
pub fn parse_profile(text: &str) -> Result<Profile, ProfileLoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header) = lines.next().ok_or(ProfileLoadError::MissingHeader)?;
    let columns = Columns::from_header(header)?;

    let mut steps = Vec::new();
    for (line, row) in lines {
        let fields: Vec<&str> = split_fields(row).collect();
        let time = field(&fields, columns.time, line, TIME_COLUMN)?;
        let voltage = field(&fields, columns.voltage, line, VOLTAGE_COLUMN)?;

        let time_ms = parse_number::<f64>(time, line, TIME_COLUMN, |v| v.is_finite())?;
        let volts = parse_number::<f32>(voltage, line, VOLTAGE_COLUMN, |v| v.is_finite())?;
        steps.push(Step::from_millis(time_ms, volts));
    }

    debug!("Parsed {} profile steps", steps.len());
    Ok(Profile::new(steps))
}

/// Load a profile from a CSV file, labelled with the file stem
pub fn load_profile(path: &Path) -> Result<Profile, ProfileLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProfileLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let profile = parse_profile(&text)?;

    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    Ok(profile.with_label(&label))
}
