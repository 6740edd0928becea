//! Market transaction tables.
//!
//! The source is the statistical office's yearly real-estate turnover
//! workbook, exported sheet by sheet to CSV. Each data row carries a category,
//! the number of properties sold, their total value in thousands of PLN and
//! their usable area in m². Sheets start with a few title rows, which are
//! skipped before parsing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{LoaderError, LoaderResult};

/// Title rows above the data in the published sheets.
pub const DEFAULT_SKIP_ROWS: usize = 4;

/// Market segment covered by a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MarketSegment {
    /// New dwellings sold by developers.
    Primary,
    /// Resales.
    Secondary,
}

impl MarketSegment {
    /// Sheet name of the segment in the published workbook.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            MarketSegment::Primary => "Tabl_8",
            MarketSegment::Secondary => "Tabl_10",
        }
    }
}

impl std::fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketSegment::Primary => write!(f, "primary"),
            MarketSegment::Secondary => write!(f, "secondary"),
        }
    }
}

impl std::str::FromStr for MarketSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(MarketSegment::Primary),
            "secondary" => Ok(MarketSegment::Secondary),
            other => Err(format!(
                "Unknown market segment: {}. Supported: primary, secondary",
                other
            )),
        }
    }
}

/// CSV layout of an exported sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOptions {
    /// Leading rows to discard.
    pub skip_rows: usize,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            skip_rows: DEFAULT_SKIP_ROWS,
            delimiter: b',',
        }
    }
}

/// One cleaned data row.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketRow {
    /// Row label.
    pub category: String,
    /// Number of properties, when reported.
    pub properties: Option<f64>,
    /// Total value in thousands of PLN.
    pub value_thousands_pln: f64,
    /// Usable area in m².
    pub usable_area_m2: f64,
}

/// A cleaned market table.
///
/// Rows whose value or area is missing or non-numeric are dropped; the
/// count of dropped rows is kept for reporting.
///
/// # Examples
///
/// ```rust
/// use adapter_loader::{MarketTable, TableOptions};
///
/// let csv = "Category,Count,Value,Area\n\
///            Flats,10,5000,600\n\
///            Houses,2,1500,250\n\
///            Footnote,,,\n";
/// let options = TableOptions { skip_rows: 1, ..TableOptions::default() };
/// let table = MarketTable::from_reader(csv.as_bytes(), options).unwrap();
///
/// assert_eq!(table.rows().len(), 2);
/// assert_eq!(table.dropped(), 1);
/// let avg = table.average_price_per_m2().unwrap();
/// assert!((avg - 6_500_000.0 / 850.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MarketTable {
    rows: Vec<MarketRow>,
    dropped: usize,
}

impl MarketTable {
    /// Parses and cleans a table from CSV.
    ///
    /// # Errors
    ///
    /// Returns `LoaderError::Csv` on malformed CSV.
    pub fn from_reader<R: Read>(reader: R, options: TableOptions) -> LoaderResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut dropped = 0;

        for record in csv_reader.records().skip(options.skip_rows) {
            let record = record?;
            match parse_row(&record) {
                Some(row) => rows.push(row),
                None => dropped += 1,
            }
        }

        debug!(kept = rows.len(), dropped, "market table cleaned");
        Ok(Self { rows, dropped })
    }

    /// Opens and parses a CSV file.
    ///
    /// # Errors
    ///
    /// Returns `LoaderError::Io` if the file cannot be opened, otherwise as
    /// [`from_reader`](Self::from_reader).
    pub fn from_path(path: impl AsRef<Path>, options: TableOptions) -> LoaderResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loading market table");
        Self::from_reader(file, options)
    }

    /// Returns the cleaned rows.
    #[inline]
    pub fn rows(&self) -> &[MarketRow] {
        &self.rows
    }

    /// Returns the number of rows dropped during cleaning.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Total value in PLN.
    pub fn total_value_pln(&self) -> f64 {
        self.rows.iter().map(|r| r.value_thousands_pln).sum::<f64>() * 1000.0
    }

    /// Total usable area in m².
    pub fn total_area_m2(&self) -> f64 {
        self.rows.iter().map(|r| r.usable_area_m2).sum()
    }

    /// Average price per m²: total value over total area.
    ///
    /// # Errors
    ///
    /// - `NoUsableRows` if cleaning left nothing
    /// - `NonPositiveArea` if the summed area is not positive
    pub fn average_price_per_m2(&self) -> LoaderResult<f64> {
        if self.rows.is_empty() {
            return Err(LoaderError::NoUsableRows {
                dropped: self.dropped,
            });
        }
        let area = self.total_area_m2();
        if area <= 0.0 {
            return Err(LoaderError::NonPositiveArea(area));
        }
        Ok(self.total_value_pln() / area)
    }
}

/// Loads a table and returns its average price per m².
///
/// # Errors
///
/// Any error of [`MarketTable::from_path`] or
/// [`MarketTable::average_price_per_m2`].
pub fn load_average_price(path: impl AsRef<Path>, options: TableOptions) -> LoaderResult<f64> {
    let table = MarketTable::from_path(path, options)?;
    let price = table.average_price_per_m2()?;
    info!(price, rows = table.rows().len(), "average price per m² computed");
    Ok(price)
}

fn parse_row(record: &csv::StringRecord) -> Option<MarketRow> {
    let value_thousands_pln = parse_number(record.get(2)?)?;
    let usable_area_m2 = parse_number(record.get(3)?)?;
    Some(MarketRow {
        category: record.get(0).unwrap_or_default().trim().to_string(),
        properties: record.get(1).and_then(parse_number),
        value_thousands_pln,
        usable_area_m2,
    })
}

/// Parses a spreadsheet number: tolerates spaces used as thousands separators
/// and a decimal comma. Placeholders such as `-` or `.` yield `None`.
fn parse_number(field: &str) -> Option<f64> {
    let cleaned: String = field
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
