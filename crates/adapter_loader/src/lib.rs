//! # Adapter Loader (Layer A: Price Source)
//!
//! Turns the published market turnover tables into the single number the
//! forecast kernel needs: the average price per m² of a market segment.
//!
//! ```rust,no_run
//! use adapter_loader::{load_average_price, TableOptions};
//!
//! let price = load_average_price("data/Tabl_8.csv", TableOptions::default())?;
//! println!("Primary market average price per m²: {:.2} PLN", price);
//! # Ok::<(), adapter_loader::LoaderError>(())
//! ```

#![deny(missing_docs)]

pub mod error;
pub mod table;

pub use error::{LoaderError, LoaderResult};
pub use table::{
    load_average_price, MarketRow, MarketSegment, MarketTable, TableOptions, DEFAULT_SKIP_ROWS,
};
