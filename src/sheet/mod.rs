//! Sheet addressing model: addresses, cells and ranges.
//!
//! Everything else in the crate depends on this module. It converts between
//! A1-style text (1-based rows, column letters, `$` markers, optional sheet
//! qualifier) and 0-based [`Cell`] values, and between inclusive text ranges
//! and half-open [`Range`] values.
//!
//! # Quick Start
//!
//! ```rust
//! use cellshift::sheet::{Cell, Range};
//!
//! let cell = Cell::parse("$B3", "Sheet1")?;
//! assert_eq!(cell.shift_if_rel(2, 2)?.to_address_rel("Sheet1"), "$B5");
//!
//! let range = Range::parse("Sheet2!A1:B2", "Sheet1")?;
//! assert_eq!(range.cells().count(), 4);
//! # Ok::<(), cellshift::Error>(())
//! ```

// Submodule declarations
pub mod address;
pub mod cell;
pub mod range;

// Re-exports
pub use address::{Address, column_to_letters, is_address, letters_to_column, needs_quoting};
pub use cell::{Cell, MAX_COLS, MAX_ROWS};
pub use range::Range;
