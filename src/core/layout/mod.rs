//! Declarative field layouts
//!
//! A [`Layout`] is an ordered list of [`FieldSpec`]s. Rendering a record
//! applies each field's formatter, trims, zero-pads and truncates the value,
//! then joins the fields with a tab.
//!
//! ```
//! use order_export::core::layout::{FieldSpec, Layout, ValueFormatter};
//! use order_export::domain::Record;
//!
//! let layout = Layout::new(
//!     "example",
//!     vec![
//!         FieldSpec::new("Id").width(8).zero_pad(4),
//!         FieldSpec::new("Qty").formatter(ValueFormatter::Quantity),
//!     ],
//! );
//! let record = Record::new().with("Id", "7").with("Qty", "3.00");
//! assert_eq!(layout.render(&record), "0007\t3");
//! ```

pub mod catalog;
pub mod field;
pub mod formatters;

pub use catalog::{LayoutSet, LayoutVariant};
pub use field::{prepare_field, FieldSpec, Layout};
pub use formatters::{DateFormat, ValueFormatter, YearDisplay, DEFAULT_YEAR_PIVOT};
