//! Built-in header and line layouts
//!
//! `standard` is the fixed-width set consumed by the ERP order import.
//! `extended` adds every column the order intake accepts; shared columns
//! keep their standard widths so the two stay aligned for downstream
//! readers.

use super::field::{FieldSpec, Layout};
use super::formatters::{DateFormat, ValueFormatter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header column holding the import set id
pub const HEADER_ID_COLUMN: &str = "Import_Set_No";

/// Line column holding the import set id
pub const LINE_ID_COLUMN: &str = "Import_Set_Number";

/// Line column holding the line number
pub const LINE_NUMBER_COLUMN: &str = "Line_No";

/// Width of the rendered import set id
const ID_WIDTH: usize = 8;

/// Zero-pad length of the rendered import set id
const ID_PAD: usize = 4;

/// Which built-in field set to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    /// 15 header fields, 9 line fields
    #[default]
    Standard,
    /// Full order-intake field set
    Extended,
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutVariant::Standard => write!(f, "standard"),
            LayoutVariant::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for LayoutVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(LayoutVariant::Standard),
            "extended" => Ok(LayoutVariant::Extended),
            _ => Err(format!(
                "Invalid layout variant '{s}'. Must be one of: standard, extended"
            )),
        }
    }
}

/// Header and line layouts used together for one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSet {
    /// Header file layout
    pub header: Layout,
    /// Line file layout
    pub line: Layout,
}

impl LayoutSet {
    /// Builds the layouts for a variant with independent header/line date modes
    pub fn new(variant: LayoutVariant, header_dates: DateFormat, line_dates: DateFormat) -> Self {
        match variant {
            LayoutVariant::Standard => Self {
                header: standard_header(header_dates),
                line: standard_line(line_dates),
            },
            LayoutVariant::Extended => Self {
                header: extended_header(header_dates),
                line: extended_line(line_dates),
            },
        }
    }

    /// Points the id and line-number fields at differently named columns
    pub fn with_key_columns(self, header_id: &str, line_id: &str, line_number: &str) -> Self {
        Self {
            header: self.header.rename_column(HEADER_ID_COLUMN, header_id),
            line: self
                .line
                .rename_column(LINE_ID_COLUMN, line_id)
                .rename_column(LINE_NUMBER_COLUMN, line_number),
        }
    }

    /// Standard layouts with `MM/DD/YY` dates
    pub fn standard() -> Self {
        Self::new(
            LayoutVariant::Standard,
            DateFormat::two_digit_year(),
            DateFormat::two_digit_year(),
        )
    }
}

fn date(key: &'static str, width: usize, format: DateFormat) -> FieldSpec {
    FieldSpec::new(key)
        .width(width)
        .formatter(ValueFormatter::Date(format))
}

fn text(key: &'static str, width: usize) -> FieldSpec {
    FieldSpec::new(key).width(width)
}

fn flag(key: &'static str) -> FieldSpec {
    FieldSpec::new(key).width(1)
}

fn price(key: &'static str, width: usize) -> FieldSpec {
    FieldSpec::new(key)
        .width(width)
        .formatter(ValueFormatter::Price)
}

/// Numeric ids stored as decimals (`100.00`) render as integers
fn numeric_id(key: &'static str) -> FieldSpec {
    FieldSpec::new(key)
        .width(18)
        .formatter(ValueFormatter::Quantity)
}

/// Standard header layout
pub fn standard_header(dates: DateFormat) -> Layout {
    Layout::new(
        "standard_header",
        vec![
            FieldSpec::new(HEADER_ID_COLUMN).width(ID_WIDTH).zero_pad(ID_PAD),
            text("Customer_ID", 16),
            text("Customer_Name", 16),
            text("Customer_PO_Number", 24),
            text("Taker", 16),
            date("Order_Date", 40, dates),
            text("Ship_To_ID", 7),
            text("Ship_To_Name", 17),
            text("Ship_To_Address_1", 24),
            text("Ship_To_City", 16),
            text("Ship_To_State", 8),
            text("Ship_To_Zip_Code", 8),
            text("Ship_To_Country", 55),
            text("Terms_Desc", 113),
            text("Contract_Number", 6),
        ],
    )
}

/// Standard line layout
pub fn standard_line(dates: DateFormat) -> Layout {
    Layout::new(
        "standard_line",
        vec![
            FieldSpec::new(LINE_ID_COLUMN).width(ID_WIDTH).zero_pad(ID_PAD),
            text(LINE_NUMBER_COLUMN, 8),
            text("Item_ID", 16),
            FieldSpec::new("Unit_Quantity")
                .width(8)
                .formatter(ValueFormatter::Quantity),
            text("Unit_of_Measure", 8),
            price("Unit_Price", 9),
            text("Extended_Description", 55),
            date("Required_Date", 15, dates),
            text("Pricing_Unit", 2),
        ],
    )
}

/// Extended header layout
pub fn extended_header(dates: DateFormat) -> Layout {
    Layout::new(
        "extended_header",
        vec![
            FieldSpec::new(HEADER_ID_COLUMN).width(ID_WIDTH).zero_pad(ID_PAD),
            text("Customer_ID", 16),
            text("Customer_Name", 16),
            numeric_id("Company_ID").width(8),
            numeric_id("Sales_Location_ID"),
            text("Customer_PO_Number", 24),
            text("Contact_ID", 16),
            text("Contact_Name", 50),
            text("Taker", 16),
            text("Job_Name", 40),
            date("Order_Date", 40, dates),
            date("Requested_Date", 40, dates),
            flag("Quote"),
            flag("Approved"),
            text("Ship_To_ID", 7),
            text("Ship_To_Name", 17),
            text("Ship_To_Address_1", 24),
            text("Ship_To_Address_2", 50),
            text("Ship_To_City", 16),
            text("Ship_To_State", 8),
            text("Ship_To_Zip_Code", 8),
            text("Ship_To_Country", 55),
            numeric_id("Source_Location_ID"),
            numeric_id("Carrier_ID"),
            text("Carrier_Name", 50),
            text("Route", 255),
            text("Packing_Basis", 16),
            text("Delivery_Instructions", 255),
            text("Terms", 2),
            text("Terms_Desc", 113),
            flag("Will_Call"),
            text("Class_1", 8),
            text("Class_2", 8),
            text("Class_3", 8),
            text("Class_4", 8),
            text("Class_5", 8),
            flag("RMA_Flag"),
            text("Freight_Code", 30),
            text("Third_Party_Billing_Flag_Desc", 40),
            flag("Capture_Usage_Default"),
            flag("Allocate"),
            text("Contract_Number", 6),
            text("Invoice_Batch_Number", 255),
            text("Ship_To_Email_Address", 255),
            text("Set_Invoice_Exchange_Rate_Source_Desc", 40),
            text("Ship_To_Phone", 20),
            text("Currency_ID", 255),
            flag("Apply_Builder_Allowance_Flag"),
            date("Quote_Expiration_Date", 40, dates),
            date("Promise_Date", 40, dates),
        ],
    )
}

/// Extended line layout
pub fn extended_line(dates: DateFormat) -> Layout {
    Layout::new(
        "extended_line",
        vec![
            FieldSpec::new(LINE_ID_COLUMN).width(ID_WIDTH).zero_pad(ID_PAD),
            text(LINE_NUMBER_COLUMN, 8),
            text("Item_ID", 16),
            FieldSpec::new("Unit_Quantity")
                .width(8)
                .formatter(ValueFormatter::Quantity),
            text("Unit_of_Measure", 8),
            price("Unit_Price", 9),
            text("Extended_Description", 55),
            numeric_id("Source_Location_ID"),
            numeric_id("Ship_Location_ID"),
            text("Product_Group_ID", 8),
            numeric_id("Supplier_ID"),
            text("Supplier_Name", 50),
            date("Required_Date", 15, dates),
            date("Expedite_Date", 15, dates),
            flag("Will_Call"),
            flag("Tax_Item"),
            flag("OK_to_Interchange"),
            text("Pricing_Unit", 2),
            price("Commission_Cost", 9),
            price("Other_Cost", 9),
            price("PO_Cost", 9),
            flag("Disposition"),
            flag("Scheduled"),
            flag("Manual_Price_Override"),
            flag("Commission_Cost_Edited"),
            flag("Other_Cost_Edited"),
            flag("Capture_Usage"),
            text("Tag_and_Hold_Class_ID", 8),
            text("Contract_Bin_ID", 8),
            text("Contract_No", 8),
            FieldSpec::new("Allocation_Qty")
                .width(8)
                .formatter(ValueFormatter::Quantity),
            date("Promise_Date", 15, dates),
        ],
    )
}
