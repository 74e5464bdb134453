//! xlsx2md - Batch converter from spreadsheet workbooks to Markdown pipe tables
//!
//! This crate reads Excel workbooks (XLS, XLSX, XLSM, XLSB and ODS), selects sheets
//! by index, and writes each selected sheet as a GitHub-flavored Markdown table
//! to `<input stem>_<sheet name>.md`.
//!
//! Numbers keep their cell number format (`0%`, `#,##0.00`, ...) when the workbook
//! stores one (XLSX/XLSM); other cells use a general notation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsx2md::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     // Convert every sheet of the workbook
//!     let report = converter.convert_file("example.xlsx", "all")?;
//!     for path in report.written_paths() {
//!         println!("wrote {}", path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsx2md::{ConverterBuilder, DateFormat, FormulaMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_align_columns(true) // pad cells to the column width
//!         .with_formula_mode(FormulaMode::Formula) // emit "=SUM(A1:A3)" instead of the result
//!         .with_date_format(DateFormat::Custom("%Y年%m月%d日".to_string()))
//!         .with_output_dir("out")
//!         .build()?;
//!
//!     // Sheets 0 and 2 of the first file, every sheet of the second
//!     let report = converter.convert_batch(&[("a.xlsx", "0,2"), ("b.xls", "all")]);
//!     for line in report.describe(xlsx2md::Locale::En) {
//!         println!("{}", line);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # In-memory Conversion
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use xlsx2md::ConverterBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = ConverterBuilder::new().build()?;
//! let excel_data: Vec<u8> = vec![]; // Your Excel file bytes
//! for (name, table) in converter.convert_reader(Cursor::new(excel_data), "all")? {
//!     if let Some(table) = table {
//!         println!("## {}\n\n{}", name, table.to_markdown());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod format;
mod grid;
mod messages;
mod parser;
mod renderer;
mod report;
mod scanner;
mod security;
mod selector;
mod table;
mod types;

// 公開API
pub use api::{DateFormat, FormulaMode};
pub use builder::{Converter, ConverterBuilder};
pub use error::{InputProblem, Xlsx2MdError};
pub use grid::{SheetGrid, SheetRow};
pub use messages::{Locale, MessageCode};
pub use renderer::CellRenderer;
pub use report::{BatchEntry, BatchReport, FileReport, SheetOutcome, SheetReport};
pub use scanner::{SheetDimensions, SheetScanner};
pub use security::{is_supported_extension, SUPPORTED_EXTENSIONS};
pub use selector::{resolve as resolve_sheets, SheetSelection};
pub use table::{MarkdownTable, TableBuilder};
pub use types::{CellCoord, CellValue, RawCellData};
