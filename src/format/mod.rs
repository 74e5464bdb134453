//! Format Module
//!
//! Excelの数値書式文字列（Number Format String）の構文解析と適用を提供します。

mod parser;
mod sections;
mod tokens;

pub(crate) use parser::{format_general, FormatParser};
