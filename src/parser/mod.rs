//! Parser Module
//!
//! calamineを使用したワークブック解析のアダプター。
//! 対応形式（xls / xlsx / xlsm / xlsb / ods）の判別はcalamineに任せます。
//! calamineが公開しないセルの数値書式は、xlsx/xlsmに限り`styles`で直接読み込みます。

mod styles;
mod workbook;

pub(crate) use workbook::WorkbookParser;
