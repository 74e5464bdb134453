//! Renderer Module
//!
//! セル1つをMarkdownテーブル用の正規化テキストに変換するモジュール。
//! 列幅の計測（`SheetScanner`）と行の出力（`TableBuilder`）の両方が
//! 同じ`CellRenderer::render`を使うため、計測した幅と出力内容は常に一致します。

use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use crate::api::{DateFormat, FormulaMode};
use crate::format::{format_general, FormatParser};
use crate::grid::SheetRow;
use crate::types::{CellValue, RawCellData};

/// セルレンダラー
///
/// 変換ごとの設定を値として保持し、グローバルな状態は持ちません。
#[derive(Debug, Clone, Default)]
pub struct CellRenderer {
    /// 数式出力モード
    formula_mode: FormulaMode,

    /// 日付フォーマッター
    date_formatter: DateFormatter,

    /// 数値フォーマッター
    number_formatter: NumberFormatter,
}

impl CellRenderer {
    /// 新しいCellRendererインスタンスを生成
    pub fn new(formula_mode: FormulaMode, date_format: DateFormat) -> Self {
        Self {
            formula_mode,
            date_formatter: DateFormatter::new(date_format),
            number_formatter: NumberFormatter,
        }
    }

    /// 行内の指定列のセルを描画する
    ///
    /// 欠落した行・セルは空白セルとして扱い、空文字列を返します。失敗はしません。
    ///
    /// # 処理順序
    ///
    /// 1. セルの取得（欠落は空白扱い）
    /// 2. 数式モードの適用
    /// 3. 値の表示形式への変換（数値はセルの数値書式を適用）
    /// 4. 改行の除去
    /// 5. `|`のエスケープ
    pub fn render(&self, row: Option<&SheetRow>, col: u32) -> String {
        match row.and_then(|row| row.cell(col)) {
            Some(cell) => self.render_cell(cell),
            None => String::new(),
        }
    }

    /// セルを描画する
    pub fn render_cell(&self, cell: &RawCellData) -> String {
        let text = self.display_text(cell);
        escape_pipes(&strip_line_breaks(&text))
    }

    /// 値を表示用テキストに変換（エスケープ前）
    fn display_text(&self, cell: &RawCellData) -> String {
        if self.formula_mode == FormulaMode::Formula {
            if let Some(ref formula) = cell.formula {
                return if formula.starts_with('=') {
                    formula.clone()
                } else {
                    format!("={}", formula)
                };
            }
        }

        let format_string = cell.format_string.as_deref();
        match &cell.value {
            CellValue::Int(i) => match format_string {
                Some(_) => self.number_formatter.format(*i as f64, format_string),
                None => i.to_string(),
            },
            CellValue::Number(n) => self.number_formatter.format(*n, format_string),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => self.date_formatter.format(dt),
            CellValue::Duration(d) => format_duration(*d),
            CellValue::Iso(s) => s.clone(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 改行（`\r\n`、`\n`、`\r`）を除去して1行にする
pub(crate) fn strip_line_breaks(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// `|`を`\|`にエスケープする
pub(crate) fn escape_pipes(s: &str) -> String {
    s.replace('|', "\\|")
}

/// 経過時間を`[h]:mm:ss`形式に変換
fn format_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// 日付フォーマッター
///
/// 解決済みの日時を`DateFormat`に従って文字列に変換します。
#[derive(Debug, Clone, Default)]
pub(crate) struct DateFormatter {
    format: DateFormat,
}

impl DateFormatter {
    pub fn new(format: DateFormat) -> Self {
        Self { format }
    }

    /// 日時をフォーマット
    ///
    /// `Iso8601`では時刻部分が0のとき日付のみを出力します。
    /// `Custom`の書式指定子が不正な場合はISO 8601にフォールバックします。
    pub fn format(&self, value: &NaiveDateTime) -> String {
        match &self.format {
            DateFormat::Iso8601 => Self::format_iso(value),
            DateFormat::Custom(format_str) => {
                let mut result = String::new();
                match write!(result, "{}", value.format(format_str)) {
                    Ok(()) => result,
                    Err(_) => {
                        tracing::debug!(format = %format_str, "invalid date format, using ISO 8601");
                        Self::format_iso(value)
                    }
                }
            }
        }
    }

    fn format_iso(value: &NaiveDateTime) -> String {
        if value.time().num_seconds_from_midnight() == 0 {
            value.format("%Y-%m-%d").to_string()
        } else {
            value.format("%Y-%m-%d %H:%M:%S").to_string()
        }
    }
}

/// 数値フォーマッター
///
/// セルの数値書式（例: "0%", "#,##0.00"）を適用します。書式がない場合や
/// 数値として適用できない書式（日付、分数など）は、Excelの「標準」に近い
/// 一般表記（`1.0` → `1`）で出力します。
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    pub fn format(&self, value: f64, format_string: Option<&str>) -> String {
        let Some(format_str) = format_string else {
            return format_general(value);
        };

        match FormatParser::parse(format_str) {
            Ok(parser) => parser
                .format_number(value)
                .unwrap_or_else(|| format_general(value)),
            Err(e) => {
                tracing::debug!(format = %format_str, error = %e, "unusable number format");
                format_general(value)
            }
        }
    }
}
