//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 日付の出力形式
///
/// 日付セルをMarkdownに変換する際の出力形式を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD）
    ///
    /// 時刻部分がある場合は`YYYY-MM-DD HH:MM:SS`になります。
    ///
    /// 例: `2025-11-20`、`2025-11-20 09:30:00`
    #[default]
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # フォーマット指定子（主要なもの）
    ///
    /// - `%Y`: 4桁の年（例: 2025）
    /// - `%m`: 2桁の月（01-12）
    /// - `%d`: 2桁の日（01-31）
    /// - `%H`: 24時間形式の時（00-23）
    /// - `%M`: 分（00-59）
    /// - `%S`: 秒（00-59）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsx2md::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), xlsx2md::Xlsx2MdError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%Y/%m/%d".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// 数式セルの出力モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum FormulaMode {
    /// 計算結果の値を出力（デフォルト）
    ///
    /// ワークブックに保存された計算結果を表示形式に変換して出力します。
    /// 例: `=SUM(A1:A10)` → `100`
    #[default]
    CachedValue,

    /// 数式文字列を出力
    ///
    /// 例: `=SUM(A1:A10)` → `=SUM(A1:A10)`
    Formula,
}
