//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 整数
    Int(i64),

    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日付・日時（Excelシリアル値から解決済み）
    DateTime(chrono::NaiveDateTime),

    /// 経過時間
    Duration(chrono::Duration),

    /// ISO 8601形式の日付・時間文字列（ODSなど）
    Iso(String),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// パーサーから抽出された生のセルデータ
#[derive(Debug, Clone, PartialEq)]
pub struct RawCellData {
    /// セル座標
    pub coord: CellCoord,

    /// セルの値（数式セルの場合は計算結果）
    pub value: CellValue,

    /// 数式（数式セルの場合、先頭の`=`を含まない形で保持）
    pub formula: Option<String>,

    /// 数値書式文字列（例: "0%", "#,##0.00"）
    ///
    /// スタイル情報を読めない形式（xls、odsなど）では`None`です。
    pub format_string: Option<String>,
}

impl RawCellData {
    /// 数式を持たないセルを生成
    pub fn new(coord: CellCoord, value: CellValue) -> Self {
        Self {
            coord,
            value,
            formula: None,
            format_string: None,
        }
    }

    /// 数式を設定する
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// 数値書式を設定する
    pub fn with_format(mut self, format_string: impl Into<String>) -> Self {
        self.format_string = Some(format_string.into());
        self
    }
}
