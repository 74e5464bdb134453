//! Workbook Parser Module
//!
//! calamineのワークブックをラップし、シートを疎な`SheetGrid`として読み込みます。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::collections::HashMap;
use std::io::{Cursor, Read};

use crate::api::FormulaMode;
use crate::error::Xlsx2MdError;
use crate::grid::SheetGrid;
use crate::security::SecurityConfig;
use crate::types::{CellCoord, CellValue, RawCellData};

use super::styles::XlsxStyles;

/// ZIPローカルファイルヘッダーのシグネチャ（xlsx/xlsm/ods）
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// ワークブックパーサー
///
/// 1つの入力ファイルの変換中だけ生存します。calamineのリーダーは`&mut self`を
/// 要求するため、複数スレッドから同じインスタンスを共有しないでください。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（形式は自動判別）
    workbook: Sheets<Cursor<Vec<u8>>>,

    /// シート名（ワークブック内の順序）
    sheet_names: Vec<String>,

    /// セルの数値書式（xlsx/xlsmのみ。読めない場合は`None`）
    styles: Option<XlsxStyles>,
}

impl WorkbookParser {
    /// リーダーからワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックのバイト列を読み込むリーダー
    /// * `security` - 入力サイズ上限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(Xlsx2MdError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(Xlsx2MdError::Parse)` - ワークブックとして解析できない場合
    pub fn open<R: Read>(reader: R, security: &SecurityConfig) -> Result<Self, Xlsx2MdError> {
        let buffer = security.read_limited(reader)?;
        Self::from_bytes(buffer, security)
    }

    /// メモリ上のバイト列からワークブックを開く
    ///
    /// xlsx/xlsmではセルの数値書式も読み込みます。書式を読めなくても
    /// 警告を出して変換は継続し、数値は一般表記になります。
    pub fn from_bytes(buffer: Vec<u8>, security: &SecurityConfig) -> Result<Self, Xlsx2MdError> {
        // calamineはリーダーを所有するため、書式の読み込み用に別途保持する
        let archive = buffer.starts_with(ZIP_SIGNATURE).then(|| buffer.clone());
        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        let sheet_names = workbook.sheet_names();

        let styles = match (&workbook, archive) {
            (Sheets::Xlsx(_), Some(archive)) => match XlsxStyles::open(archive, security) {
                Ok(styles) => Some(styles),
                Err(e) => {
                    tracing::warn!(error = %e, "cell number formats unavailable");
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            workbook,
            sheet_names,
            styles,
        })
    }

    /// シート数
    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    /// インデックスからシート名を取得
    pub fn sheet_name(&self, index: usize) -> Option<&str> {
        self.sheet_names.get(index).map(String::as_str)
    }

    /// すべてのシート名
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// シートを読み込む
    ///
    /// # 引数
    ///
    /// * `index` - シートインデックス（0始まり）
    /// * `formula_mode` - `Formula`の場合のみ数式も読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetGrid)` - 空でない値を持つセルのみを含むシート
    /// * `Err(Xlsx2MdError)` - インデックスが範囲外、またはシートの解析に失敗した場合
    pub fn load_sheet(
        &mut self,
        index: usize,
        formula_mode: FormulaMode,
    ) -> Result<SheetGrid, Xlsx2MdError> {
        let name = self
            .sheet_names
            .get(index)
            .cloned()
            .ok_or_else(|| {
                Xlsx2MdError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    self.sheet_names.len()
                ))
            })?;

        // 1. 値の範囲
        let range = self.workbook.worksheet_range(&name)?;

        // 2. 数式の範囲（数式モードのときだけ取得する。全セル分を1回で読む）
        let formulas = if formula_mode == FormulaMode::Formula {
            match self.workbook.worksheet_formula(&name) {
                Ok(formulas) => Some(formulas),
                Err(e) => {
                    tracing::warn!(sheet = %name, error = %e, "formulas unavailable, using values");
                    None
                }
            }
        } else {
            None
        };

        // 3. 数値書式
        let cell_formats = match self.styles.as_mut() {
            Some(styles) => styles.cell_formats(&name).unwrap_or_else(|e| {
                tracing::warn!(sheet = %name, error = %e, "cell number formats unavailable");
                HashMap::new()
            }),
            None => HashMap::new(),
        };

        Ok(build_grid(name, &range, formulas.as_ref(), &cell_formats))
    }
}

/// calamineの範囲から疎なシートを構築
///
/// 座標は範囲の開始位置を加算した絶対位置になります。数値書式は数値セルにだけ付けます。
fn build_grid(
    name: String,
    range: &Range<Data>,
    formulas: Option<&Range<String>>,
    cell_formats: &HashMap<CellCoord, String>,
) -> SheetGrid {
    let mut grid = SheetGrid::new(name);

    if let Some((start_row, start_col)) = range.start() {
        for (row, col, data) in range.used_cells() {
            let coord = CellCoord::new(start_row + row as u32, start_col + col as u32);
            let value = convert_value(data);
            let is_numeric = matches!(value, CellValue::Int(_) | CellValue::Number(_));
            let mut cell = RawCellData::new(coord, value);
            if let Some(format) = cell_formats.get(&coord).filter(|_| is_numeric) {
                cell = cell.with_format(format.as_str());
            }
            grid.insert(cell);
        }
    }

    if let Some(formulas) = formulas {
        if let Some((start_row, start_col)) = formulas.start() {
            for (row, col, formula) in formulas.used_cells() {
                let coord = CellCoord::new(start_row + row as u32, start_col + col as u32);
                let cell = match grid.cell(coord) {
                    Some(existing) => existing.clone().with_formula(formula.as_str()),
                    None => {
                        // 計算結果が保存されていない数式セル
                        tracing::trace!(row = coord.row, col = coord.col, "formula without cached value");
                        RawCellData::new(coord, CellValue::Empty).with_formula(formula.as_str())
                    }
                };
                grid.insert(cell);
            }
        }
    }

    grid
}

/// calamineのセル値を変換
fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let converted = if dt.is_duration() {
                dt.as_duration().map(CellValue::Duration)
            } else {
                dt.as_datetime().map(CellValue::DateTime)
            };
            // 範囲外のシリアル値は数値のまま出力
            converted.unwrap_or(CellValue::Number(dt.as_f64()))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Iso(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
        #[allow(unreachable_patterns)]
        _ => CellValue::Empty,
    }
}
