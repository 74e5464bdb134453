//! Grid Module
//!
//! 疎なシート構造（行・セルの「欠落」と「空白」を区別する）を提供するモジュール。
//! 欠落した行やセルを既定値で埋めることはせず、すべて`Option`で返します。

use std::collections::BTreeMap;

use crate::types::{CellCoord, CellValue, RawCellData};

/// シートの1行
///
/// 存在するセルのみを列インデックス順に保持します。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: BTreeMap<u32, RawCellData>,
}

impl SheetRow {
    /// 最後のセルの列インデックス
    ///
    /// 行が存在する限りセルが1つ以上あるため、空の行は`0`を返します。
    pub fn last_column_index(&self) -> u32 {
        self.cells.keys().next_back().copied().unwrap_or(0)
    }

    /// 指定された列のセルを取得（欠落している場合は`None`）
    pub fn cell(&self, col: u32) -> Option<&RawCellData> {
        self.cells.get(&col)
    }

    /// 存在するセルの数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// セルを1つも持たないか
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// 疎なシート構造
///
/// 行インデックスと列インデックスはシート上の絶対位置（0始まり）です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    /// シート名
    name: String,

    /// 存在する行（行インデックス順）
    rows: BTreeMap<u32, SheetRow>,
}

impl SheetGrid {
    /// 空のシートを生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// セル群からシートを構築
    ///
    /// 同じ座標のセルが複数ある場合は後のものが優先されます。
    pub fn from_cells<I>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = RawCellData>,
    {
        let mut grid = Self::new(name);
        for cell in cells {
            grid.insert(cell);
        }
        grid
    }

    /// 文字列の2次元配列からシートを構築
    ///
    /// 空文字列のセルは欠落として扱い、セルを1つも持たない行は存在しない行になります。
    pub fn from_rows<R, C, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = rows.into_iter().enumerate().flat_map(|(row_idx, row)| {
            row.into_iter()
                .enumerate()
                .filter_map(move |(col_idx, text)| {
                    let text: String = text.into();
                    if text.is_empty() {
                        return None;
                    }
                    let coord = CellCoord::new(row_idx as u32, col_idx as u32);
                    Some(RawCellData::new(coord, CellValue::String(text)))
                })
        });
        Self::from_cells(name, cells)
    }

    /// セルを追加
    pub fn insert(&mut self, cell: RawCellData) {
        self.rows
            .entry(cell.coord.row)
            .or_default()
            .cells
            .insert(cell.coord.col, cell);
    }

    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 最後の行インデックス（行が1つもない場合は`None`）
    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// 指定された行を取得（欠落している場合は`None`）
    pub fn row(&self, row: u32) -> Option<&SheetRow> {
        self.rows.get(&row)
    }

    /// 指定された座標のセルを取得
    pub fn cell(&self, coord: CellCoord) -> Option<&RawCellData> {
        self.row(coord.row).and_then(|row| row.cell(coord.col))
    }

    /// 存在するセルの総数
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(SheetRow::len).sum()
    }
}
