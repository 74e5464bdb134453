//! Scanner Module
//!
//! シートの占有領域（内容のある行と各列の最大表示幅）を求めるモジュール。

use std::collections::BTreeSet;

use unicode_width::UnicodeWidthStr;

use crate::grid::SheetGrid;
use crate::renderer::CellRenderer;

/// シートの占有領域
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetDimensions {
    /// 列ごとの最大表示幅
    ///
    /// 最後の非ゼロ列より右側は切り捨て済み。すべての列が空の場合は空。
    pub column_widths: Vec<usize>,

    /// 内容のある行のインデックス（昇順）
    pub occupied_rows: BTreeSet<u32>,
}

impl SheetDimensions {
    /// ヘッダー行（最初の占有行）
    pub fn header_row(&self) -> Option<u32> {
        self.occupied_rows.first().copied()
    }

    /// 占有行が1つもないか
    pub fn is_empty(&self) -> bool {
        self.occupied_rows.is_empty()
    }

    /// 出力される列数
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }
}

/// シートスキャナー
pub struct SheetScanner;

impl SheetScanner {
    /// シートを走査して占有領域を求める
    ///
    /// # アルゴリズム
    ///
    /// 1. 行0から最終行まで走査し、欠落した行は飛ばす
    /// 2. 各行について列0から行の最終列まで（最終列を含む）セルを描画する
    /// 3. 描画結果が空でないセルがあれば、その行を占有行とし、列の最大幅を更新する
    /// 4. 最後の非ゼロ列より右側の列を切り捨てる
    ///
    /// 表示幅は`unicode-width`で計算します（全角文字は2）。ゼロ幅文字だけのセルは
    /// 幅1として数えるため、その列が切り捨てられることはありません。
    pub fn scan(grid: &SheetGrid, renderer: &CellRenderer) -> SheetDimensions {
        let mut column_widths: Vec<usize> = Vec::new();
        let mut occupied_rows = BTreeSet::new();

        let Some(last_row) = grid.last_row_index() else {
            return SheetDimensions::default();
        };

        for row_idx in 0..=last_row {
            let Some(row) = grid.row(row_idx) else {
                continue;
            };

            for col_idx in 0..=row.last_column_index() {
                let text = renderer.render(Some(row), col_idx);
                let col = col_idx as usize;
                if col >= column_widths.len() {
                    column_widths.resize(col + 1, 0);
                }

                if text.is_empty() {
                    continue;
                }

                // 表示幅0の文字だけのセルも列を占有する
                let width = text.width().max(1);
                occupied_rows.insert(row_idx);
                if width > column_widths[col] {
                    column_widths[col] = width;
                }
            }
        }

        // 末尾の空列を切り捨てる
        let used_columns = column_widths
            .iter()
            .rposition(|&width| width > 0)
            .map_or(0, |idx| idx + 1);
        column_widths.truncate(used_columns);

        tracing::debug!(
            sheet = grid.name(),
            occupied_rows = occupied_rows.len(),
            columns = column_widths.len(),
            "scanned sheet"
        );

        SheetDimensions {
            column_widths,
            occupied_rows,
        }
    }
}
