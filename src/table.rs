//! Table Module
//!
//! 占有領域とシートからMarkdownテーブルの各行を組み立てるモジュール。

use std::io::Write;

use unicode_width::UnicodeWidthStr;

use crate::error::Xlsx2MdError;
use crate::grid::{SheetGrid, SheetRow};
use crate::renderer::CellRenderer;
use crate::scanner::SheetDimensions;

/// Markdownテーブル
///
/// ヘッダー行1行、区切り行1行、0行以上の本体行からなります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownTable {
    /// ヘッダー行
    pub header: String,

    /// 区切り行
    pub separator: String,

    /// 本体行
    pub body: Vec<String>,
}

impl MarkdownTable {
    /// すべての行を順に返す
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.header.as_str())
            .chain(std::iter::once(self.separator.as_str()))
            .chain(self.body.iter().map(String::as_str))
    }

    /// 行数（ヘッダーと区切り行を含む）
    pub fn line_count(&self) -> usize {
        self.body.len() + 2
    }

    /// 列数
    pub fn column_count(&self) -> usize {
        self.separator.matches('|').count().saturating_sub(1)
    }

    /// 改行区切りの文字列に変換（各行の末尾に改行）
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        for line in self.lines() {
            output.push_str(line);
            output.push('\n');
        }
        output
    }

    /// ライターに出力
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), Xlsx2MdError> {
        for line in self.lines() {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// テーブルビルダー
pub struct TableBuilder<'a> {
    renderer: &'a CellRenderer,
    align_columns: bool,
}

impl<'a> TableBuilder<'a> {
    /// 新しいビルダーを生成
    ///
    /// * `align_columns` - `true`の場合、各セルを列幅まで空白で埋める
    pub fn new(renderer: &'a CellRenderer, align_columns: bool) -> Self {
        Self {
            renderer,
            align_columns,
        }
    }

    /// Markdownテーブルを組み立てる
    ///
    /// 占有行がない場合（ヘッダー行が存在しない場合）は`None`を返します。
    pub fn build(&self, grid: &SheetGrid, dims: &SheetDimensions) -> Option<MarkdownTable> {
        let header_idx = dims.header_row()?;

        // 1. ヘッダー行と区切り行
        let header_cells = self.row_cells(grid.row(header_idx), &dims.column_widths);
        let separator = Self::separator(&header_cells);
        let header = Self::join(&header_cells);

        // 2. ヘッダー行より後の占有行
        let body = dims
            .occupied_rows
            .range(header_idx + 1..)
            .map(|&row_idx| Self::join(&self.row_cells(grid.row(row_idx), &dims.column_widths)))
            .collect();

        Some(MarkdownTable {
            header,
            separator,
            body,
        })
    }

    /// 行の各セルを描画（必要なら列幅まで空白で埋める）
    fn row_cells(&self, row: Option<&SheetRow>, column_widths: &[usize]) -> Vec<String> {
        column_widths
            .iter()
            .enumerate()
            .map(|(col_idx, &width)| {
                let content = self.renderer.render(row, col_idx as u32);
                if self.align_columns {
                    pad(content, width)
                } else {
                    content
                }
            })
            .collect()
    }

    /// 区切り行を生成
    ///
    /// 各列のハイフン数はヘッダーセルの表示幅 + 2（前後の空白分）。
    fn separator(header_cells: &[String]) -> String {
        let mut line = String::from("|");
        for cell in header_cells {
            line.push_str(&"-".repeat(cell.width() + 2));
            line.push('|');
        }
        line
    }

    /// セルを`| c1 | c2 |`形式の1行に連結
    fn join(cells: &[String]) -> String {
        let mut line = String::from("|");
        for cell in cells {
            line.push(' ');
            line.push_str(cell);
            line.push_str(" |");
        }
        line
    }
}

/// 表示幅が`width`に満たない分だけ末尾に空白を追加（切り詰めはしない）
fn pad(mut content: String, width: usize) -> String {
    let current = content.width();
    if current < width {
        content.extend(std::iter::repeat(' ').take(width - current));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::SheetScanner;
    use std::collections::BTreeSet;

    fn build(grid: &SheetGrid, align: bool) -> Option<MarkdownTable> {
        let renderer = CellRenderer::default();
        let dims = SheetScanner::scan(grid, &renderer);
        TableBuilder::new(&renderer, align).build(grid, &dims)
    }

    #[test]
    fn test_build_simple_table() {
        let grid = SheetGrid::from_rows("Sheet1", vec![vec!["A", "B"], vec![], vec!["1", "2"]]);
        let table = build(&grid, false).unwrap();

        assert_eq!(table.to_markdown(), "| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_build_empty_sheet_returns_none() {
        assert!(build(&SheetGrid::new("Empty"), true).is_none());
        assert!(build(&SheetGrid::new("Empty"), false).is_none());
    }

    #[test]
    fn test_build_header_only() {
        let grid = SheetGrid::from_rows("Sheet1", vec![vec!["Only"]]);
        let table = build(&grid, true).unwrap();

        assert_eq!(table.header, "| Only |");
        assert_eq!(table.separator, "|------|");
        assert!(table.body.is_empty());
    }

    #[test]
    fn test_build_aligned() {
        let grid = SheetGrid::from_rows(
            "Sheet1",
            vec![vec!["Name", "Age"], vec!["Alice", "30"], vec!["Bob", "7"]],
        );
        let table = build(&grid, true).unwrap();

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines,
            vec![
                "| Name  | Age |",
                "|-------|-----|",
                "| Alice | 30  |",
                "| Bob   | 7   |",
            ]
        );
    }

    #[test]
    fn test_build_not_aligned() {
        let grid = SheetGrid::from_rows(
            "Sheet1",
            vec![vec!["Name", "Age"], vec!["Alice", "30"]],
        );
        let table = build(&grid, false).unwrap();

        assert_eq!(table.header, "| Name | Age |");
        assert_eq!(table.separator, "|------|-----|");
        assert_eq!(table.body, vec!["| Alice | 30 |".to_string()]);
    }

    #[test]
    fn test_header_is_first_occupied_row() {
        let grid = SheetGrid::from_rows(
            "Sheet1",
            vec![vec![], vec![], vec!["H1", "H2"], vec!["a", "b"]],
        );
        let table = build(&grid, false).unwrap();

        assert_eq!(table.header, "| H1 | H2 |");
        assert_eq!(table.body, vec!["| a | b |".to_string()]);
    }

    #[test]
    fn test_missing_cells_render_blank() {
        let grid = SheetGrid::from_rows(
            "Sheet1",
            vec![vec!["A", "B", "C"], vec!["", "x"]],
        );
        let table = build(&grid, false).unwrap();
        assert_eq!(table.body, vec!["|  | x |  |".to_string()]);
    }

    #[test]
    fn test_trailing_empty_columns_excluded() {
        let mut grid = SheetGrid::from_rows("Sheet1", vec![vec!["A", "B"], vec!["1", "2"]]);
        grid.insert(crate::types::RawCellData::new(
            crate::types::CellCoord::new(1, 5),
            crate::types::CellValue::String(String::new()),
        ));
        let table = build(&grid, false).unwrap();

        for line in table.lines() {
            assert_eq!(line.matches('|').count(), 3, "line: {}", line);
        }
    }

    #[test]
    fn test_wide_characters_aligned_by_display_width() {
        let grid = SheetGrid::from_rows(
            "Sheet1",
            vec![vec!["名前", "x"], vec!["ab", "y"]],
        );
        let table = build(&grid, true).unwrap();

        assert_eq!(table.header, "| 名前 | x |");
        assert_eq!(table.separator, "|------|---|");
        assert_eq!(table.body, vec!["| ab   | y |".to_string()]);
    }

    #[test]
    fn test_padding_never_truncates() {
        let renderer = CellRenderer::default();
        let grid = SheetGrid::from_rows("Sheet1", vec![vec!["Header"], vec!["LongerValue"]]);
        // 列幅を意図的に小さく与える
        let dims = SheetDimensions {
            column_widths: vec![2],
            occupied_rows: BTreeSet::from([0, 1]),
        };
        let table = TableBuilder::new(&renderer, true).build(&grid, &dims).unwrap();

        assert_eq!(table.header, "| Header |");
        assert_eq!(table.body, vec!["| LongerValue |".to_string()]);
    }

    #[test]
    fn test_zero_width_cell_is_kept() {
        let grid = SheetGrid::from_rows("S", vec![vec!["H"], vec!["\u{200B}"]]);
        let table = build(&grid, false).unwrap();

        assert_eq!(table.body.len(), 1);
        assert_eq!(table.body[0], "| \u{200B} |");
    }

    #[test]
    fn test_write_to() {
        let grid = SheetGrid::from_rows("Sheet1", vec![vec!["A"], vec!["1"]]);
        let table = build(&grid, false).unwrap();

        let mut buffer = Vec::new();
        table.write_to(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "| A |\n|---|\n| 1 |\n");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn sheet_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
            prop::collection::vec(
                prop::collection::vec("[a-z|\\x{200B}]{0,4}", 0..5),
                0..8,
            )
        }

        proptest! {
            #[test]
            fn test_body_lines_equal_occupied_rows_minus_one(rows in sheet_strategy()) {
                let grid = SheetGrid::from_rows("Prop", rows);
                let renderer = CellRenderer::default();
                let dims = SheetScanner::scan(&grid, &renderer);
                let table = TableBuilder::new(&renderer, false).build(&grid, &dims);

                match table {
                    Some(table) => prop_assert_eq!(table.body.len(), dims.occupied_rows.len() - 1),
                    None => prop_assert!(dims.occupied_rows.is_empty()),
                }
            }

            #[test]
            fn test_aligned_cells_at_least_column_width(rows in sheet_strategy()) {
                let grid = SheetGrid::from_rows("Prop", rows);
                let renderer = CellRenderer::default();
                let dims = SheetScanner::scan(&grid, &renderer);
                let builder = TableBuilder::new(&renderer, true);

                for &row_idx in &dims.occupied_rows {
                    let cells = builder.row_cells(grid.row(row_idx), &dims.column_widths);
                    prop_assert_eq!(cells.len(), dims.column_widths.len());
                    for (cell, &width) in cells.iter().zip(&dims.column_widths) {
                        prop_assert!(cell.width() >= width);
                    }
                }
            }
        }
    }
}
