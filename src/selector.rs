//! Selector Module
//!
//! シート選択式（`"all"`またはカンマ区切りのインデックス）を解釈するモジュール。

use std::collections::BTreeSet;

use crate::error::Xlsx2MdError;

/// 解決済みのシート選択
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSelection {
    /// 変換対象のシートインデックス（昇順、重複なし）
    pub indices: BTreeSet<usize>,

    /// 範囲外のため無視したインデックス（出現順）
    pub ignored: Vec<usize>,
}

impl SheetSelection {
    /// 変換対象が1つもないか
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// シート選択式を解決する
///
/// # 引数
///
/// * `sheet_count` - ワークブック内のシート数
/// * `expression` - シート選択式
///
/// # 規則
///
/// * 大文字小文字を区別せず`all`を含む場合はすべてのシート
/// * それ以外はカンマで分割し、前後の空白を除いて0始まりのインデックスとして解釈
/// * 数値として解釈できないトークンがあれば`Xlsx2MdError::InvalidSelector`（部分的な結果は返さない）
/// * `sheet_count`以上のインデックスは警告を出して無視し、処理を続ける
///
/// # 使用例
///
/// ```rust
/// use xlsx2md::resolve_sheets;
///
/// let selection = resolve_sheets(3, "0,2,5").unwrap();
/// assert_eq!(selection.indices.into_iter().collect::<Vec<_>>(), vec![0, 2]);
/// assert_eq!(selection.ignored, vec![5]);
/// ```
pub fn resolve(sheet_count: usize, expression: &str) -> Result<SheetSelection, Xlsx2MdError> {
    if expression.to_lowercase().contains("all") {
        return Ok(SheetSelection {
            indices: (0..sheet_count).collect(),
            ignored: Vec::new(),
        });
    }

    let mut selection = SheetSelection::default();
    for token in expression.split(',') {
        let token = token.trim();
        let index: usize = token.parse().map_err(|_| Xlsx2MdError::InvalidSelector {
            token: token.to_string(),
        })?;

        if index >= sheet_count {
            tracing::warn!(
                index,
                sheet_count,
                "sheet index out of range, ignored"
            );
            selection.ignored.push(index);
            continue;
        }
        selection.indices.insert(index);
    }

    Ok(selection)
}
