//! Report Module
//!
//! シート単位・ファイル単位・バッチ単位の変換結果を表す型。
//! `--json`出力のため`serde`でシリアライズできます。

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Xlsx2MdError;
use crate::messages::{Locale, MessageCode};

/// 1シートの変換結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetOutcome {
    /// Markdownファイルを書き出した
    Written {
        /// 出力ファイルのパス
        path: PathBuf,
        /// 本体行の数（ヘッダー行を除く）
        body_rows: usize,
        /// 列数
        columns: usize,
    },

    /// 内容のある行がないため出力しなかった
    Skipped {
        /// メッセージコード
        code: MessageCode,
    },

    /// シートの読み込みまたは出力に失敗した
    Failed {
        /// メッセージコード
        code: MessageCode,
        /// 詳細（英語）
        detail: String,
    },
}

impl SheetOutcome {
    pub(crate) fn failed(error: &Xlsx2MdError) -> Self {
        SheetOutcome::Failed {
            code: error.code(),
            detail: error.to_string(),
        }
    }

    /// 失敗したか
    pub fn is_failure(&self) -> bool {
        matches!(self, SheetOutcome::Failed { .. })
    }
}

/// シートごとの報告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetReport {
    /// シートインデックス
    pub index: usize,
    /// シート名
    pub name: String,
    /// 結果
    #[serde(flatten)]
    pub outcome: SheetOutcome,
}

/// 1ファイルの変換結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// 入力ファイル
    pub input: PathBuf,
    /// 範囲外のため無視したシートインデックス
    pub ignored_indices: Vec<usize>,
    /// 選択されたシートの結果（インデックス昇順）
    pub sheets: Vec<SheetReport>,
}

impl FileReport {
    /// 書き出したファイルのパス
    pub fn written_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.sheets.iter().filter_map(|sheet| match &sheet.outcome {
            SheetOutcome::Written { path, .. } => Some(path),
            _ => None,
        })
    }

    /// 失敗したシートがあるか
    pub fn has_failures(&self) -> bool {
        self.sheets.iter().any(|sheet| sheet.outcome.is_failure())
    }
}

/// バッチ内の1ジョブの結果
#[derive(Debug)]
pub struct BatchEntry {
    /// 入力ファイル
    pub input: PathBuf,
    /// シート選択式
    pub selector: String,
    /// ファイル単位の結果（ファイル単位のエラーを含む）
    pub result: Result<FileReport, Xlsx2MdError>,
}

/// バッチ変換の結果（入力順）
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// すべてのファイル・シートが成功したか
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|entry| match &entry.result {
            Ok(report) => !report.has_failures(),
            Err(_) => false,
        })
    }

    /// 書き出したファイルの総数
    pub fn written_count(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok())
            .map(|report| report.written_paths().count())
            .sum()
    }

    /// 人間向けの報告行を生成
    ///
    /// 各行は対象のファイル（とシート）と理由を含みます。
    pub fn describe(&self, locale: Locale) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.entries {
            let input = entry.input.display();
            match &entry.result {
                Err(e) => {
                    lines.push(format!("{}: {} ({})", input, locale.text(e.code()), e));
                }
                Ok(report) => {
                    for index in &report.ignored_indices {
                        lines.push(format!(
                            "{} [#{}]: {}",
                            input,
                            index,
                            locale.text(MessageCode::SheetOutOfRange)
                        ));
                    }
                    for sheet in &report.sheets {
                        let prefix = format!("{} [{}]", input, sheet.name);
                        lines.push(match &sheet.outcome {
                            SheetOutcome::Written { path, .. } => format!(
                                "{}: {} -> {}",
                                prefix,
                                locale.text(MessageCode::Converted),
                                path.display()
                            ),
                            SheetOutcome::Skipped { code } => {
                                format!("{}: {}", prefix, locale.text(*code))
                            }
                            SheetOutcome::Failed { code, detail } => {
                                format!("{}: {} ({})", prefix, locale.text(*code), detail)
                            }
                        });
                    }
                }
            }
        }
        lines
    }

    /// JSON形式の要約を生成
    pub fn to_json(&self) -> serde_json::Value {
        let files: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|entry| match &entry.result {
                Ok(report) => serde_json::json!({
                    "input": entry.input,
                    "selector": entry.selector,
                    "status": "ok",
                    "ignored_indices": report.ignored_indices,
                    "sheets": report.sheets,
                }),
                Err(e) => serde_json::json!({
                    "input": entry.input,
                    "selector": entry.selector,
                    "status": "error",
                    "code": e.code(),
                    "detail": e.to_string(),
                }),
            })
            .collect();

        serde_json::json!({
            "success": self.is_success(),
            "written": self.written_count(),
            "files": files,
        })
    }
}
