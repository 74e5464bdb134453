//! Builder Module
//!
//! Fluent Builder APIで`Converter`を構築し、ファイル単位・バッチ単位の変換を実行する。

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::api::{DateFormat, FormulaMode};
use crate::error::Xlsx2MdError;
use crate::grid::SheetGrid;
use crate::messages::MessageCode;
use crate::parser::WorkbookParser;
use crate::renderer::CellRenderer;
use crate::report::{BatchEntry, BatchReport, FileReport, SheetOutcome, SheetReport};
use crate::scanner::SheetScanner;
use crate::security::{validate_input_path, SecurityConfig};
use crate::selector;
use crate::table::{MarkdownTable, TableBuilder};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 日付形式
    pub date_format: DateFormat,

    /// 数式出力モード
    pub formula_mode: FormulaMode,

    /// 列を揃えるために空白を埋めるか
    pub align_columns: bool,

    /// 出力先ディレクトリ（Noneの場合はカレントディレクトリ）
    pub output_dir: Option<PathBuf>,

    /// 入力サイズ上限など
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::Iso8601,
            formula_mode: FormulaMode::CachedValue,
            align_columns: false,
            output_dir: None,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2md::{ConverterBuilder, FormulaMode};
///
/// # fn main() -> Result<(), xlsx2md::Xlsx2MdError> {
/// let converter = ConverterBuilder::new()
///     .with_align_columns(true)
///     .with_formula_mode(FormulaMode::Formula)
///     .with_output_dir("out")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 日付形式: ISO 8601 (YYYY-MM-DD)
    /// - 数式モード: 計算結果を出力
    /// - 列揃え: しない
    /// - 出力先: カレントディレクトリ
    /// - 入力サイズ上限: 2GB
    pub fn new() -> Self {
        Self::default()
    }

    /// 日付の出力形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 数式セルの出力モードを指定する
    pub fn with_formula_mode(mut self, mode: FormulaMode) -> Self {
        self.config.formula_mode = mode;
        self
    }

    /// 各セルを列幅まで空白で埋めて列を揃えるかを指定する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsx2md::ConverterBuilder;
    ///
    /// // | Name  | Age |
    /// // |-------|-----|
    /// // | Alice | 30  |
    /// let builder = ConverterBuilder::new().with_align_columns(true);
    /// ```
    pub fn with_align_columns(mut self, align: bool) -> Self {
        self.config.align_columns = align;
        self
    }

    /// 出力先ディレクトリを指定する
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_file_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `Xlsx2MdError::Config(String)`: 設定の検証に失敗した場合
    ///   * カスタム日付形式が空の文字列を生成する
    ///   * 出力先ディレクトリが存在しない
    ///   * 入力サイズ上限が0
    pub fn build(self) -> Result<Converter, Xlsx2MdError> {
        // 1. カスタム日付形式の検証
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            // テスト用の日時でフォーマット試行
            let test_date = NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(|| Xlsx2MdError::Config("Failed to create test date".to_string()))?;
            let mut formatted = String::new();
            let valid = std::fmt::Write::write_fmt(
                &mut formatted,
                format_args!("{}", test_date.format(format_str)),
            )
            .is_ok();
            if !valid || formatted.is_empty() {
                return Err(Xlsx2MdError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        // 2. 出力先ディレクトリの検証
        if let Some(ref dir) = self.config.output_dir {
            if !dir.is_dir() {
                return Err(Xlsx2MdError::Config(format!(
                    "Output directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        // 3. 入力サイズ上限の検証
        if self.config.security.max_input_file_size == 0 {
            return Err(Xlsx2MdError::Config(
                "Maximum input file size must be greater than 0".to_string(),
            ));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// 入力ファイルと選択式の組ごとに、ワークブックを開き、選択されたシートを
/// `<入力ファイル名>_<シート名>.md`へ書き出します。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2md::ConverterBuilder;
///
/// # fn main() -> Result<(), xlsx2md::Xlsx2MdError> {
/// let converter = ConverterBuilder::new().build()?;
/// let report = converter.convert_file("book.xlsx", "0,2")?;
/// for path in report.written_paths() {
///     println!("{}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// セルレンダラー
    renderer: CellRenderer,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            renderer: CellRenderer::new(config.formula_mode, config.date_format.clone()),
            config,
        }
    }

    /// 1シートをMarkdownテーブルに変換
    ///
    /// 内容のある行がない場合は`None`を返します。
    pub fn convert_sheet(&self, grid: &SheetGrid) -> Option<MarkdownTable> {
        let dims = SheetScanner::scan(grid, &self.renderer);
        TableBuilder::new(&self.renderer, self.config.align_columns).build(grid, &dims)
    }

    /// リーダーからワークブックを読み込み、選択されたシートを変換
    ///
    /// ファイルシステムには書き込みません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<(String, Option<MarkdownTable>)>)` - シート名と変換結果（インデックス昇順、空シートは`None`）
    /// * `Err(Xlsx2MdError)` - 解析エラー、選択式エラー
    pub fn convert_reader<R: Read>(
        &self,
        input: R,
        selector: &str,
    ) -> Result<Vec<(String, Option<MarkdownTable>)>, Xlsx2MdError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let selection = selector::resolve(parser.sheet_count(), selector)?;

        let mut tables = Vec::with_capacity(selection.indices.len());
        for index in selection.indices {
            let grid = parser.load_sheet(index, self.config.formula_mode)?;
            let table = self.convert_sheet(&grid);
            tables.push((grid.name().to_string(), table));
        }
        Ok(tables)
    }

    /// 1つの入力ファイルを変換
    ///
    /// # 処理フロー
    ///
    /// 1. 入力ファイルの検証（拡張子・存在・読み取り可否）
    /// 2. ワークブックを開く
    /// 3. シート選択式の解決
    /// 4. 選択された各シートについて（インデックス昇順）
    ///    - シートの読み込み
    ///    - 占有領域の走査
    ///    - テーブルの組み立て
    ///    - `<入力ファイル名>_<シート名>.md`へのアトミックな書き出し
    ///
    /// シート単位の失敗は`SheetOutcome::Failed`として記録し、残りのシートの処理を続けます。
    /// 内容のないシートは`SheetOutcome::Skipped`になり、ファイルは作成しません。
    ///
    /// # 戻り値
    ///
    /// * `Ok(FileReport)` - シートごとの結果
    /// * `Err(Xlsx2MdError)` - ファイル単位のエラー（検証、解析、選択式）
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        selector: &str,
    ) -> Result<FileReport, Xlsx2MdError> {
        let input = input.as_ref();

        // 1. 入力ファイルの検証
        let file = validate_input_path(input)?;

        // 2. ワークブックを開く
        let mut parser = WorkbookParser::open(file, &self.config.security)?;

        // 3. シート選択
        let selection = selector::resolve(parser.sheet_count(), selector)?;
        tracing::debug!(
            input = %input.display(),
            sheets = ?parser.sheet_names(),
            selected = ?selection.indices,
            "resolved sheet selection"
        );

        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        // 4. 各シートの処理
        let mut report = FileReport {
            input: input.to_path_buf(),
            ignored_indices: selection.ignored.clone(),
            sheets: Vec::with_capacity(selection.indices.len()),
        };

        let mut claimed_paths = HashSet::new();
        for index in selection.indices {
            let name = parser.sheet_name(index).unwrap_or_default().to_string();
            let path = self.output_path(&stem, &name);
            if !claimed_paths.insert(path.clone()) {
                tracing::warn!(
                    input = %input.display(),
                    sheet = %name,
                    path = %path.display(),
                    "output path already used by another sheet of this file, it will be overwritten"
                );
            }
            let outcome = match parser.load_sheet(index, self.config.formula_mode) {
                Ok(grid) => self.write_sheet(&stem, &grid),
                Err(e) => {
                    tracing::error!(input = %input.display(), sheet = %name, error = %e, "failed to read sheet");
                    SheetOutcome::Failed {
                        code: MessageCode::SheetLoadFailed,
                        detail: e.to_string(),
                    }
                }
            };
            report.sheets.push(SheetReport {
                index,
                name,
                outcome,
            });
        }

        Ok(report)
    }

    /// 複数の入力ファイルを変換
    ///
    /// 各ジョブ（入力ファイルと選択式の組）は独立して処理され、1つのファイルの失敗が
    /// 他のファイルの処理を中断することはありません。ファイル単位で並列に処理し、
    /// 各ワーカーはそれぞれ自分のワークブックを開きます。
    ///
    /// # 戻り値
    ///
    /// 入力順に並んだ`BatchReport`
    pub fn convert_batch<P, S>(&self, jobs: &[(P, S)]) -> BatchReport
    where
        P: AsRef<Path> + Sync,
        S: AsRef<str> + Sync,
    {
        for (stem, inputs) in colliding_stems(jobs.iter().map(|(input, _)| input.as_ref())) {
            tracing::warn!(
                stem = %stem,
                inputs = ?inputs,
                "inputs share a file name, their outputs may overwrite each other"
            );
        }

        let entries = jobs
            .par_iter()
            .map(|(input, selector)| {
                let input = input.as_ref();
                let selector = selector.as_ref();
                let result = self.convert_file(input, selector);
                if let Err(ref e) = result {
                    tracing::error!(input = %input.display(), error = %e, "failed to convert file");
                }
                BatchEntry {
                    input: input.to_path_buf(),
                    selector: selector.to_string(),
                    result,
                }
            })
            .collect();

        BatchReport { entries }
    }

    /// 出力ファイルのパス（`<出力先>/<入力ファイル名>_<シート名>.md`）
    pub fn output_path(&self, input_stem: &str, sheet_name: &str) -> PathBuf {
        let file_name = format!("{}_{}.md", input_stem, sanitize_sheet_name(sheet_name));
        match &self.config.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// シートを変換して書き出す
    fn write_sheet(&self, stem: &str, grid: &SheetGrid) -> SheetOutcome {
        let Some(table) = self.convert_sheet(grid) else {
            tracing::warn!(sheet = grid.name(), "sheet has no occupied rows, skipped");
            return SheetOutcome::Skipped {
                code: MessageCode::EmptySheet,
            };
        };

        let path = self.output_path(stem, grid.name());
        match write_atomically(&path, &table) {
            Ok(()) => {
                tracing::info!(sheet = grid.name(), path = %path.display(), "wrote markdown table");
                SheetOutcome::Written {
                    body_rows: table.body.len(),
                    columns: table.column_count(),
                    path,
                }
            }
            Err(e) => {
                tracing::error!(sheet = grid.name(), error = %e, "failed to write output");
                SheetOutcome::failed(&e)
            }
        }
    }
}

/// シート名をファイル名として使えるようにする（パス区切り文字を`_`に置換）
fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// 同じファイル名（拡張子を除く）を持つ異なる入力をまとめる
///
/// 出力名は`<入力ファイル名>_<シート名>.md`なので、これらの入力は出力を上書きし合う可能性がある。
fn colliding_stems<'a>(inputs: impl Iterator<Item = &'a Path>) -> Vec<(String, Vec<&'a Path>)> {
    let mut by_stem: BTreeMap<String, Vec<&'a Path>> = BTreeMap::new();
    for input in inputs {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let paths = by_stem.entry(stem).or_default();
        if !paths.contains(&input) {
            paths.push(input);
        }
    }

    by_stem
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .collect()
}

/// 一時ファイルに書き込んでから置き換える
///
/// 失敗した場合は一時ファイルが削除され、途中まで書かれた`.md`は残りません。
fn write_atomically(path: &Path, table: &MarkdownTable) -> Result<(), Xlsx2MdError> {
    let output_error = |source| Xlsx2MdError::Output {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let temp = tempfile::NamedTempFile::new_in(&dir).map_err(output_error)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        table.write_to(&mut writer).map_err(|e| match e {
            Xlsx2MdError::Io(source) => output_error(source),
            other => other,
        })?;
    }
    temp.as_file().sync_all().map_err(output_error)?;

    // NamedTempFileは0600で作成される
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(output_error)?;
    }

    match temp.persist(path) {
        Ok(_) => {}
        Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => {
            // renameで上書きできない環境では既存ファイルを削除してから置き換える
            let _ = fs::remove_file(path);
            err.file.persist(path).map_err(|e| output_error(e.error))?;
        }
        Err(err) => return Err(output_error(err.error)),
    }

    Ok(())
}
