//! Message Catalog Module
//!
//! ユーザー向けメッセージの言語別カタログ。
//! メッセージはコードで引き、表示言語は実行時設定（`Locale`）で切り替える。

use serde::Serialize;

/// 表示言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Locale {
    /// 英語（デフォルト）
    #[default]
    En,

    /// 中国語（簡体字）
    Zh,
}

impl Locale {
    /// 言語タグから`Locale`を解決する
    ///
    /// `"zh"`、`"zh-CN"`、`"zh_CN"`のような地域付きタグも受け付けます。
    /// 未知のタグは`None`を返します。
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "zh" => Some(Locale::Zh),
            _ => None,
        }
    }

    /// メッセージコードに対応する文言を返す
    pub fn text(self, code: MessageCode) -> &'static str {
        match self {
            Locale::En => english(code),
            Locale::Zh => chinese(code),
        }
    }
}

/// メッセージコード
///
/// エラー型やレポートから参照され、`Locale::text`で文言に変換されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MessageCode {
    MissingInput,
    UnsupportedExtension,
    FileNotFound,
    NotAFile,
    FileUnreadable,
    FileTooLarge,
    OpenFailed,
    InvalidSelector,
    SheetOutOfRange,
    SheetLoadFailed,
    OutputFailed,
    EmptySheet,
    ArgumentMismatch,
    InvalidConfig,
    IoFailure,
    Converted,
}

fn english(code: MessageCode) -> &'static str {
    match code {
        MessageCode::MissingInput => "no input file was specified",
        MessageCode::UnsupportedExtension => "only xls, xlsx, xlsm, xlsb and ods files can be converted",
        MessageCode::FileNotFound => "file does not exist",
        MessageCode::NotAFile => "path is not a regular file",
        MessageCode::FileUnreadable => "file cannot be read",
        MessageCode::FileTooLarge => "file exceeds the maximum input size",
        MessageCode::OpenFailed => "file cannot be opened as a workbook",
        MessageCode::InvalidSelector => "invalid sheet selector",
        MessageCode::SheetOutOfRange => "sheet index out of range, ignored",
        MessageCode::SheetLoadFailed => "sheet cannot be read",
        MessageCode::OutputFailed => "output file cannot be written",
        MessageCode::EmptySheet => "sheet is empty, skipped",
        MessageCode::ArgumentMismatch => "the number of sheet selectors must match the number of input files",
        MessageCode::InvalidConfig => "invalid configuration",
        MessageCode::IoFailure => "I/O error",
        MessageCode::Converted => "converted",
    }
}

fn chinese(code: MessageCode) -> &'static str {
    match code {
        MessageCode::MissingInput => "请指定需要转换的文件",
        MessageCode::UnsupportedExtension => "只能转换xls、xlsx、xlsm、xlsb和ods文件",
        MessageCode::FileNotFound => "文件不存在",
        MessageCode::NotAFile => "路径不是文件",
        MessageCode::FileUnreadable => "无法读取文件",
        MessageCode::FileTooLarge => "文件超过大小上限",
        MessageCode::OpenFailed => "无法打开文件",
        MessageCode::InvalidSelector => "表格编号格式错误",
        MessageCode::SheetOutOfRange => "表格编号超出范围，已忽略",
        MessageCode::SheetLoadFailed => "无法读取表格",
        MessageCode::OutputFailed => "无法写入输出文件",
        MessageCode::EmptySheet => "表格为空，已跳过",
        MessageCode::ArgumentMismatch => "表格参数的数量必须与输入文件的数量一致",
        MessageCode::InvalidConfig => "配置错误",
        MessageCode::IoFailure => "读写错误",
        MessageCode::Converted => "转换完成",
    }
}
