//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::messages::MessageCode;

/// xlsx2mdクレート全体で使用するエラー型
///
/// 入力ファイルの検証、ワークブックの解析、シート選択、出力ファイルの書き込み中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// バッチ変換では、ファイル単位のエラーは`FileReport`の代わりに記録され、
/// 他の入力ファイルの処理は継続されます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsx2md::Xlsx2MdError;
/// use std::fs::File;
///
/// fn read_excel_file(path: &str) -> Result<(), Xlsx2MdError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Xlsx2MdError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// セルの書式情報（styles.xmlやシートXML）の読み込みに失敗したエラー
    ///
    /// 変換自体は継続し、書式なしの表記にフォールバックします。
    #[error("Failed to read cell styles: {0}")]
    Styles(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に検出されます。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力ファイルが変換の前提条件を満たさない
    ///
    /// デコードを試みる前に検出されます。
    #[error("Invalid input '{}': {reason}", .path.display())]
    InvalidInput {
        /// 入力ファイルのパス
        path: PathBuf,
        /// 拒否理由
        reason: InputProblem,
    },

    /// シート選択式に数値として解釈できないトークンが含まれる
    #[error("Invalid sheet selector token '{token}'")]
    InvalidSelector {
        /// 解釈できなかったトークン
        token: String,
    },

    /// 出力ファイルの作成・書き込みに失敗した
    #[error("Failed to write '{}': {source}", .path.display())]
    Output {
        /// 出力先パス
        path: PathBuf,
        /// 原因となったI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限を超えた場合などに発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl Xlsx2MdError {
    /// メッセージカタログ上のコードを返す
    pub fn code(&self) -> MessageCode {
        match self {
            Xlsx2MdError::Io(_) => MessageCode::IoFailure,
            Xlsx2MdError::Parse(_) | Xlsx2MdError::Styles(_) => MessageCode::OpenFailed,
            Xlsx2MdError::Config(_) => MessageCode::InvalidConfig,
            Xlsx2MdError::InvalidInput { reason, .. } => reason.code(),
            Xlsx2MdError::InvalidSelector { .. } => MessageCode::InvalidSelector,
            Xlsx2MdError::Output { .. } => MessageCode::OutputFailed,
            Xlsx2MdError::SecurityViolation(_) => MessageCode::FileTooLarge,
        }
    }
}

/// 入力ファイルが拒否された理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    /// パスが空
    EmptyPath,
    /// 対応していない拡張子
    UnsupportedExtension,
    /// ファイルが存在しない
    NotFound,
    /// 通常のファイルではない（ディレクトリなど）
    NotAFile,
    /// 読み取り権限がない
    Unreadable,
}

impl InputProblem {
    fn code(self) -> MessageCode {
        match self {
            InputProblem::EmptyPath => MessageCode::MissingInput,
            InputProblem::UnsupportedExtension => MessageCode::UnsupportedExtension,
            InputProblem::NotFound => MessageCode::FileNotFound,
            InputProblem::NotAFile => MessageCode::NotAFile,
            InputProblem::Unreadable => MessageCode::FileUnreadable,
        }
    }
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InputProblem::EmptyPath => "empty path",
            InputProblem::UnsupportedExtension => "unsupported file extension",
            InputProblem::NotFound => "file not found",
            InputProblem::NotAFile => "not a regular file",
            InputProblem::Unreadable => "file is not readable",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    // Ioエラーのテスト
    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: Xlsx2MdError = io_err.into();

        match error {
            Xlsx2MdError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: Xlsx2MdError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse workbook"));
        assert!(error_msg.contains("Corrupted file"));
        assert_eq!(error.code(), MessageCode::OpenFailed);
    }

    #[test]
    fn test_styles_error_display() {
        let error = Xlsx2MdError::Styles("missing xl/styles.xml".to_string());
        assert_eq!(
            error.to_string(),
            "Failed to read cell styles: missing xl/styles.xml"
        );
        assert_eq!(error.code(), MessageCode::OpenFailed);
    }

    #[test]
    fn test_invalid_input_display() {
        let error = Xlsx2MdError::InvalidInput {
            path: PathBuf::from("report.txt"),
            reason: InputProblem::UnsupportedExtension,
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("report.txt"));
        assert!(error_msg.contains("unsupported file extension"));
        assert_eq!(error.code(), MessageCode::UnsupportedExtension);
    }

    #[test]
    fn test_invalid_input_codes() {
        let cases = [
            (InputProblem::EmptyPath, MessageCode::MissingInput),
            (InputProblem::NotFound, MessageCode::FileNotFound),
            (InputProblem::NotAFile, MessageCode::NotAFile),
            (InputProblem::Unreadable, MessageCode::FileUnreadable),
        ];
        for (reason, code) in cases {
            let error = Xlsx2MdError::InvalidInput {
                path: PathBuf::from("a.xlsx"),
                reason,
            };
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_invalid_selector_display() {
        let error = Xlsx2MdError::InvalidSelector {
            token: "x".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid sheet selector token 'x'");
        assert_eq!(error.code(), MessageCode::InvalidSelector);
    }

    #[test]
    fn test_output_error_keeps_source() {
        use std::error::Error as _;

        let error = Xlsx2MdError::Output {
            path: PathBuf::from("out/book_Sheet1.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("book_Sheet1.md"));
        assert!(error.source().is_some());
        assert_eq!(error.code(), MessageCode::OutputFailed);
    }

    // エラー変換のテスト（?演算子の動作確認）
    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), Xlsx2MdError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(Xlsx2MdError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: Xlsx2MdError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = Xlsx2MdError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let security_err = Xlsx2MdError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));
        assert_eq!(security_err.code(), MessageCode::FileTooLarge);
    }
}
