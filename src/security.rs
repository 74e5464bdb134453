//! Security Module
//!
//! 入力ファイルの事前検証と入力サイズ制限を実装するモジュール。
//! ここでの検証はデコードを試みる前に行います。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{InputProblem, Xlsx2MdError};

/// 変換可能な拡張子（小文字）
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,

    /// ZIPアーカイブ内の最大エントリ数（書式情報の読み込み時）
    /// デフォルト: 10000
    pub max_archive_entries: usize,

    /// 書式情報として展開するXMLパーツ1つの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_xml_part_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
            max_archive_entries: 10_000,
            max_xml_part_size: 104_857_600, // 100MB
        }
    }
}

impl SecurityConfig {
    /// 上限を超えないようにリーダーを最後まで読み込む
    ///
    /// 上限を1バイトでも超えた時点で読み込みを打ち切り、
    /// `Xlsx2MdError::SecurityViolation`を返します。
    pub fn read_limited<R: Read>(&self, reader: R) -> Result<Vec<u8>, Xlsx2MdError> {
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(self.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(Xlsx2MdError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                self.max_input_file_size
            )));
        }

        Ok(buffer)
    }
}

/// 拡張子が変換可能な形式か（大文字小文字を区別しない）
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 入力ファイルの検証
///
/// # 検証内容（この順に判定）
///
/// 1. パスが空でないこと
/// 2. 拡張子が変換可能な形式であること
/// 3. ファイルが存在すること
/// 4. 通常のファイルであること
/// 5. 読み取り可能であること
///
/// # 戻り値
///
/// * `Ok(File)` - 検証済みのファイルハンドル
/// * `Err(Xlsx2MdError::InvalidInput)` - いずれかの検証に失敗した場合
pub(crate) fn validate_input_path(path: &Path) -> Result<File, Xlsx2MdError> {
    let reject = |reason| Xlsx2MdError::InvalidInput {
        path: path.to_path_buf(),
        reason,
    };

    if path.as_os_str().is_empty() {
        return Err(reject(InputProblem::EmptyPath));
    }

    if !is_supported_extension(path) {
        return Err(reject(InputProblem::UnsupportedExtension));
    }

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(reject(InputProblem::NotFound))
        }
        Err(_) => return Err(reject(InputProblem::Unreadable)),
    };

    if !metadata.is_file() {
        return Err(reject(InputProblem::NotAFile));
    }

    File::open(path).map_err(|_| reject(InputProblem::Unreadable))
}
