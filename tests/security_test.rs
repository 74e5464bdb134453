//! Security Tests
//!
//! 入力検証・入力サイズ制限・出力先の安全性を検証します。

use rust_xlsxwriter::*;
use std::fs;
use std::path::Path;
use xlsx2md::{ConverterBuilder, InputProblem, Xlsx2MdError};

fn simple_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Header").unwrap();
    worksheet.write_string(1, 0, "Data").unwrap();
    workbook.save_to_buffer().unwrap()
}

fn input_problem(result: Result<xlsx2md::FileReport, Xlsx2MdError>) -> InputProblem {
    match result {
        Err(Xlsx2MdError::InvalidInput { reason, .. }) => reason,
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

/// 拡張子はファイルを開く前に検証する
#[test]
fn test_unsupported_extensions_rejected_without_reading() {
    let dir = tempfile::tempdir().unwrap();
    let converter = ConverterBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();

    for name in ["book.csv", "book.xlsx.bak", "book", ".xlsx"] {
        let path = dir.path().join(name);
        // 中身は正しいワークブックでも拡張子で拒否する
        fs::write(&path, simple_workbook()).unwrap();
        assert_eq!(
            input_problem(converter.convert_file(&path, "all")),
            InputProblem::UnsupportedExtension,
            "name: {}",
            name
        );
    }
}

/// 拡張子の大文字小文字は区別しない
#[test]
fn test_uppercase_extension_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("REPORT.XLSX");
    fs::write(&path, simple_workbook()).unwrap();

    let converter = ConverterBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();
    let report = converter.convert_file(&path, "all").unwrap();

    assert!(dir.path().join("REPORT_Sheet1.md").exists());
    assert_eq!(report.written_paths().count(), 1);
}

#[test]
fn test_empty_path_rejected() {
    let converter = ConverterBuilder::new().build().unwrap();
    assert_eq!(
        input_problem(converter.convert_file("", "all")),
        InputProblem::EmptyPath
    );
}

#[test]
fn test_directory_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("folder.xlsx");
    fs::create_dir(&fake).unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    assert_eq!(
        input_problem(converter.convert_file(&fake, "all")),
        InputProblem::NotAFile
    );
}

/// パストラバーサルを含む入力パスは、存在しなければ単に見つからない
#[test]
fn test_path_traversal_input_not_found() {
    let converter = ConverterBuilder::new().build().unwrap();
    let result = converter.convert_file("../../nonexistent/../../book.xlsx", "all");
    assert_eq!(input_problem(result), InputProblem::NotFound);
}

/// 入力サイズ上限を超えると解析前に中断する
#[test]
fn test_input_file_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.xlsx");
    let bytes = simple_workbook();
    let size = bytes.len() as u64;
    fs::write(&path, bytes).unwrap();

    // ちょうど上限のサイズは許可
    let converter = ConverterBuilder::new()
        .with_max_input_file_size(size)
        .with_output_dir(dir.path())
        .build()
        .unwrap();
    assert!(converter.convert_file(&path, "all").is_ok());

    // 1バイトでも超えると拒否
    let converter = ConverterBuilder::new()
        .with_max_input_file_size(size - 1)
        .with_output_dir(dir.path())
        .build()
        .unwrap();
    match converter.convert_file(&path, "all") {
        Err(Xlsx2MdError::SecurityViolation(msg)) => assert!(msg.contains("exceeds maximum")),
        other => panic!("Expected SecurityViolation, got {:?}", other),
    }
}

/// 出力ファイルはすべて出力先ディレクトリの直下に作られる
#[test]
fn test_sheet_name_cannot_escape_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("book.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    // Excelはシート名に'/'や'\'を許さないため、'..'のみで確認する
    worksheet.set_name("..").unwrap();
    worksheet.write_string(0, 0, "x").unwrap();
    fs::write(&input, workbook.save_to_buffer().unwrap()).unwrap();

    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let converter = ConverterBuilder::new()
        .with_output_dir(&out)
        .build()
        .unwrap();
    let report = converter.convert_file(&input, "all").unwrap();

    for path in report.written_paths() {
        assert_eq!(path.parent(), Some(out.as_path()));
    }
    assert!(out.join("book_...md").exists());
}

/// 存在しない出力先は構築時に拒否する
#[test]
fn test_missing_output_dir_rejected_at_build() {
    let result = ConverterBuilder::new()
        .with_output_dir(Path::new("no/such/output/dir"))
        .build();
    assert!(matches!(result, Err(Xlsx2MdError::Config(_))));
}

#[test]
fn test_valid_file_processing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("valid.xlsx");
    fs::write(&input, simple_workbook()).unwrap();

    let converter = ConverterBuilder::new()
        .with_output_dir(dir.path())
        .build()
        .unwrap();
    converter.convert_file(&input, "all").unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("valid_Sheet1.md")).unwrap(),
        "| Header |\n|--------|\n| Data |\n"
    );
}
