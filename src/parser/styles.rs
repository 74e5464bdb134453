//! Cell Style Reader Module
//!
//! calamineが公開しないセルの数値書式を、xlsx/xlsmのXMLから直接読み込むモジュール。
//!
//! # 読み込むパーツ
//!
//! 1. `xl/styles.xml` - `numFmts`（書式ID → 書式文字列）と`cellXfs`（スタイルID → 書式ID）
//! 2. `xl/workbook.xml`と`xl/_rels/workbook.xml.rels` - シート名 → シートXMLのパス
//! 3. `xl/worksheets/*.xml` - セル座標 → スタイルID（`<c r="A1" s="3">`）

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::Xlsx2MdError;
use crate::security::SecurityConfig;
use crate::types::CellCoord;

/// スタイルIDから書式文字列への対応
#[derive(Debug, Clone, Default)]
pub(crate) struct NumberFormats {
    /// numFmtId -> formatCode（`numFmts`で定義されたもの）
    custom: HashMap<u32, String>,

    /// styleId（`cellXfs`内の位置） -> numFmtId
    cell_xfs: Vec<u32>,
}

impl NumberFormats {
    /// スタイルIDに対応する書式文字列を取得
    ///
    /// 「標準」（General）書式と未知の書式IDは`None`になります。
    pub fn format_string(&self, style_id: u32) -> Option<&str> {
        let num_fmt_id = *self.cell_xfs.get(style_id as usize)?;
        let format = self
            .custom
            .get(&num_fmt_id)
            .map(String::as_str)
            .or_else(|| builtin_format(num_fmt_id))?;
        (!format.eq_ignore_ascii_case("General")).then_some(format)
    }

    /// 書式を持つスタイルが1つもないか
    fn is_empty(&self) -> bool {
        self.cell_xfs.iter().all(|&id| id == 0)
    }
}

/// xlsx/xlsmのセル書式リーダー
///
/// ワークブックを開いたときに`styles.xml`とシートの対応表を読み、
/// シートXMLは`cell_formats`が呼ばれたシートだけを解析します。
pub(crate) struct XlsxStyles {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    formats: NumberFormats,

    /// シート名 -> アーカイブ内のパス（例: "xl/worksheets/sheet1.xml"）
    sheet_parts: HashMap<String, String>,

    max_part_size: u64,
}

impl XlsxStyles {
    /// ワークブックのバイト列から書式情報を読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxStyles)` - 読み込みに成功した場合
    /// * `Err(Xlsx2MdError::Styles)` - ZIPまたはXMLとして読めない場合
    /// * `Err(Xlsx2MdError::SecurityViolation)` - エントリ数やパーツサイズが上限を超えた場合
    pub fn open(buffer: Vec<u8>, security: &SecurityConfig) -> Result<Self, Xlsx2MdError> {
        let mut archive = ZipArchive::new(Cursor::new(buffer)).map_err(zip_error)?;

        if archive.len() > security.max_archive_entries {
            return Err(Xlsx2MdError::SecurityViolation(format!(
                "ZIP archive contains too many entries: {} (max: {})",
                archive.len(),
                security.max_archive_entries
            )));
        }

        let max_part_size = security.max_xml_part_size;

        let formats = match read_part(&mut archive, "xl/styles.xml", max_part_size)? {
            Some(xml) => parse_styles(&xml)?,
            None => NumberFormats::default(),
        };

        let workbook = read_part(&mut archive, "xl/workbook.xml", max_part_size)?
            .ok_or_else(|| Xlsx2MdError::Styles("missing xl/workbook.xml".to_string()))?;
        let relationships =
            match read_part(&mut archive, "xl/_rels/workbook.xml.rels", max_part_size)? {
                Some(xml) => parse_relationships(&xml)?,
                None => HashMap::new(),
            };

        let mut sheet_parts = HashMap::new();
        for (name, rel_id) in parse_sheet_entries(&workbook)? {
            match relationships.get(&rel_id) {
                Some(target) => {
                    sheet_parts.insert(name, part_path(target));
                }
                None => tracing::debug!(sheet = %name, rel = %rel_id, "sheet relationship not found"),
            }
        }

        Ok(Self {
            archive,
            formats,
            sheet_parts,
            max_part_size,
        })
    }

    /// シート内の書式付きセルを取得
    ///
    /// 「標準」以外の書式を持つセルだけを返します。
    pub fn cell_formats(
        &mut self,
        sheet_name: &str,
    ) -> Result<HashMap<CellCoord, String>, Xlsx2MdError> {
        if self.formats.is_empty() {
            return Ok(HashMap::new());
        }
        let Some(part) = self.sheet_parts.get(sheet_name) else {
            return Ok(HashMap::new());
        };

        let xml = read_part(&mut self.archive, part, self.max_part_size)?
            .ok_or_else(|| Xlsx2MdError::Styles(format!("missing {}", part)))?;

        let formats = parse_cell_styles(&xml)?
            .into_iter()
            .filter_map(|(coord, style_id)| {
                self.formats
                    .format_string(style_id)
                    .map(|format| (coord, format.to_string()))
            })
            .collect();

        Ok(formats)
    }
}

/// アーカイブからパーツを読み込む（存在しなければ`None`）
fn read_part(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    name: &str,
    max_size: u64,
) -> Result<Option<Vec<u8>>, Xlsx2MdError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(zip_error(e)),
    };

    let too_large = || {
        Xlsx2MdError::SecurityViolation(format!(
            "Part '{}' exceeds maximum size: {} bytes",
            name, max_size
        ))
    };

    if file.size() > max_size {
        return Err(too_large());
    }

    // 宣言サイズを信用せず、展開しながら上限を確認する
    let mut xml = Vec::new();
    file.take(max_size.saturating_add(1)).read_to_end(&mut xml)?;
    if xml.len() as u64 > max_size {
        return Err(too_large());
    }

    Ok(Some(xml))
}

/// `xl/styles.xml`から書式IDの対応を読み込む
fn parse_styles(xml: &[u8]) -> Result<NumberFormats, Xlsx2MdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut formats = NumberFormats::default();
    let mut in_cell_xfs = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            // <numFmt numFmtId="164" formatCode="0.000"/>
            // <xf numFmtId="164" fontId="0" ...>（子要素を持つ場合もある）
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = parse_attribute::<u32>(&e, b"numFmtId")?;
                    let code = attribute(&e, b"formatCode")?;
                    if let (Some(id), Some(code)) = (id, code) {
                        formats.custom.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let num_fmt_id = parse_attribute::<u32>(&e, b"numFmtId")?.unwrap_or(0);
                    formats.cell_xfs.push(num_fmt_id);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(formats)
}

/// `xl/workbook.xml`からシート名とリレーションIDを順に読み込む
fn parse_sheet_entries(xml: &[u8]) -> Result<Vec<(String, String)>, Xlsx2MdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            // <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(rel_id)) = (attribute(&e, b"name")?, attribute(&e, b"id")?)
                {
                    sheets.push((name, rel_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// `xl/_rels/workbook.xml.rels`からリレーションID -> ターゲットを読み込む
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, Xlsx2MdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut relationships = HashMap::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            // <Relationship Id="rId1" Type="..." Target="worksheets/sheet1.xml"/>
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id")?, attribute(&e, b"Target")?)
                {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// シートXMLからセル座標 -> スタイルIDを読み込む
///
/// スタイルID 0（既定のスタイル）のセルは含めません。
fn parse_cell_styles(xml: &[u8]) -> Result<HashMap<CellCoord, u32>, Xlsx2MdError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut styles = HashMap::new();
    let mut buf = Vec::new();
    // `r`属性を省略した行・セルは直前の位置の次とみなす
    let mut next_row = 0u32;
    let mut current_row = 0u32;
    let mut next_col = 0u32;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = match parse_attribute::<u32>(&e, b"r")? {
                        Some(r) => r.saturating_sub(1),
                        None => next_row,
                    };
                    next_row = current_row.saturating_add(1);
                    next_col = 0;
                }
                b"c" => {
                    let coord = attribute(&e, b"r")?
                        .as_deref()
                        .and_then(parse_cell_ref)
                        .map(|(row, col)| CellCoord::new(row, col))
                        .unwrap_or_else(|| CellCoord::new(current_row, next_col));
                    next_col = coord.col.saturating_add(1);

                    if let Some(style_id) = parse_attribute::<u32>(&e, b"s")? {
                        if style_id != 0 {
                            styles.insert(coord, style_id);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

/// 属性値を取得（名前空間の接頭辞は無視する）
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, Xlsx2MdError> {
    for attr in element.attributes() {
        let attr =
            attr.map_err(|e| Xlsx2MdError::Styles(format!("XML attribute error: {}", e)))?;
        if attr.key.local_name().as_ref() == name {
            // `unescape_value` is unavailable when quick-xml's `encoding` feature is
            // enabled (calamine enables it); equivalent UTF-8 decode + unescape.
            let raw = std::str::from_utf8(&attr.value)
                .map_err(|e| xml_error(quick_xml::Error::from(e)))?;
            let value = quick_xml::escape::unescape(raw)
                .map_err(|e| xml_error(quick_xml::Error::from(e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// 属性値を数値などに変換して取得
fn parse_attribute<T: FromStr>(
    element: &BytesStart<'_>,
    name: &[u8],
) -> Result<Option<T>, Xlsx2MdError> {
    match attribute(element, name)? {
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            Xlsx2MdError::Styles(format!(
                "invalid value '{}' for attribute '{}'",
                value,
                String::from_utf8_lossy(name)
            ))
        }),
        None => Ok(None),
    }
}

/// "B12"形式のセル参照を(行, 列)に変換（0始まり）
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let digits_at = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(digits_at);
    if letters.is_empty() {
        return None;
    }

    let mut col = 0u32;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let value = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(value)?;
    }

    let row = digits.parse::<u32>().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}

/// リレーションのターゲットをアーカイブ内のパスに変換
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn zip_error(e: ZipError) -> Xlsx2MdError {
    Xlsx2MdError::Styles(format!("ZIP error: {}", e))
}

fn xml_error(e: quick_xml::Error) -> Xlsx2MdError {
    Xlsx2MdError::Styles(format!("XML parse error: {}", e))
}

/// 組み込み書式ID（0-163）の書式文字列
fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[Red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[Red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0_);(#,##0)"),
        38 => Some("#,##0_);[Red](#,##0)"),
        39 => Some("#,##0.00_);(#,##0.00)"),
        40 => Some("#,##0.00_);[Red](#,##0.00)"),
        41 => Some("_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
        42 => Some("_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)"),
        43 => Some("_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
        44 => Some("_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mm:ss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}
