//! FormatParser Module
//!
//! 数値書式文字列の構文解析と、数値への適用を提供します。
//!
//! # 対応範囲
//!
//! - 桁プレースホルダー（`0`, `#`, `?`）、小数点、桁区切り、末尾の`,`によるスケーリング
//! - パーセント、指数表記（`0.00E+00`、`##0.0E+0`）
//! - リテラル（`"..."`、`\x`、記号）、通貨・ロケール指定（`[$€-407]`）
//! - 最大4セクション（正数;負数;ゼロ;テキスト）と条件（`[>100]`）
//!
//! 日付・時刻と分数の書式は扱わず、呼び出し側が一般表記にフォールバックします。
//! 色指定、`_x`（空白の幅）、`*x`（繰り返し）は出力に影響しません。

use crate::error::Xlsx2MdError;

use super::sections::{Condition, FormatSection, SectionKind};
use super::tokens::FormatToken;

/// 数値書式パーサー
#[derive(Debug, Clone)]
pub(crate) struct FormatParser {
    /// パースされたセクション（最大4つ）
    sections: Vec<FormatSection>,
}

impl FormatParser {
    /// 書式文字列をパース
    ///
    /// # 戻り値
    ///
    /// * `Ok(Self)` - パース成功
    /// * `Err(Xlsx2MdError::Styles)` - 引用符またはブラケットが閉じていない場合
    pub fn parse(format_string: &str) -> Result<Self, Xlsx2MdError> {
        if format_string.trim().is_empty() {
            let mut section = FormatSection::new(SectionKind::Positive);
            section.tokens.push(FormatToken::General);
            return Ok(Self {
                sections: vec![section],
            });
        }

        let mut sections = Vec::new();
        for (index, section_str) in Self::split_sections(format_string)?.iter().enumerate() {
            let Some(kind) = SectionKind::from_index(index) else {
                break;
            };
            sections.push(Self::parse_section(section_str, kind));
        }

        Ok(Self { sections })
    }

    /// `;`でセクションに分割
    ///
    /// 引用符・ブラケット内と、`\` `_` `*`の直後の`;`は区切りとみなしません。
    fn split_sections(format_string: &str) -> Result<Vec<String>, Xlsx2MdError> {
        let mut sections = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_brackets = false;
        let mut chars = format_string.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '"' if !in_brackets => in_quotes = !in_quotes,
                '[' if !in_quotes => in_brackets = true,
                ']' if !in_quotes => in_brackets = false,
                '\\' | '_' | '*' if !in_quotes && !in_brackets => {
                    current.push(ch);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    continue;
                }
                ';' if !in_quotes && !in_brackets => {
                    sections.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }

        if in_quotes || in_brackets {
            return Err(Xlsx2MdError::Styles(format!(
                "unterminated quote or bracket in number format '{}'",
                format_string
            )));
        }

        sections.push(current);
        Ok(sections)
    }

    /// セクションを字句解析
    fn parse_section(section_str: &str, kind: SectionKind) -> FormatSection {
        let mut section = FormatSection::new(kind);
        let chars: Vec<char> = section_str.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            i += 1;

            let token = match ch {
                '"' => {
                    let start = i;
                    while i < chars.len() && chars[i] != '"' {
                        i += 1;
                    }
                    let literal: String = chars[start..i].iter().collect();
                    i += 1;
                    FormatToken::Literal(literal)
                }
                '\\' => match chars.get(i) {
                    Some(next) => {
                        i += 1;
                        FormatToken::Literal(next.to_string())
                    }
                    None => continue,
                },
                // 空白の幅（_x）と繰り返し（*x）は次の1文字ごと読み飛ばす
                '_' | '*' => {
                    i += 1;
                    continue;
                }
                '[' => {
                    let start = i;
                    while i < chars.len() && chars[i] != ']' {
                        i += 1;
                    }
                    let content: String = chars[start..i].iter().collect();
                    i += 1;

                    if let Some(condition) = Condition::parse(&content) {
                        section.condition = Some(condition);
                        continue;
                    }
                    match Self::bracket_token(&content) {
                        Some(token) => token,
                        None => continue,
                    }
                }
                '0' => FormatToken::Zero,
                '#' => FormatToken::Hash,
                '?' => FormatToken::Question,
                '.' => FormatToken::DecimalPoint,
                ',' => FormatToken::Comma,
                '%' => FormatToken::Percent,
                '@' => FormatToken::Text,
                '/' => FormatToken::Slash,
                'E' | 'e' if matches!(chars.get(i), Some('+') | Some('-')) => {
                    let plus = chars[i] == '+';
                    i += 1;
                    FormatToken::Exponent { plus }
                }
                'G' | 'g' if Self::starts_with_ignore_case(&chars[i - 1..], "general") => {
                    i += "general".len() - 1;
                    FormatToken::General
                }
                'A' | 'a' if Self::starts_with_ignore_case(&chars[i - 1..], "am/pm") => {
                    i += "am/pm".len() - 1;
                    FormatToken::DateTime
                }
                'A' | 'a' if Self::starts_with_ignore_case(&chars[i - 1..], "a/p") => {
                    i += "a/p".len() - 1;
                    FormatToken::DateTime
                }
                'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => FormatToken::DateTime,
                other => FormatToken::Literal(other.to_string()),
            };

            section.tokens.push(token);
        }

        section
    }

    /// ブラケット内の指定をトークンに変換
    ///
    /// 通貨・ロケール指定（`[$€-407]`）は記号部分をリテラルに、経過時間（`[h]`）は
    /// 日付・時刻として扱います。色指定などは`None`（無視）です。
    fn bracket_token(content: &str) -> Option<FormatToken> {
        if let Some(currency) = content.strip_prefix('$') {
            let symbol = currency.split('-').next().unwrap_or_default();
            return (!symbol.is_empty()).then(|| FormatToken::Literal(symbol.to_string()));
        }
        let is_elapsed = !content.is_empty()
            && content
                .chars()
                .all(|c| matches!(c.to_ascii_lowercase(), 'h' | 'm' | 's'));
        is_elapsed.then_some(FormatToken::DateTime)
    }

    fn starts_with_ignore_case(chars: &[char], keyword: &str) -> bool {
        let len = keyword.chars().count();
        chars.len() >= len
            && chars
                .iter()
                .zip(keyword.chars())
                .all(|(a, b)| a.to_ascii_lowercase() == b)
    }

    /// 数値をフォーマット
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - 書式を適用した文字列
    /// * `None` - 書式が数値として適用できない場合（日付・時刻、分数、非有限値など）。
    ///   呼び出し側は一般表記にフォールバックします
    pub fn format_number(&self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return None;
        }

        let (section, auto_minus) = self.select_section(value)?;
        if section.is_unsupported() {
            return None;
        }

        let magnitude = value.abs();
        let body = if section.has_digits() {
            Self::format_digits(magnitude, section)?
        } else {
            Self::format_literals(magnitude, section)
        };

        if auto_minus && value < 0.0 {
            Some(format!("-{}", body))
        } else {
            Some(body)
        }
    }

    /// 値に対応するセクションを選ぶ
    ///
    /// 2つ目の値は、負数に`-`を自動で付けるかどうかです。負数セクションを
    /// 明示した書式では付けません。
    fn select_section(&self, value: f64) -> Option<(&FormatSection, bool)> {
        let numeric: Vec<&FormatSection> = self
            .sections
            .iter()
            .filter(|section| section.kind != SectionKind::Text)
            .collect();

        // 条件付き: 条件を満たす最初のセクション（条件のないセクションは残りすべて）
        if numeric.iter().any(|section| section.condition.is_some()) {
            return numeric
                .into_iter()
                .find(|section| {
                    section
                        .condition
                        .as_ref()
                        .map_or(true, |condition| condition.matches(value))
                })
                .map(|section| (section, true));
        }

        match *numeric.as_slice() {
            [] => None,
            [only] => Some((only, true)),
            [positive, negative] => {
                if value < 0.0 {
                    Some((negative, false))
                } else {
                    Some((positive, false))
                }
            }
            [positive, negative, zero, ..] => {
                if value > 0.0 {
                    Some((positive, false))
                } else if value < 0.0 {
                    Some((negative, false))
                } else {
                    Some((zero, false))
                }
            }
        }
    }

    /// 桁プレースホルダーを含まないセクション（リテラルと「標準」だけ）
    fn format_literals(magnitude: f64, section: &FormatSection) -> String {
        let mut result = String::new();
        for token in &section.tokens {
            match token {
                FormatToken::Literal(s) => result.push_str(s),
                FormatToken::General | FormatToken::Text => {
                    result.push_str(&format_general(magnitude))
                }
                FormatToken::Percent => result.push('%'),
                _ => {}
            }
        }
        result
    }

    /// 桁プレースホルダーを含むセクション
    fn format_digits(magnitude: f64, section: &FormatSection) -> Option<String> {
        let layout = Layout::of(section);
        let fraction_places = layout.fraction.len();

        let scaled = magnitude * 100f64.powi(layout.percents) / 1000f64.powi(layout.scale);
        let (mantissa, exponent) = match layout.exponent_at {
            Some(_) => layout.scientific(scaled)?,
            None => (scaled, 0),
        };

        let rounded = round_half_away(mantissa, fraction_places);
        let text = format!("{:.*}", fraction_places, rounded);
        let (int_digits, frac_digits) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let integer = layout.integer_pieces(int_digits);
        let fraction = layout.fraction_text(frac_digits);

        let mut result = String::new();
        let mut next_integer = 0;
        for (idx, token) in section.tokens.iter().enumerate() {
            let in_exponent = layout.exponent_at.is_some_and(|at| idx > at);
            match token {
                t if t.is_digit() => {
                    if !in_exponent && layout.decimal_at.map_or(true, |at| idx < at) {
                        if let Some(piece) = integer.get(next_integer) {
                            result.push_str(piece);
                        }
                        next_integer += 1;
                    }
                }
                FormatToken::DecimalPoint if Some(idx) == layout.decimal_at => {
                    if layout.integer.is_empty() {
                        // 整数部の桁がない書式（".00"）でも1以上の整数部は出力する
                        result.push_str(&layout.leading_digits(int_digits));
                    }
                    result.push('.');
                    result.push_str(&fraction);
                }
                FormatToken::Exponent { plus } if Some(idx) == layout.exponent_at => {
                    let sign = if exponent < 0 {
                        "-"
                    } else if *plus {
                        "+"
                    } else {
                        ""
                    };
                    result.push('E');
                    result.push_str(sign);
                    result.push_str(&format!(
                        "{:0width$}",
                        exponent.unsigned_abs(),
                        width = layout.exponent_width
                    ));
                }
                FormatToken::Percent => result.push('%'),
                FormatToken::Literal(s) => result.push_str(s),
                _ => {}
            }
        }

        Some(result)
    }
}

/// 桁プレースホルダーの配置
#[derive(Debug, Default)]
struct Layout {
    /// 整数部のプレースホルダー（左から順）
    integer: Vec<FormatToken>,

    /// 小数部のプレースホルダー（左から順）
    fraction: Vec<FormatToken>,

    /// 小数点トークンの位置
    decimal_at: Option<usize>,

    /// 指数トークンの位置
    exponent_at: Option<usize>,

    /// 指数部の最小桁数
    exponent_width: usize,

    /// 桁区切りを入れるか
    grouping: bool,

    /// 末尾の`,`の数（1つにつき1000で割る）
    scale: i32,

    /// `%`の数（1つにつき100倍）
    percents: i32,
}

impl Layout {
    fn of(section: &FormatSection) -> Self {
        let tokens = &section.tokens;
        let exponent_at = tokens
            .iter()
            .position(|t| matches!(t, FormatToken::Exponent { .. }));
        let mantissa_end = exponent_at.unwrap_or(tokens.len());
        let decimal_at = tokens[..mantissa_end]
            .iter()
            .position(|t| matches!(t, FormatToken::DecimalPoint));
        let integer_end = decimal_at.unwrap_or(mantissa_end);

        let mut layout = Layout {
            decimal_at,
            exponent_at,
            ..Default::default()
        };

        for (idx, token) in tokens.iter().enumerate() {
            match token {
                t if t.is_digit() => {
                    if idx < integer_end {
                        layout.integer.push(t.clone());
                    } else if idx < mantissa_end {
                        layout.fraction.push(t.clone());
                    } else if *t == FormatToken::Zero {
                        layout.exponent_width += 1;
                    }
                }
                FormatToken::Comma if idx < mantissa_end => {
                    let end = if idx < integer_end {
                        integer_end
                    } else {
                        mantissa_end
                    };
                    let digit_follows = tokens[idx + 1..end].iter().any(FormatToken::is_digit);
                    if idx < integer_end && digit_follows {
                        layout.grouping = true;
                    } else if !digit_follows {
                        layout.scale += 1;
                    }
                }
                FormatToken::Percent => layout.percents += 1,
                _ => {}
            }
        }

        layout
    }

    /// 指数表記の仮数部と指数を求める
    ///
    /// 整数部が`#`で始まる複数桁の書式（`##0.0E+0`）では、指数を整数部の桁数の
    /// 倍数にそろえます。
    fn scientific(&self, value: f64) -> Option<(f64, i32)> {
        if value == 0.0 {
            return Some((0.0, 0));
        }

        let places = self.integer.len().max(1) as i32;
        let engineering = places > 1 && self.integer.first() == Some(&FormatToken::Hash);
        let step = if engineering { places } else { 1 };

        let magnitude = value.log10().floor() as i32;
        let mut exponent = if engineering {
            magnitude.div_euclid(places) * places
        } else {
            magnitude - (places - 1)
        };

        let mut mantissa = value / 10f64.powi(exponent);
        // 丸めで桁が繰り上がる場合（9.999 -> 10.00）
        if round_half_away(mantissa, self.fraction.len()) >= 10f64.powi(places) {
            exponent += step;
            mantissa = value / 10f64.powi(exponent);
        }

        mantissa.is_finite().then_some((mantissa, exponent))
    }

    /// 整数部のプレースホルダーの数だけ、各プレースホルダーに対応する文字列を返す
    ///
    /// 桁は右から順に割り当て、余った上位の桁は先頭のプレースホルダーに入れます。
    /// 桁数が足りない位置は、`0`なら0、`?`なら空白、`#`なら何も出力しません。
    fn integer_pieces(&self, int_digits: &str) -> Vec<String> {
        let digits: Vec<char> = self.significant_digits(int_digits).chars().collect();
        let count = self.integer.len();
        let mut pieces = vec![String::new(); count];

        for (idx, token) in self.integer.iter().enumerate() {
            let position = count - 1 - idx;
            let piece = &mut pieces[idx];

            if idx == 0 && digits.len() > count {
                let overflow = digits.len() - count;
                for (i, &ch) in digits[..overflow].iter().enumerate() {
                    self.push_digit(piece, ch, digits.len() - 1 - i);
                }
            }

            if position < digits.len() {
                self.push_digit(piece, digits[digits.len() - 1 - position], position);
            } else {
                match token {
                    FormatToken::Zero => self.push_digit(piece, '0', position),
                    FormatToken::Question => piece.push(' '),
                    _ => {}
                }
            }
        }

        pieces
    }

    /// 整数部のプレースホルダーがない書式で小数点の前に置く桁
    fn leading_digits(&self, int_digits: &str) -> String {
        let digits = self.significant_digits(int_digits);
        let mut result = String::new();
        for (i, ch) in digits.chars().enumerate() {
            self.push_digit(&mut result, ch, digits.len() - 1 - i);
        }
        result
    }

    /// 整数部が0で`0`プレースホルダーもない場合は桁を出さない（"#.##" -> ".5"）
    fn significant_digits<'a>(&self, int_digits: &'a str) -> &'a str {
        if int_digits == "0" && !self.integer.contains(&FormatToken::Zero) {
            ""
        } else {
            int_digits
        }
    }

    /// 桁を追加し、必要なら桁区切りを入れる（positionは右から数えた桁位置）
    fn push_digit(&self, piece: &mut String, ch: char, position: usize) {
        piece.push(ch);
        if self.grouping && position > 0 && position % 3 == 0 {
            piece.push(',');
        }
    }

    /// 小数部の文字列（末尾の不要な0は`#`なら削除、`?`なら空白）
    fn fraction_text(&self, frac_digits: &str) -> String {
        let mut digits: Vec<Option<char>> = frac_digits.chars().map(Some).collect();

        for idx in (0..digits.len()).rev() {
            if digits[idx] != Some('0') {
                break;
            }
            match self.fraction.get(idx) {
                Some(FormatToken::Hash) => digits[idx] = None,
                Some(FormatToken::Question) => digits[idx] = Some(' '),
                _ => break,
            }
        }

        digits.into_iter().flatten().collect()
    }
}

/// 指定桁数で四捨五入（0.5は0から遠い方へ）
fn round_half_away(value: f64, places: usize) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if scaled.is_finite() && scaled.abs() < 1e15 {
        scaled.round() / factor
    } else {
        value
    }
}

/// Excelの「標準」書式に近い一般表記（`1.0` -> `1`、`-0.0` -> `0`）
pub(crate) fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format_string: &str, value: f64) -> Option<String> {
        FormatParser::parse(format_string)
            .unwrap()
            .format_number(value)
    }

    #[test]
    fn test_split_sections() {
        let sections = FormatParser::split_sections("0;0;0;@").unwrap();
        assert_eq!(sections, vec!["0", "0", "0", "@"]);

        let sections = FormatParser::split_sections("0.00").unwrap();
        assert_eq!(sections, vec!["0.00"]);

        // 引用符・ブラケット・エスケープ内の';'は区切りではない
        let sections = FormatParser::split_sections(r#""a;b"0;[<;]0;\;0"#).unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[2], r"\;0");
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        assert!(FormatParser::parse("0\"kg").is_err());
        assert!(FormatParser::parse("[Red0").is_err());
    }

    #[test]
    fn test_parse_tokens() {
        let parser = FormatParser::parse("#,##0.00").unwrap();
        assert_eq!(
            parser.sections[0].tokens,
            vec![
                FormatToken::Hash,
                FormatToken::Comma,
                FormatToken::Hash,
                FormatToken::Hash,
                FormatToken::Zero,
                FormatToken::DecimalPoint,
                FormatToken::Zero,
                FormatToken::Zero,
            ]
        );
    }

    #[test]
    fn test_format_integer() {
        assert_eq!(format("0", 123.0).as_deref(), Some("123"));
        assert_eq!(format("0", 0.0).as_deref(), Some("0"));
        assert_eq!(format("0", 2.5).as_deref(), Some("3"));
        assert_eq!(format("00000", 123.0).as_deref(), Some("00123"));
        assert_eq!(format("#", 0.0).as_deref(), Some(""));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format("0.00", 123.456).as_deref(), Some("123.46"));
        assert_eq!(format("0.00", 0.1).as_deref(), Some("0.10"));
        assert_eq!(format("0.00", 999.999).as_deref(), Some("1000.00"));
        assert_eq!(format("0.0#", 1.5).as_deref(), Some("1.5"));
        assert_eq!(format("0.0#", 1.25).as_deref(), Some("1.25"));
        assert_eq!(format("#.##", 0.5).as_deref(), Some(".5"));
        assert_eq!(format(".00", 1.5).as_deref(), Some("1.50"));
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format("0%", 0.25).as_deref(), Some("25%"));
        assert_eq!(format("0.00%", 0.12345).as_deref(), Some("12.35%"));
    }

    #[test]
    fn test_format_thousand_separator() {
        assert_eq!(format("#,##0.00", 1234.5).as_deref(), Some("1,234.50"));
        assert_eq!(format("#,##0", 1234567.0).as_deref(), Some("1,234,567"));
        assert_eq!(format("#,##0", 12.0).as_deref(), Some("12"));
        assert_eq!(format("#,##0", -1234.0).as_deref(), Some("-1,234"));
    }

    #[test]
    fn test_format_scaling_commas() {
        assert_eq!(format("0,", 1234567.0).as_deref(), Some("1235"));
        assert_eq!(format("0.0,,", 1234567.0).as_deref(), Some("1.2"));
        assert_eq!(format("#,##0,\"K\"", 1234567.0).as_deref(), Some("1,235K"));
    }

    #[test]
    fn test_format_literals_between_digits() {
        assert_eq!(format("000-0000", 1234567.0).as_deref(), Some("123-4567"));
        assert_eq!(format("0 \"kg\"", 5.0).as_deref(), Some("5 kg"));
        assert_eq!(format("\\$0.00", 3.0).as_deref(), Some("$3.00"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format("$#,##0.00", 1234.5).as_deref(), Some("$1,234.50"));
        assert_eq!(format("[$€-407]#,##0.00", 1234.5).as_deref(), Some("€1,234.50"));
        // 会計書式: 空白の幅と繰り返しは出力しない
        assert_eq!(
            format("_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)", 1234.5).as_deref(),
            Some("$1,234.50")
        );
    }

    #[test]
    fn test_format_negative_sections() {
        assert_eq!(format("#,##0;(#,##0)", -1234.0).as_deref(), Some("(1,234)"));
        assert_eq!(format("#,##0;(#,##0)", 1234.0).as_deref(), Some("1,234"));
        assert_eq!(format("0;-0;\"zero\"", 0.0).as_deref(), Some("zero"));
        // ゼロのセクションが空ならゼロは表示しない
        assert_eq!(format("0;-0;;@", 0.0).as_deref(), Some(""));
    }

    #[test]
    fn test_format_conditions() {
        assert_eq!(format("[>=100]\"big \"0;0", 150.0).as_deref(), Some("big 150"));
        assert_eq!(format("[>=100]\"big \"0;0", 5.0).as_deref(), Some("5"));
        // 条件を満たすセクションがない
        assert_eq!(format("[>=100]0;[<0]0", 5.0), None);
    }

    #[test]
    fn test_format_color_ignored() {
        assert_eq!(format("[Red]0", 123.0).as_deref(), Some("123"));
        assert_eq!(format("0;[Red]-0", -5.0).as_deref(), Some("-5"));
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format("0.00E+00", 12345.0).as_deref(), Some("1.23E+04"));
        assert_eq!(format("0.00E+00", 0.00012).as_deref(), Some("1.20E-04"));
        assert_eq!(format("0.00E+00", 0.0).as_deref(), Some("0.00E+00"));
        assert_eq!(format("0.00E+00", 99999.0).as_deref(), Some("1.00E+05"));
        assert_eq!(format("##0.0E+0", 12345.0).as_deref(), Some("12.3E+3"));
    }

    #[test]
    fn test_format_general_and_text() {
        assert_eq!(format("General", 1234.5).as_deref(), Some("1234.5"));
        assert_eq!(format("@", 42.0).as_deref(), Some("42"));
        assert_eq!(format("", 1.0).as_deref(), Some("1"));
        assert_eq!(format("General;-General", -2.0).as_deref(), Some("-2"));
    }

    #[test]
    fn test_unsupported_formats_fall_back() {
        assert_eq!(format("yyyy-mm-dd", 45000.0), None);
        assert_eq!(format("h:mm AM/PM", 0.5), None);
        assert_eq!(format("[h]:mm:ss", 1.5), None);
        assert_eq!(format("# ?/?", 1.5), None);
        assert_eq!(format("0", f64::NAN), None);
    }

    #[test]
    fn test_format_general_function() {
        assert_eq!(format_general(0.0), "0");
        assert_eq!(format_general(-0.0), "0");
        assert_eq!(format_general(1.0), "1");
        assert_eq!(format_general(-7.0), "-7");
        assert_eq!(format_general(123.45), "123.45");
        assert_eq!(format_general(1e20), "100000000000000000000");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_grouped_integers_round_trip(value in 0u64..1_000_000_000_000u64) {
                let formatted = format("#,##0", value as f64).unwrap();
                prop_assert_eq!(formatted.replace(',', ""), value.to_string());
                // 区切りの間は常に3桁
                for group in formatted.split(',').skip(1) {
                    prop_assert_eq!(group.len(), 3);
                }
            }

            #[test]
            fn test_fixed_decimals_have_exact_places(value in -1.0e9f64..1.0e9f64) {
                let formatted = format("0.000", value).unwrap();
                let (_, fraction) = formatted.split_once('.').unwrap();
                prop_assert_eq!(fraction.len(), 3);
            }
        }
    }
}
