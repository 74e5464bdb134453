//! FormatSection Module
//!
//! 数値書式文字列のセクション定義を提供します。

use super::tokens::FormatToken;

/// セクションの種類（書式文字列内の位置で決まる）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    /// 正数
    Positive,
    /// 負数
    Negative,
    /// ゼロ
    Zero,
    /// テキスト
    Text,
}

impl SectionKind {
    /// `;`で区切られたセクションの位置から種類を決める
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SectionKind::Positive),
            1 => Some(SectionKind::Negative),
            2 => Some(SectionKind::Zero),
            3 => Some(SectionKind::Text),
            _ => None,
        }
    }
}

/// 比較演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// 条件（例: `[>100]`, `[<=-5.5]`）
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Condition {
    /// ブラケット内の文字列を条件として解析
    ///
    /// 比較演算子で始まらない場合（色指定など）は`None`を返します。
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        let (comparison, rest) = [
            ("<=", Comparison::Le),
            (">=", Comparison::Ge),
            ("<>", Comparison::Ne),
            ("<", Comparison::Lt),
            (">", Comparison::Gt),
            ("=", Comparison::Eq),
        ]
        .into_iter()
        .find_map(|(op, comparison)| content.strip_prefix(op).map(|rest| (comparison, rest)))?;

        let threshold = rest.trim().parse().ok()?;
        Some(Self {
            comparison,
            threshold,
        })
    }

    /// 値が条件を満たすか
    pub fn matches(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Lt => value < self.threshold,
            Comparison::Le => value <= self.threshold,
            Comparison::Gt => value > self.threshold,
            Comparison::Ge => value >= self.threshold,
            Comparison::Eq => value == self.threshold,
            Comparison::Ne => value != self.threshold,
        }
    }
}

/// 書式のセクション（正数、負数、ゼロ、テキスト）
#[derive(Debug, Clone)]
pub(crate) struct FormatSection {
    /// セクションの種類
    pub kind: SectionKind,

    /// 条件（例: `[>100]`）
    pub condition: Option<Condition>,

    /// 書式トークン
    pub tokens: Vec<FormatToken>,
}

impl FormatSection {
    /// 新しいセクションを生成
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            condition: None,
            tokens: Vec::new(),
        }
    }

    /// 桁プレースホルダーを含むか
    pub fn has_digits(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_digit)
    }

    /// 日付・時刻や分数など、数値として整形できない要素を含むか
    pub fn is_unsupported(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_unsupported)
    }

    /// 「標準」または"@"の位置に一般表記の数値を置くセクションか
    pub fn has_general(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, FormatToken::General | FormatToken::Text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_new() {
        let section = FormatSection::new(SectionKind::Positive);
        assert_eq!(section.kind, SectionKind::Positive);
        assert!(section.condition.is_none());
        assert!(section.tokens.is_empty());
        assert!(!section.has_digits());
    }

    #[test]
    fn test_kind_from_index() {
        assert_eq!(SectionKind::from_index(0), Some(SectionKind::Positive));
        assert_eq!(SectionKind::from_index(3), Some(SectionKind::Text));
        assert_eq!(SectionKind::from_index(4), None);
    }

    #[test]
    fn test_condition_parse() {
        let condition = Condition::parse(">=100").unwrap();
        assert_eq!(condition.comparison, Comparison::Ge);
        assert_eq!(condition.threshold, 100.0);

        let condition = Condition::parse("<-5.5").unwrap();
        assert_eq!(condition.comparison, Comparison::Lt);
        assert_eq!(condition.threshold, -5.5);

        assert!(Condition::parse("Red").is_none());
        assert!(Condition::parse(">abc").is_none());
    }

    #[test]
    fn test_condition_matches() {
        let condition = Condition::parse("<>0").unwrap();
        assert!(condition.matches(1.0));
        assert!(!condition.matches(0.0));

        let condition = Condition::parse("<=10").unwrap();
        assert!(condition.matches(10.0));
        assert!(!condition.matches(10.5));
    }

    #[test]
    fn test_section_classification() {
        let mut section = FormatSection::new(SectionKind::Positive);
        section.tokens.push(FormatToken::Literal("$".to_string()));
        assert!(!section.has_digits());
        assert!(!section.is_unsupported());

        section.tokens.push(FormatToken::Zero);
        assert!(section.has_digits());

        section.tokens.push(FormatToken::DateTime);
        assert!(section.is_unsupported());

        let mut general = FormatSection::new(SectionKind::Text);
        general.tokens.push(FormatToken::Text);
        assert!(general.has_general());
    }
}
