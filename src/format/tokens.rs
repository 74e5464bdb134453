//! FormatToken Module
//!
//! 数値書式文字列のトークン定義を提供します。

/// 書式トークン
///
/// 書式文字列の1セクションを字句解析した結果です。桁プレースホルダーは1文字につき
/// 1トークンになります（"#,##0" -> Hash, Comma, Hash, Hash, Zero）。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormatToken {
    /// 必須の桁（"0"）。不足分は0で埋める
    Zero,

    /// 省略可能な桁（"#"）
    Hash,

    /// 空白で埋める桁（"?"）
    Question,

    /// 小数点
    DecimalPoint,

    /// ","（桁の間では桁区切り、桁の直後では1000で割る）
    Comma,

    /// パーセント記号（値を100倍する）
    Percent,

    /// 指数表記（"E+" / "E-"）
    ///
    /// `plus`が`true`のとき正の指数にも`+`を付けます。
    Exponent { plus: bool },

    /// リテラル文字列（引用符・`\`でエスケープされた文字、記号など）
    Literal(String),

    /// テキストプレースホルダー（"@"）
    Text,

    /// 「標準」書式（"General"）
    General,

    /// 日付・時刻の要素（y, m, d, h, s, AM/PM, [h]など）
    DateTime,

    /// 分数の区切り（"# ?/?"）
    Slash,
}

impl FormatToken {
    /// 桁プレースホルダーかどうか
    pub fn is_digit(&self) -> bool {
        matches!(
            self,
            FormatToken::Zero | FormatToken::Hash | FormatToken::Question
        )
    }

    /// 数値書式として扱えないトークンかどうか
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FormatToken::DateTime | FormatToken::Slash)
    }
}
