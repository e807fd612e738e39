use super::Operator;

/// Lexical tokens of a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Numeric literal, always read as floating point
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number(f64),

    /// String literal enclosed in single quotes, stored without the quotes
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// '\d{4}-\d{2}-\d{2}'
    /// ```
    String(String),

    /// Bare word
    ///
    /// By the time an expression is tokenized every `@.field` reference has
    /// been replaced by a literal, so the only words expected here are the
    /// boolean keywords `true` and `false`. Any other word is carried through
    /// as raw text.
    Identifier(String),

    /// Any arithmetic, comparison, logical or match operator
    Operator(Operator),

    /// `(`
    LParen,

    /// `)`
    RParen,

    /// End of input
    Eof,
}

/// One item of an expression in postfix (reverse Polish) order.
#[derive(Debug, Clone, PartialEq)]
pub enum Postfix {
    Number(f64),
    String(String),
    Identifier(String),
    Operator(Operator),
}
