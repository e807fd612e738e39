use crate::{
    ast::{Operator, Postfix, Token},
    expression::ExprError,
    lexer::Lexer,
};

/// Infix to postfix conversion of filter expressions (shunting-yard).
///
/// Operands go straight to the output. An operator first moves every stacked
/// operator that binds at least as tightly (strictly tighter for
/// right-associative ones) to the output, then is stacked itself. `(` is
/// stacked unconditionally and `)` unstacks operators until its partner.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

/// Entry on the operator stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stacked {
    Operator(Operator),
    LParen,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ExprError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), ExprError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    /// Consumes the whole input and returns it in postfix order.
    pub fn parse(&mut self) -> Result<Vec<Postfix>, ExprError> {
        let mut output = Vec::new();
        let mut operators: Vec<Stacked> = Vec::new();

        loop {
            match std::mem::replace(&mut self.current_token, Token::Eof) {
                Token::Eof => break,
                Token::Number(n) => output.push(Postfix::Number(n)),
                Token::String(s) => output.push(Postfix::String(s)),
                Token::Identifier(name) => output.push(Postfix::Identifier(name)),
                Token::LParen => operators.push(Stacked::LParen),
                Token::RParen => Self::close_paren(&mut output, &mut operators)?,
                Token::Operator(op) => Self::push_operator(&mut output, &mut operators, op),
            }
            self.advance()?;
        }

        while let Some(top) = operators.pop() {
            match top {
                Stacked::Operator(op) => output.push(Postfix::Operator(op)),
                Stacked::LParen => {
                    return Err(ExprError::MalformedExpression(
                        "unclosed '(' in expression".to_string(),
                    ));
                }
            }
        }

        Ok(output)
    }

    fn push_operator(output: &mut Vec<Postfix>, operators: &mut Vec<Stacked>, op: Operator) {
        // A prefix operator has no left operand yet, so nothing on the stack
        // can be complete.
        if !op.is_unary() {
            while let Some(Stacked::Operator(top)) = operators.last().copied() {
                let pops = if op.is_right_associative() {
                    top.precedence() > op.precedence()
                } else {
                    top.precedence() >= op.precedence()
                };
                if !pops {
                    break;
                }
                output.push(Postfix::Operator(top));
                operators.pop();
            }
        }
        operators.push(Stacked::Operator(op));
    }

    fn close_paren(output: &mut Vec<Postfix>, operators: &mut Vec<Stacked>) -> Result<(), ExprError> {
        while let Some(top) = operators.pop() {
            match top {
                Stacked::LParen => return Ok(()),
                Stacked::Operator(op) => output.push(Postfix::Operator(op)),
            }
        }
        Err(ExprError::MalformedExpression(
            "unmatched ')' in expression".to_string(),
        ))
    }
}

/// Tokenizes and converts `infix` in one step.
pub fn to_postfix(infix: &str) -> Result<Vec<Postfix>, ExprError> {
    Parser::new(Lexer::new(infix))?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(items: &[Postfix]) -> String {
        items
            .iter()
            .map(|item| match item {
                Postfix::Number(n) => n.to_string(),
                Postfix::String(s) => format!("'{}'", s),
                Postfix::Identifier(name) => name.clone(),
                Postfix::Operator(op) => op.symbol().to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_arithmetic_binds_tighter_than_comparison() {
        let postfix = to_postfix("(3 + 4) * 2 == 14").unwrap();
        assert_eq!(render(&postfix), "3 4 + 2 * 14 ==");
    }

    #[test]
    fn test_logical_operators_bind_loosest() {
        let postfix = to_postfix("1 > 2 || 3 <= 3 && 1").unwrap();
        assert_eq!(render(&postfix), "1 2 > 3 3 <= 1 && ||");
    }

    #[test]
    fn test_left_associative_subtraction() {
        assert_eq!(render(&to_postfix("10 - 4 - 3").unwrap()), "10 4 - 3 -");
    }

    #[test]
    fn test_right_associative_power() {
        assert_eq!(render(&to_postfix("2 ^ 3 ^ 2").unwrap()), "2 3 2 ^ ^");
    }

    #[test]
    fn test_prefix_not() {
        assert_eq!(render(&to_postfix("!true").unwrap()), "true !");
        assert_eq!(render(&to_postfix("1 == !false").unwrap()), "1 false ! ==");
        assert_eq!(render(&to_postfix("!!true").unwrap()), "true ! !");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(to_postfix("(1 > 2").is_err());
        assert!(to_postfix("1 > 2)").is_err());
    }
}
