use crate::{
    ast::{Operator, Token},
    expression::ExprError,
};

/// Tokenizer for filter expressions.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Single-quoted, no escapes: the literal ends at the next quote.
    fn read_string(&mut self) -> Result<String, ExprError> {
        let start = self.position;
        let mut result = String::new();
        self.advance();

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\'' {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(ExprError::MalformedExpression(format!(
            "unterminated string starting at position {}",
            start
        )))
    }

    fn read_number(&mut self) -> Result<Token, ExprError> {
        let mut number = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !seen_dot
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|e| ExprError::MalformedExpression(format!("invalid number '{}': {}", number, e)))
    }

    /// Consumes `ch` and, if it is followed by `second`, that too.
    fn one_or_two(&mut self, second: char, single: Operator, double: Operator) -> Token {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            Token::Operator(double)
        } else {
            Token::Operator(single)
        }
    }

    fn single(&mut self, op: Operator) -> Token {
        self.advance();
        Token::Operator(op)
    }

    pub fn next_token(&mut self) -> Result<Token, ExprError> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('+') => self.single(Operator::Add),
            Some('-') => self.single(Operator::Subtract),
            Some('*') => self.single(Operator::Multiply),
            Some('/') => self.single(Operator::Divide),
            Some('^') => self.single(Operator::Power),
            Some('~') => self.single(Operator::Matches),
            Some('&') => self.one_or_two('&', Operator::And, Operator::And),
            Some('|') => self.one_or_two('|', Operator::Or, Operator::Or),
            Some('<') => self.one_or_two('=', Operator::LessThan, Operator::LessEqual),
            Some('>') => self.one_or_two('=', Operator::GreaterThan, Operator::GreaterEqual),
            Some('!') => self.one_or_two('=', Operator::Not, Operator::NotEqual),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::Operator(Operator::Equal)
                } else {
                    return Err(ExprError::MalformedExpression(format!(
                        "unexpected '=' at position {} (did you mean '=='?)",
                        self.position
                    )));
                }
            }
            Some('\'') => Token::String(self.read_string()?),
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => Token::Identifier(self.read_identifier()),
            Some(ch) => {
                return Err(ExprError::MalformedExpression(format!(
                    "unexpected character '{}' at position {}",
                    ch, self.position
                )));
            }
        };
        Ok(token)
    }

    /// Reads every token up to, not including, [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_operator_wins() {
        let tokens = Lexer::new("<= >= == != && || < > ! & |").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Operator(Operator::LessEqual),
                Token::Operator(Operator::GreaterEqual),
                Token::Operator(Operator::Equal),
                Token::Operator(Operator::NotEqual),
                Token::Operator(Operator::And),
                Token::Operator(Operator::Or),
                Token::Operator(Operator::LessThan),
                Token::Operator(Operator::GreaterThan),
                Token::Operator(Operator::Not),
                Token::Operator(Operator::And),
                Token::Operator(Operator::Or),
            ]
        );
    }

    #[test]
    fn test_literals() {
        let mut lexer = Lexer::new("12 3.25 'a b' true");
        assert_eq!(lexer.next_token().unwrap(), Token::Number(12.0));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(3.25));
        assert_eq!(lexer.next_token().unwrap(), Token::String("a b".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("true".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_string_keeps_regex_escapes() {
        let mut lexer = Lexer::new(r"'\d+'");
        assert_eq!(lexer.next_token().unwrap(), Token::String(r"\d+".to_string()));
    }

    #[test]
    fn test_rejects_unknown_characters() {
        assert!(Lexer::new("@.name > 1").tokenize().is_err());
        assert!(Lexer::new("a = b").tokenize().is_err());
        assert!(Lexer::new("'open").tokenize().is_err());
    }
}
