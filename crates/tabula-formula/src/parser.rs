//! Formula parser
//!
//! A recursive descent parser with proper operator precedence.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use tabula_core::{CellError, Position};

/// Parse a formula string into an AST
///
/// The input is the full cell text, including the leading `=`; the
/// expression body is the remainder with surrounding whitespace ignored.
///
/// # Example
/// ```rust
/// use tabula_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=(A1+B2)/2").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<Expr> {
    let formula = formula.trim();

    let body = formula
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let mut parser = FormulaParser::new(body);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected characters after expression: '{}'",
            &parser.input[parser.token_start..]
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    /// Cell reference; `None` is a syntactically valid reference outside
    /// the sheet bounds
    Reference(Option<Position>),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    /// Byte offset where the current token begins (for error reporting)
    token_start: usize,
    current_token: Option<Token>,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            token_start: 0,
            current_token: None,
        }
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = Some(self.scan_token()?);
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let c = self.peek_char().unwrap();

        match c {
            '+' => {
                self.advance();
                return Ok(Token::Plus);
            }
            '-' => {
                self.advance();
                return Ok(Token::Minus);
            }
            '*' => {
                self.advance();
                return Ok(Token::Star);
            }
            '/' => {
                self.advance();
                return Ok(Token::Slash);
            }
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            _ => {}
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Cell reference
        if c.is_ascii_alphabetic() {
            return self.scan_reference();
        }

        // The #REF! sentinel round-trips from canonical printing
        if c == '#' {
            return self.scan_error_ref();
        }

        Err(FormulaError::Parse(format!("Unexpected character: '{}'", c)))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            if !self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                return Err(FormulaError::Parse("Malformed number exponent".into()));
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        let num: f64 = num_str
            .parse()
            .map_err(|_| FormulaError::Parse(format!("Invalid number: '{}'", num_str)))?;
        Ok(Token::Number(num))
    }

    fn scan_reference(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric())
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if !Self::is_cell_reference(text) {
            return Err(FormulaError::Parse(format!(
                "Expected a cell reference, got '{}'",
                text
            )));
        }

        // Out-of-bounds references stay parseable and evaluate to #REF!;
        // malformed ones (leading-zero row etc.) fail the parse.
        match Position::parse(text) {
            Ok(pos) => Ok(Token::Reference(Some(pos))),
            Err(e) if e.is_out_of_bounds() => Ok(Token::Reference(None)),
            Err(e) => Err(FormulaError::Parse(format!(
                "Invalid cell reference '{}': {}",
                text, e
            ))),
        }
    }

    fn scan_error_ref(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // '#'
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '!' || c == '/')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if CellError::from_str(text) == Some(CellError::Ref) {
            Ok(Token::Reference(None))
        } else {
            Err(FormulaError::Parse(format!(
                "Unexpected error literal: '{}'",
                text
            )))
        }
    }

    fn is_cell_reference(text: &str) -> bool {
        // Letters followed by digits, nothing else
        let letter_count = text.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        if letter_count == 0 || letter_count == text.len() {
            return false;
        }
        text[letter_count..].chars().all(|c| c.is_ascii_digit())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary sign: +, -
    // 4. Primary: numbers, references, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        if self.current_token.is_none() {
            self.advance_token()?;
            if matches!(self.current_token(), Token::Eof) {
                return Err(FormulaError::Parse("Empty formula".into()));
            }
        }
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        let op = match self.current_token() {
            Token::Minus => Some(UnaryOperator::Negate),
            Token::Plus => Some(UnaryOperator::Plus),
            _ => None,
        };

        if let Some(op) = op {
            self.consume()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(Expr::Number(n))
            }

            Token::Reference(pos) => {
                self.consume()?;
                Ok(Expr::Reference(pos))
            }

            Token::LeftParen => {
                self.consume()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), Expr::Number(42.0));
        assert_eq!(parse_formula("=3.14").unwrap(), Expr::Number(3.14));
        assert_eq!(parse_formula("=1e10").unwrap(), Expr::Number(1e10));
        assert_eq!(parse_formula("=2.5e-3").unwrap(), Expr::Number(2.5e-3));
    }

    #[test]
    fn test_parse_cell_reference() {
        let expr = parse_formula("=A1").unwrap();
        assert_eq!(expr, Expr::Reference(Some(Position::new(0, 0))));

        // Lowercase is normalized
        let expr = parse_formula("=b2").unwrap();
        assert_eq!(expr, Expr::Reference(Some(Position::new(1, 1))));
    }

    #[test]
    fn test_parse_out_of_bounds_reference() {
        // Beyond the row limit: parseable, evaluates to #REF!
        let expr = parse_formula("=A20000").unwrap();
        assert_eq!(expr, Expr::Reference(None));

        // Beyond the column limit
        let expr = parse_formula("=XFE1").unwrap();
        assert_eq!(expr, Expr::Reference(None));

        // Far beyond any representable column or row
        let expr = parse_formula("=ZZZZZZ1").unwrap();
        assert_eq!(expr, Expr::Reference(None));
        let expr = parse_formula("=A99999999999").unwrap();
        assert_eq!(expr, Expr::Reference(None));
    }

    #[test]
    fn test_parse_ref_sentinel() {
        // The canonical form of an out-of-bounds reference re-parses
        let expr = parse_formula("=#REF!").unwrap();
        assert_eq!(expr, Expr::Reference(None));

        let expr = parse_formula("=#REF!+1").unwrap();
        assert_eq!(expr.to_string(), "#REF!+1");

        // Other error codes are not part of the surface
        assert!(parse_formula("=#DIV/0!").is_err());
        assert!(parse_formula("=#VALUE!").is_err());
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        let ast = parse_formula("=1+2*3").unwrap();
        // Should parse as 1+(2*3)
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, Expr::Number(1.0));
            assert!(matches!(
                *right,
                Expr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        // 1-2-3 parses as (1-2)-3
        let ast = parse_formula("=1-2-3").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Subtract);
            assert_eq!(*right, Expr::Number(3.0));
            assert!(matches!(
                *left,
                Expr::BinaryOp {
                    op: BinaryOperator::Subtract,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("=(1+2)*3").unwrap();
        if let Expr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                Expr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, Expr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_formula("=-5").unwrap();
        assert!(matches!(
            ast,
            Expr::UnaryOp {
                op: UnaryOperator::Negate,
                ..
            }
        ));

        let ast = parse_formula("=+A1").unwrap();
        assert!(matches!(
            ast,
            Expr::UnaryOp {
                op: UnaryOperator::Plus,
                ..
            }
        ));

        // Double negation nests
        let ast = parse_formula("=--1").unwrap();
        if let Expr::UnaryOp { operand, .. } = ast {
            assert!(matches!(*operand, Expr::UnaryOp { .. }));
        } else {
            panic!("Expected UnaryOp");
        }
    }

    #[test]
    fn test_parse_whitespace() {
        let expr = parse_formula("=  1 +  A1 * ( 2 - 3 ) ").unwrap();
        assert_eq!(expr.to_string(), "1+A1*(2-3)");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("1+2").is_err()); // No '='
        assert!(parse_formula("=").is_err()); // Empty body
        assert!(parse_formula("=   ").is_err());
        assert!(parse_formula("=1+").is_err());
        assert!(parse_formula("=(1+2").is_err()); // Unbalanced
        assert!(parse_formula("=1+2)").is_err()); // Trailing garbage
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("=A1B").is_err()); // Not a cell reference
        assert!(parse_formula("=A01").is_err()); // Leading-zero row
        assert!(parse_formula("=1$2").is_err());
        assert!(parse_formula("=\"text\"").is_err()); // No string literals
        assert!(parse_formula("=SUM(A1)").is_err()); // No functions
    }
}
