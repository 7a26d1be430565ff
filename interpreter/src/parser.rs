use std::rc::Rc;

use monkey_core::{Lexer, Token, TokenType};

use crate::ast::{Block, Expr, Identifier, Program, Stmt};
use crate::error::ParseError;

/// Binding power of an infix position, lowest first. Derived ordering is what
/// the precedence-climbing loop compares with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn of(ty: TokenType) -> Precedence {
        match ty {
            TokenType::EqualEqual | TokenType::BangEqual => Precedence::Equals,
            TokenType::Less | TokenType::Greater => Precedence::LessGreater,
            TokenType::Plus | TokenType::Minus => Precedence::Sum,
            TokenType::Slash | TokenType::Asterisk => Precedence::Product,
            TokenType::LeftParen => Precedence::Call,
            TokenType::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

type StmtResult = Result<Stmt, ParseError>;
type ExprResult = Result<Expr, ParseError>;

/// Pratt parser over the lexer's token stream. Parsing is total: a diagnostic
/// is recorded for every malformed statement and parsing resumes at the next
/// token, so the returned program holds whatever parsed cleanly. Callers must
/// check `errors()` before evaluating.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();

        Parser {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur_token_is(TokenType::Eof) {
            match self.parse_statement() {
                Ok(stmt) => program.statements.push(stmt),
                // No resynchronization beyond stepping one token; anything
                // smarter would change which diagnostics surface.
                Err(err) => self.errors.push(err),
            }
            self.next_token();
        }

        program
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    fn parse_statement(&mut self) -> StmtResult {
        match self.cur_token.ty {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> StmtResult {
        self.expect_peek(TokenType::Ident)?;
        let name = Identifier::new(self.cur_token.literal.clone());

        self.expect_peek(TokenType::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Stmt::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> StmtResult {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Stmt::Return { value })
    }

    fn parse_expression_statement(&mut self) -> StmtResult {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Stmt::Expression { expression })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ExprResult {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenType::Semicolon)
            && precedence < Precedence::of(self.peek_token.ty)
        {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ExprResult {
        match self.cur_token.ty {
            TokenType::Ident => Ok(Expr::identifier(self.cur_token.literal.clone())),
            TokenType::Int => self.parse_integer_literal(),
            TokenType::String => Ok(Expr::string(self.cur_token.literal.clone())),
            TokenType::True | TokenType::False => {
                Ok(Expr::boolean(self.cur_token_is(TokenType::True)))
            }
            TokenType::Bang | TokenType::Minus => self.parse_prefix_expression(),
            TokenType::LeftParen => self.parse_grouped_expression(),
            TokenType::If => self.parse_if_expression(),
            TokenType::Function => self.parse_function_literal(),
            TokenType::LeftBracket => Ok(Expr::Array {
                elements: self.parse_expression_list(TokenType::RightBracket)?,
            }),
            TokenType::LeftBrace => self.parse_hash_literal(),
            ty => Err(ParseError::NoPrefixParseFn { ty }),
        }
    }

    // Only tokens with a precedence above `Lowest` reach this; of those, all
    // but call and index are binary operators.
    fn parse_infix(&mut self, left: Expr) -> ExprResult {
        match self.cur_token.ty {
            TokenType::LeftParen => self.parse_call_expression(left),
            TokenType::LeftBracket => self.parse_index_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_integer_literal(&mut self) -> ExprResult {
        let literal = &self.cur_token.literal;
        let value = literal
            .parse::<i64>()
            .map_err(|_| ParseError::BadIntegerLiteral {
                literal: literal.clone(),
            })?;
        Ok(Expr::integer(value))
    }

    fn parse_prefix_expression(&mut self) -> ExprResult {
        let operator = self.cur_token.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::prefix(operator, right))
    }

    // All binary operators are left-associative: the right side binds at the
    // operator's own precedence.
    fn parse_infix_expression(&mut self, left: Expr) -> ExprResult {
        let operator = self.cur_token.clone();
        let precedence = Precedence::of(operator.ty);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Ok(Expr::infix(left, operator, right))
    }

    fn parse_grouped_expression(&mut self) -> ExprResult {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightParen)?;
        Ok(expr)
    }

    fn parse_if_expression(&mut self) -> ExprResult {
        self.expect_peek(TokenType::LeftParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightParen)?;

        self.expect_peek(TokenType::LeftBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_token_is(TokenType::Else) {
            self.next_token();
            self.expect_peek(TokenType::LeftBrace)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    // Called with the opening brace current; ends on the closing brace.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut statements = Vec::new();
        self.next_token();

        while !self.cur_token_is(TokenType::RightBrace) && !self.cur_token_is(TokenType::Eof) {
            statements.push(self.parse_statement()?);
            self.next_token();
        }

        Ok(Block { statements })
    }

    fn parse_function_literal(&mut self) -> ExprResult {
        self.expect_peek(TokenType::LeftParen)?;
        let params = self.parse_function_params()?;

        self.expect_peek(TokenType::LeftBrace)?;
        let body = self.parse_block()?;

        Ok(Expr::Function {
            params: Rc::new(params),
            body: Rc::new(body),
        })
    }

    fn parse_function_params(&mut self) -> Result<Vec<Identifier>, ParseError> {
        let mut params = Vec::new();

        if self.peek_token_is(TokenType::RightParen) {
            self.next_token();
            return Ok(params);
        }

        self.expect_peek(TokenType::Ident)?;
        params.push(Identifier::new(self.cur_token.literal.clone()));

        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.expect_peek(TokenType::Ident)?;
            params.push(Identifier::new(self.cur_token.literal.clone()));
        }

        self.expect_peek(TokenType::RightParen)?;
        Ok(params)
    }

    fn parse_call_expression(&mut self, callee: Expr) -> ExprResult {
        let args = self.parse_expression_list(TokenType::RightParen)?;
        Ok(Expr::call(callee, args))
    }

    // Comma-separated expressions up to `end`; shared by calls and arrays.
    fn parse_expression_list(&mut self, end: TokenType) -> Result<Vec<Expr>, ParseError> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Ok(list)
    }

    fn parse_index_expression(&mut self, left: Expr) -> ExprResult {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightBracket)?;
        Ok(Expr::index(left, index))
    }

    // A trailing comma before the closing brace is allowed.
    fn parse_hash_literal(&mut self) -> ExprResult {
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenType::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenType::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(TokenType::RightBrace) {
                self.expect_peek(TokenType::Comma)?;
            }
        }

        self.expect_peek(TokenType::RightBrace)?;
        Ok(Expr::Hash { pairs })
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn cur_token_is(&self, ty: TokenType) -> bool {
        self.cur_token.ty == ty
    }

    fn peek_token_is(&self, ty: TokenType) -> bool {
        self.peek_token.ty == ty
    }

    fn expect_peek(&mut self, expected: TokenType) -> Result<(), ParseError> {
        if self.peek_token_is(expected) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected,
                actual: self.peek_token.ty,
            })
        }
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! token {
        ($ty:ident, $literal:literal) => {
            Token::new(TokenType::$ty, $literal)
        };
    }

    fn parse(input: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "parser errors for {:?}: {:?}",
            input,
            parser.errors()
        );
        program
    }

    fn parse_errors(input: &str) -> Vec<String> {
        let mut parser = Parser::new(Lexer::new(input));
        parser.parse_program();
        parser
            .into_errors()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn single_expression(input: &str) -> Expr {
        let mut program = parse(input);
        assert_eq!(
            program.statements.len(),
            1,
            "expected a single statement for {:?}",
            input
        );
        match program.statements.remove(0) {
            Stmt::Expression { expression } => expression,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_let_statements() {
        let tests = [
            ("let x = 5;", "x", Expr::integer(5)),
            ("let y = true;", "y", Expr::boolean(true)),
            ("let foobar = y;", "foobar", Expr::identifier("y")),
        ];

        for (input, name, value) in tests {
            let program = parse(input);
            assert_eq!(
                program.statements,
                vec![Stmt::Let {
                    name: Identifier::new(name),
                    value,
                }]
            );
            assert_eq!(program.statements[0].token_literal(), "let");
        }
    }

    #[test]
    fn test_let_statement_errors() {
        let tests = [
            (
                "let x 5;",
                "expected next token to be =, got INT instead.",
            ),
            (
                "let = 10;",
                "expected next token to be IDENT, got = instead.",
            ),
            (
                "let 838383;",
                "expected next token to be IDENT, got INT instead.",
            ),
        ];

        for (input, expected) in tests {
            let errors = parse_errors(input);
            assert!(
                errors.contains(&expected.to_string()),
                "missing {:?} in {:?}",
                expected,
                errors
            );
        }
    }

    #[test]
    fn test_return_statements() {
        let tests = [
            ("return 5;", Expr::integer(5)),
            ("return true;", Expr::boolean(true)),
            ("return foobar;", Expr::identifier("foobar")),
        ];

        for (input, value) in tests {
            let program = parse(input);
            assert_eq!(program.statements, vec![Stmt::Return { value }]);
            assert_eq!(program.statements[0].token_literal(), "return");
        }
    }

    #[test]
    fn test_literal_expressions() {
        assert_eq!(single_expression("foobar;"), Expr::identifier("foobar"));
        assert_eq!(single_expression("5;"), Expr::integer(5));
        assert_eq!(single_expression("true;"), Expr::boolean(true));
        assert_eq!(single_expression("false;"), Expr::boolean(false));
        assert_eq!(
            single_expression("\"hello world\";"),
            Expr::string("hello world")
        );
    }

    #[test]
    fn test_prefix_expressions() {
        let tests = [
            ("!5;", token!(Bang, "!"), Expr::integer(5)),
            ("-15;", token!(Minus, "-"), Expr::integer(15)),
            ("!true;", token!(Bang, "!"), Expr::boolean(true)),
        ];

        for (input, operator, right) in tests {
            assert_eq!(single_expression(input), Expr::prefix(operator, right));
        }
    }

    #[test]
    fn test_infix_expressions() {
        let operators = [
            ("+", token!(Plus, "+")),
            ("-", token!(Minus, "-")),
            ("*", token!(Asterisk, "*")),
            ("/", token!(Slash, "/")),
            ("<", token!(Less, "<")),
            (">", token!(Greater, ">")),
            ("==", token!(EqualEqual, "==")),
            ("!=", token!(BangEqual, "!=")),
        ];

        for (glyph, token) in operators {
            let input = format!("5 {} 5;", glyph);
            assert_eq!(
                single_expression(&input),
                Expr::infix(Expr::integer(5), token, Expr::integer(5))
            );
        }

        assert_eq!(
            single_expression("true != false;"),
            Expr::infix(
                Expr::boolean(true),
                token!(BangEqual, "!="),
                Expr::boolean(false)
            )
        );
    }

    #[test]
    fn test_operator_precedence() {
        let tests = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))",
            ),
            ("true", "true"),
            ("false", "false"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("3 < 5 == true", "((3 < 5) == true)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d)",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(parse(input).to_string(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_parse_is_idempotent_over_rendering() {
        let sources = [
            "let x = 5 + 5 * 2;",
            "-a * b",
            "add(a, b * c) + -d",
            "[1, 2 * 2, 3][1 + 1]",
            "{1: one, true: 2}[true]",
        ];

        for source in sources {
            let rendered = parse(source).to_string();
            assert_eq!(parse(&rendered).to_string(), rendered);
        }
    }

    #[test]
    fn test_if_expression() {
        let expr = single_expression("if (x < y) { x }");
        assert_eq!(
            expr,
            Expr::If {
                condition: Box::new(Expr::infix(
                    Expr::identifier("x"),
                    token!(Less, "<"),
                    Expr::identifier("y")
                )),
                consequence: Block {
                    statements: vec![Stmt::Expression {
                        expression: Expr::identifier("x"),
                    }],
                },
                alternative: None,
            }
        );
    }

    #[test]
    fn test_if_else_expression() {
        let expr = single_expression("if (x < y) { x } else { y }");
        match expr {
            Expr::If {
                alternative: Some(alternative),
                ..
            } => {
                assert_eq!(
                    alternative.statements,
                    vec![Stmt::Expression {
                        expression: Expr::identifier("y"),
                    }]
                );
            }
            other => panic!("expected if with alternative, got {:?}", other),
        }
    }

    #[test]
    fn test_function_literal() {
        let expr = single_expression("fn(x, y) { x + y; }");
        match expr {
            Expr::Function { params, body } => {
                assert_eq!(
                    params.as_ref(),
                    &vec![Identifier::new("x"), Identifier::new("y")]
                );
                assert_eq!(
                    body.statements,
                    vec![Stmt::Expression {
                        expression: Expr::infix(
                            Expr::identifier("x"),
                            token!(Plus, "+"),
                            Expr::identifier("y")
                        ),
                    }]
                );
            }
            other => panic!("expected function literal, got {:?}", other),
        }
    }

    #[test]
    fn test_function_params() {
        let tests: [(&str, &[&str]); 3] = [
            ("fn() {};", &[]),
            ("fn(x) {};", &["x"]),
            ("fn(x, y, z) {};", &["x", "y", "z"]),
        ];

        for (input, expected) in tests {
            match single_expression(input) {
                Expr::Function { params, .. } => {
                    let expected: Vec<Identifier> =
                        expected.iter().map(|name| Identifier::new(*name)).collect();
                    assert_eq!(params.as_ref(), &expected);
                }
                other => panic!("expected function literal, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_call_expression() {
        assert_eq!(
            single_expression("add(1, 2 * 3, 4 + 5);"),
            Expr::call(
                Expr::identifier("add"),
                vec![
                    Expr::integer(1),
                    Expr::infix(Expr::integer(2), token!(Asterisk, "*"), Expr::integer(3)),
                    Expr::infix(Expr::integer(4), token!(Plus, "+"), Expr::integer(5)),
                ]
            )
        );
    }

    #[test]
    fn test_array_literal() {
        assert_eq!(
            single_expression("[1, 2 * 2, 3 + 3]"),
            Expr::Array {
                elements: vec![
                    Expr::integer(1),
                    Expr::infix(Expr::integer(2), token!(Asterisk, "*"), Expr::integer(2)),
                    Expr::infix(Expr::integer(3), token!(Plus, "+"), Expr::integer(3)),
                ],
            }
        );
        assert_eq!(single_expression("[]"), Expr::Array { elements: vec![] });
    }

    #[test]
    fn test_index_expression() {
        assert_eq!(
            single_expression("myArray[1 + 1]"),
            Expr::index(
                Expr::identifier("myArray"),
                Expr::infix(Expr::integer(1), token!(Plus, "+"), Expr::integer(1))
            )
        );
    }

    #[test]
    fn test_hash_literal_keeps_source_order() {
        let expr = single_expression("{\"one\": 1, \"two\": 2, \"three\": 3}");
        assert_eq!(
            expr,
            Expr::Hash {
                pairs: vec![
                    (Expr::string("one"), Expr::integer(1)),
                    (Expr::string("two"), Expr::integer(2)),
                    (Expr::string("three"), Expr::integer(3)),
                ],
            }
        );
    }

    #[test]
    fn test_empty_hash_literal() {
        assert_eq!(single_expression("{}"), Expr::Hash { pairs: vec![] });
    }

    #[test]
    fn test_hash_literal_with_mixed_keys_and_trailing_comma() {
        let expr = single_expression("{1: \"one\", true: 2, \"x\": 1 + 2,}");
        assert_eq!(
            expr,
            Expr::Hash {
                pairs: vec![
                    (Expr::integer(1), Expr::string("one")),
                    (Expr::boolean(true), Expr::integer(2)),
                    (
                        Expr::string("x"),
                        Expr::infix(Expr::integer(1), token!(Plus, "+"), Expr::integer(2))
                    ),
                ],
            }
        );
    }

    #[test]
    fn test_no_prefix_parse_fn_error() {
        let errors = parse_errors("+5;");
        assert!(
            errors.contains(&"no prefix parse function for + found".to_string()),
            "got {:?}",
            errors
        );
    }

    #[test]
    fn test_integer_out_of_range() {
        let errors = parse_errors("99999999999999999999");
        assert_eq!(
            errors,
            vec!["could not parse \"99999999999999999999\" as integer".to_string()]
        );
    }

    #[test]
    fn test_recovery_keeps_later_statements() {
        let mut parser = Parser::new(Lexer::new("let x 5; let y = 7;"));
        let program = parser.parse_program();

        assert_eq!(parser.errors().len(), 1);
        assert!(program
            .statements
            .contains(&Stmt::Let {
                name: Identifier::new("y"),
                value: Expr::integer(7),
            }));
    }
}
