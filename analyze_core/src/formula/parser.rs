use super::lexer::{tokenize, Token, TokenKind};
use super::Expr;
use crate::error::{AnalyzeError, Result};

/// Deepest call nesting a formula may use.
pub const MAX_DEPTH: usize = 128;

/// Recursive-descent parser over the token stream.
///
/// ```text
/// expr := number | ident | ident '(' [expr (',' expr)*] ')'
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    source_len: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            depth: 0,
            source_len: source.len(),
        })
    }

    /// Parses a single expression that must consume the whole input.
    pub fn parse(mut self) -> Result<Expr> {
        let expr = self.expr()?;
        if let Some(token) = self.peek() {
            return Err(AnalyzeError::parse(
                token.position,
                format!("unexpected trailing {}", describe(&token.kind)),
            ));
        }
        Ok(expr)
    }

    fn expr(&mut self) -> Result<Expr> {
        let Some(token) = self.next() else {
            return Err(AnalyzeError::parse(
                self.source_len,
                "unexpected end of formula",
            ));
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => {
                if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
                    if self.depth == MAX_DEPTH {
                        return Err(AnalyzeError::parse(
                            token.position,
                            "formula nested too deeply",
                        ));
                    }
                    self.pos += 1;
                    self.depth += 1;
                    let args = self.args();
                    self.depth -= 1;
                    Ok(Expr::Call { name, args: args? })
                } else {
                    Ok(Expr::Param(name))
                }
            }
            other => Err(AnalyzeError::parse(
                token.position,
                format!("expected expression, found {}", describe(&other)),
            )),
        }
    }

    /// Parses call arguments after the opening parenthesis.
    fn args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            self.pos += 1;
            return Ok(args);
        }

        loop {
            args.push(self.expr()?);
            match self.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => return Ok(args),
                Some(token) => {
                    return Err(AnalyzeError::parse(
                        token.position,
                        format!("expected ',' or ')', found {}", describe(&token.kind)),
                    ))
                }
                None => {
                    return Err(AnalyzeError::parse(
                        self.source_len,
                        "missing closing ')'",
                    ))
                }
            }
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(v) => format!("number {}", v),
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::Comma => "','".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Expr> {
        Parser::new(source)?.parse()
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_parse_nested_calls() {
        let expr = parse("max(mean(x))").unwrap();
        assert_eq!(
            expr,
            call("max", vec![call("mean", vec![Expr::Param("x".into())])])
        );
    }

    #[test]
    fn test_parse_multiple_args_and_literals() {
        let expr = parse("f(1, x, g())").unwrap();
        assert_eq!(
            expr,
            call(
                "f",
                vec![Expr::Number(1.0), Expr::Param("x".into()), call("g", vec![])]
            )
        );
    }

    #[test]
    fn test_parse_bare_literal() {
        assert_eq!(parse(" 42 ").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}x{}", "max(".repeat(depth), ")".repeat(depth));

        assert!(parse(&nested(MAX_DEPTH)).is_ok());

        match parse(&nested(MAX_DEPTH + 1)) {
            Err(AnalyzeError::FormulaParseError { position, message }) => {
                assert_eq!(position, MAX_DEPTH * 4);
                assert!(message.contains("nested too deeply"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        // Far past the limit must still fail cleanly instead of exhausting the stack.
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || parse(&nested(200_000)).is_err())
            .unwrap();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("", 0),
            ("mean(x", 6),
            ("mean(x y)", 7),
            ("mean(x))", 7),
            ("mean(,x)", 5),
            ("mean(x,)", 7),
            ("x y", 2),
        ];
        for (source, expected) in cases {
            match parse(source) {
                Err(AnalyzeError::FormulaParseError { position, .. }) => {
                    assert_eq!(position, expected, "wrong position for {:?}", source)
                }
                other => panic!("expected parse error for {:?}, got {:?}", source, other),
            }
        }
    }
}
