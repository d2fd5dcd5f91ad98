//! Parser for calculated field expressions.
//!
//! Two-phase: a lexer turns source text into spanned tokens, then a
//! token-stream parser builds the [`Expr`] tree with a conventional
//! precedence ladder (`||` < `&&` < equality < comparison < additive <
//! multiplicative < unary). Logical keywords (`AND`, `OR`, `NOT`) are
//! recognized case-insensitively and normalized to uppercase; symbol
//! operators keep their source spelling.

use chumsky::input::ValueInput;
use chumsky::prelude::*;
use thiserror::Error;

use crate::expr::ast::{Expr, Literal};

/// Source span of a lex or parse diagnostic.
pub type Span = std::ops::Range<usize>;

/// Errors from lexing or parsing an expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expression syntax error at {span:?}: {message}")]
    SyntaxError { message: String, span: Span },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// A token in a calculated field expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords (case-insensitive in source)
    And,
    Or,
    Not,
    True,
    False,
    Null,

    // Literals
    /// An identifier (not a keyword).
    Ident(&'src str),
    /// A string literal (contents without quotes).
    Str(&'src str),
    /// A number (integer or decimal).
    Number(&'src str),

    // Operators
    /// `===`
    StrictEq,
    /// `==`
    Eq,
    /// `!==`
    StrictNe,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `!`
    Bang,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,

    // Symbols
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
}

impl<'src> std::fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Number(s) => write!(f, "{}", s),
            Token::StrictEq => write!(f, "==="),
            Token::Eq => write!(f, "=="),
            Token::StrictNe => write!(f, "!=="),
            Token::Ne => write!(f, "!="),
            Token::Ge => write!(f, ">="),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Lt => write!(f, "<"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
        }
    }
}

/// Map an identifier to a keyword token or return Ident.
fn keyword_or_ident(s: &str) -> Token<'_> {
    match s.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => Token::Ident(s),
    }
}

/// Create a lexer for expression source text.
///
/// Returns a parser that tokenizes the input into spanned tokens,
/// skipping whitespace and comments.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    // Identifiers: letter or underscore, then alphanumerics, underscores,
    // or `$` (attribute references like `dimension$caption`)
    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
                .repeated(),
        )
        .to_slice()
        .map(keyword_or_ident);

    // String literals: '...' or "..." without embedded quotes
    let single_quoted = just('\'')
        .ignore_then(none_of('\'').repeated().to_slice())
        .then_ignore(just('\''))
        .map(Token::Str);

    let double_quoted = just('"')
        .ignore_then(none_of('"').repeated().to_slice())
        .then_ignore(just('"'))
        .map(Token::Str);

    // Numbers: digits with an optional fraction
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(Token::Number);

    // Operators and symbols (multi-char first)
    let symbol = choice((
        just("===").to(Token::StrictEq),
        just("!==").to(Token::StrictNe),
        just("==").to(Token::Eq),
        just("!=").to(Token::Ne),
        just(">=").to(Token::Ge),
        just("<=").to(Token::Le),
        just("&&").to(Token::AndAnd),
        just("||").to(Token::OrOr),
        just('>').to(Token::Gt),
        just('<').to(Token::Lt),
        just('!').to(Token::Bang),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('%').to(Token::Percent),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(',').to(Token::Comma),
        just('.').to(Token::Dot),
    ));

    // Single-line comments: // ... until newline
    let single_line_comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();

    // Multi-line comments: /* ... */
    let multi_line_comment = just("/*")
        .then(any().and_is(just("*/").not()).repeated())
        .then(just("*/"))
        .ignored();

    let comment = single_line_comment.or(multi_line_comment);

    let token = choice((ident, single_quoted, double_quoted, number, symbol))
        .map_with(|tok, e| (tok, e.span()));

    token
        .padded_by(comment.padded().repeated())
        .padded()
        .repeated()
        .collect()
        .padded_by(comment.padded().repeated())
        .padded()
        .then_ignore(end())
}

/// Build a left-associative binary node.
fn fold_binary(left: Expr, (op, right): (&'static str, Expr)) -> Expr {
    Expr::Binary {
        op: op.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Create the expression parser over a token stream.
pub fn parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, Expr, extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    recursive(|expr| {
        let ident = select! {
            Token::Ident(s) => s.to_string(),
        }
        .labelled("identifier");

        // Qualified column name: `price` or `t.price`
        let column = ident
            .clone()
            .then(just(Token::Dot).ignore_then(ident.clone()).or_not())
            .map(|(head, tail)| match tail {
                Some(tail) => Expr::Identifier(format!("{}.{}", head, tail)),
                None => Expr::Identifier(head),
            });

        let number = select! {
            Token::Number(s) => s,
        }
        .try_map(|s: &str, span| {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Literal::Int(i));
            }
            s.parse::<f64>()
                .map(Literal::Float)
                .map_err(|e| Rich::custom(span, format!("invalid number literal: {}", e)))
        });

        let literal = number
            .or(select! {
                Token::Str(s) => Literal::Str(s.to_string()),
                Token::True => Literal::Bool(true),
                Token::False => Literal::Bool(false),
                Token::Null => Literal::Null,
            })
            .map(Expr::Literal)
            .labelled("literal");

        // Function call: bare name followed by an argument list
        let call = ident
            .clone()
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map(|(name, args)| Expr::Function { name, args });

        let paren = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .map(|inner| Expr::Paren(Box::new(inner)));

        let primary = choice((literal, paren, call, column)).labelled("expression");

        // Precedence ladder, loosest binding last
        let unary_op = choice((
            just(Token::Minus).to("-"),
            just(Token::Bang).to("!"),
            just(Token::Not).to("NOT"),
        ));

        let unary = unary_op.repeated().foldr(primary, |op, operand| Expr::Unary {
            op: op.to_string(),
            operand: Box::new(operand),
        });

        let product = unary.clone().foldl(
            choice((
                just(Token::Star).to("*"),
                just(Token::Slash).to("/"),
                just(Token::Percent).to("%"),
            ))
            .then(unary)
            .repeated(),
            fold_binary,
        );

        let sum = product.clone().foldl(
            choice((just(Token::Plus).to("+"), just(Token::Minus).to("-")))
                .then(product)
                .repeated(),
            fold_binary,
        );

        let comparison = sum.clone().foldl(
            choice((
                just(Token::Ge).to(">="),
                just(Token::Le).to("<="),
                just(Token::Gt).to(">"),
                just(Token::Lt).to("<"),
            ))
            .then(sum)
            .repeated(),
            fold_binary,
        );

        let equality = comparison.clone().foldl(
            choice((
                just(Token::StrictEq).to("==="),
                just(Token::Eq).to("=="),
                just(Token::StrictNe).to("!=="),
                just(Token::Ne).to("!="),
            ))
            .then(comparison)
            .repeated(),
            fold_binary,
        );

        let conjunction = equality.clone().foldl(
            choice((just(Token::AndAnd).to("&&"), just(Token::And).to("AND")))
                .then(equality)
                .repeated(),
            fold_binary,
        );

        conjunction.clone().foldl(
            choice((just(Token::OrOr).to("||"), just(Token::Or).to("OR")))
                .then(conjunction)
                .repeated(),
            fold_binary,
        )
    })
    .then_ignore(end())
}

/// Parse a calculated field expression.
///
/// Returns the AST root, or the first syntax error encountered.
pub fn parse(source: &str) -> ParseResult<Expr> {
    use chumsky::input::Input as _;

    // Step 1: lexical analysis
    let (tokens, lex_errs) = lexer().parse(source).into_output_errors();

    if let Some(e) = lex_errs.first() {
        let span = e.span();
        return Err(ParseError::SyntaxError {
            message: e.to_string(),
            span: span.start..span.end,
        });
    }

    let tokens = tokens.unwrap_or_default();

    // Step 2: parsing
    let len = source.len();
    let eoi: SimpleSpan = (len..len).into();
    let token_stream = tokens
        .as_slice()
        .map(eoi, |(tok, span): &(Token<'_>, SimpleSpan)| (tok, span));

    let (expr, parse_errs) = parser().parse(token_stream).into_output_errors();

    if let Some(e) = parse_errs.first() {
        let span = e.span();
        return Err(ParseError::SyntaxError {
            message: e.to_string(),
            span: span.start..span.end,
        });
    }

    expr.ok_or_else(|| ParseError::SyntaxError {
        message: "empty expression".to_string(),
        span: 0..len,
    })
}
