use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{
        anychar, char, digit0, digit1, multispace0, multispace1, none_of, one_of, satisfy,
    },
    combinator::{map, map_opt, map_res, opt, recognize, value, verify},
    error::{ErrorKind, FromExternalError, ParseError},
    multi::{fold_many0, many0_count},
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::{
    typ::{Op, Span, Value},
    Error,
};

pub type Input<'a> = nom_locate::LocatedSpan<&'a str>;

type LexResult<'a, O> = IResult<Input<'a>, O, LexError<'a>>;

// Characters that end a quoted word in code, and a word inside a list literal.
const CODE_DELIMS: &str = " \t\r\n[](){};";
const DATA_DELIMS: &str = " \t\r\n[]{};";

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// A bare identifier: a procedure call, or one of the `to`/`end` keywords.
    Word(String),
    Quoted(String),
    Var(String),
    Op(Op),
    Open,
    Close,
    /// A whole `[...]` or `{...}` literal, already turned into a value.
    Literal(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub space_before: bool,
    pub space_after: bool,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TokenKind::Number(x) => f.write_str(&crate::typ::format_number(*x)),
            TokenKind::Word(w) => f.write_str(w),
            TokenKind::Quoted(w) => write!(f, "\"{w}"),
            TokenKind::Var(v) => write!(f, ":{v}"),
            TokenKind::Op(op) => f.write_str(op.name()),
            TokenKind::Open => f.write_str("("),
            TokenKind::Close => f.write_str(")"),
            TokenKind::Literal(v) => v.fmt(f),
        }
    }
}

#[derive(Clone, Debug)]
enum Problem {
    Nom,
    Unterminated(char),
    Mismatched(char),
}

#[derive(Clone, Debug)]
pub struct LexError<'a> {
    input: Input<'a>,
    problem: Problem,
}

impl<'a> ParseError<Input<'a>> for LexError<'a> {
    fn from_error_kind(input: Input<'a>, _kind: ErrorKind) -> Self {
        LexError {
            input,
            problem: Problem::Nom,
        }
    }

    fn append(_input: Input<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a, E> FromExternalError<Input<'a>, E> for LexError<'a> {
    fn from_external_error(input: Input<'a>, kind: ErrorKind, _e: E) -> Self {
        Self::from_error_kind(input, kind)
    }
}

impl<'a> From<LexError<'a>> for Error {
    fn from(e: LexError<'a>) -> Self {
        match e.problem {
            Problem::Unterminated(c) => Error::ExpectedClose(c),
            Problem::Mismatched(c) => Error::Unexpected(c.to_string()),
            Problem::Nom => stray(e.input),
        }
    }
}

fn fail<O>(input: Input, problem: Problem) -> LexResult<O> {
    Err(nom::Err::Failure(LexError { input, problem }))
}

fn to_error(e: nom::Err<LexError>) -> Error {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.into(),
        nom::Err::Incomplete(_) => Error::UnexpectedEnd,
    }
}

/// The error for something that doesn't start any token.
fn stray(input: Input) -> Error {
    let rest = input.fragment();
    match rest.chars().next() {
        Some(c @ (']' | '}')) => Error::Unexpected(c.to_string()),
        _ => {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            Error::CannotParse(rest[..end].to_owned())
        }
    }
}

fn comment(input: Input) -> LexResult<Input> {
    recognize(pair(char(';'), take_till(|c| c == '\n')))(input)
}

/// Skips whitespace and comments, and says whether there were any.
fn blank(input: Input) -> LexResult<bool> {
    map(many0_count(alt((multispace1, comment))), |n| n > 0)(input)
}

fn number(input: Input) -> LexResult<f64> {
    let mantissa = alt((recognize(tuple((digit0, char('.'), digit1))), digit1));
    let exponent = tuple((one_of("eE"), opt(one_of("+-")), digit1));
    map_res(recognize(pair(mantissa, opt(exponent))), |s: Input| {
        s.fragment().parse::<f64>()
    })(input)
}

fn op(input: Input) -> LexResult<TokenKind> {
    map_opt(
        alt((
            tag("<="),
            tag(">="),
            tag("<>"),
            recognize(one_of("+-*/%^=<>")),
        )),
        |s: Input| Op::try_from(*s.fragment()).ok().map(TokenKind::Op),
    )(input)
}

fn ident(input: Input) -> LexResult<Input> {
    alt((
        recognize(tuple((
            opt(char('.')),
            satisfy(|c: char| c.is_alphabetic()),
            many0_count(satisfy(|c: char| {
                c.is_alphanumeric() || matches!(c, '_' | '.' | '?')
            })),
        ))),
        tag("?"),
    ))(input)
}

/// A run of word characters, honoring `\` escapes.
fn word_text<'a>(delims: &'static str) -> impl FnMut(Input<'a>) -> LexResult<'a, String> {
    fold_many0(
        alt((preceded(char('\\'), anychar), none_of(delims))),
        String::new,
        |mut s, c| {
            s.push(c);
            s
        },
    )
}

/// Reads data items up to `close`, or to the end of the input if there is no closing bracket
/// to look for.
fn data_items(mut input: Input, close: Option<char>) -> LexResult<Vec<Value>> {
    let mut items = Vec::new();
    loop {
        let (rest, _) = blank(input)?;
        input = rest;
        match input.fragment().chars().next() {
            None => match close {
                Some(c) => return fail(input, Problem::Unterminated(c)),
                None => return Ok((input, items)),
            },
            Some(c) if Some(c) == close => {
                let (rest, _) = char(c)(input)?;
                return Ok((rest, items));
            }
            Some(c @ (']' | '}')) => return fail(input, Problem::Mismatched(c)),
            Some('[') => {
                let (rest, v) = list_literal(input)?;
                items.push(v);
                input = rest;
            }
            Some('{') => {
                let (rest, v) = array_literal(input)?;
                items.push(v);
                input = rest;
            }
            Some(_) => {
                let (rest, w) = verify(word_text(DATA_DELIMS), |w: &String| !w.is_empty())(input)?;
                items.push(Value::text(w));
                input = rest;
            }
        }
    }
}

fn list_literal(input: Input) -> LexResult<Value> {
    let (input, _) = char('[')(input)?;
    let (input, items) = data_items(input, Some(']'))?;
    Ok((input, Value::list(items)))
}

fn array_literal(input: Input) -> LexResult<Value> {
    let (input, _) = char('{')(input)?;
    let (input, items) = data_items(input, Some('}'))?;
    // Only the integer part of an origin is consumed; `@1.5` leaves `.5` behind.
    let (input, origin) = opt(preceded(
        tuple((multispace0, char('@'), multispace0)),
        map_res(recognize(pair(opt(char('-')), digit1)), |s: Input| {
            s.fragment().parse::<i64>()
        }),
    ))(input)?;
    Ok((input, Value::array(items, origin.unwrap_or(1))))
}

fn token_kind(input: Input) -> LexResult<TokenKind> {
    alt((
        map(number, TokenKind::Number),
        op,
        value(TokenKind::Open, char('(')),
        value(TokenKind::Close, char(')')),
        map(preceded(char('"'), word_text(CODE_DELIMS)), TokenKind::Quoted),
        map(preceded(char(':'), ident), |s| {
            TokenKind::Var(s.fragment().to_string())
        }),
        map(ident, |s| TokenKind::Word(s.fragment().to_string())),
        map(list_literal, TokenKind::Literal),
        map(array_literal, TokenKind::Literal),
    ))(input)
}

/// Splits source text into tokens.
///
/// List and array literals come out as single [`TokenKind::Literal`] tokens: their contents are
/// data, not code, until something runs them.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut input = Input::new(source);
    let mut tokens: Vec<Token> = Vec::new();
    loop {
        let (rest, skipped) = blank(input).map_err(to_error)?;
        input = rest;
        let at_end = input.fragment().is_empty();
        if let Some(prev) = tokens.last_mut() {
            prev.space_after = skipped || at_end;
        }
        if at_end {
            return Ok(tokens);
        }

        let (rest, kind) = token_kind(input).map_err(to_error)?;
        tokens.push(Token {
            kind,
            span: Span {
                start: input.location_offset(),
                end: rest.location_offset(),
                line: input.location_line(),
            },
            space_before: skipped || tokens.is_empty(),
            space_after: true,
        });
        input = rest;
    }
}

/// Reads a line of text the way a list literal's contents are read.
pub fn read_list(line: &str) -> Result<Vec<Value>, Error> {
    data_items(Input::new(line), None)
        .map(|(_, items)| items)
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        tokenize(s).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn words(ws: &[&str]) -> Value {
        Value::list(ws.iter().map(|w| Value::text(*w)).collect())
    }

    #[test]
    fn basic_tokens() {
        assert_eq!(
            kinds("przypisz \"t 10 :t"),
            vec![
                TokenKind::Word("przypisz".into()),
                TokenKind::Quoted("t".into()),
                TokenKind::Number(10.0),
                TokenKind::Var("t".into()),
            ]
        );
        assert_eq!(
            kinds("3<=4<>5"),
            vec![
                TokenKind::Number(3.0),
                TokenKind::Op(Op::Le),
                TokenKind::Number(4.0),
                TokenKind::Op(Op::Ne),
                TokenKind::Number(5.0),
            ]
        );
        assert_eq!(
            kinds(".2 + .możewynik słowo? ?"),
            vec![
                TokenKind::Number(0.2),
                TokenKind::Op(Op::Add),
                TokenKind::Word(".możewynik".into()),
                TokenKind::Word("słowo?".into()),
                TokenKind::Word("?".into()),
            ]
        );
    }

    #[test]
    fn minus_spacing() {
        let toks = tokenize("10 -4").unwrap();
        assert!(toks[1].space_before && !toks[1].space_after);
        let toks = tokenize("10 - 4").unwrap();
        assert!(toks[1].space_before && toks[1].space_after);
        let toks = tokenize("10-4").unwrap();
        assert!(!toks[1].space_before && !toks[1].space_after);
    }

    #[test]
    fn literals() {
        assert_eq!(
            kinds("[ 1 -2 [ 3 ] 4 *5 ]"),
            vec![TokenKind::Literal(Value::list(vec![
                Value::text("1"),
                Value::text("-2"),
                words(&["3"]),
                Value::text("4"),
                Value::text("*5"),
            ]))]
        );
        let toks = kinds("{ a b } @ 0");
        let TokenKind::Literal(Value::Array(arr)) = &toks[0] else {
            panic!("expected an array, got {toks:?}");
        };
        assert_eq!(arr.borrow().origin, 0);
        assert_eq!(arr.borrow().items.len(), 2);

        // Arrays only compare equal to themselves, so compare the printed form.
        let toks = kinds("{ 1 }@1.5");
        assert_eq!(toks.len(), 2);
        assert!(matches!(&toks[0], TokenKind::Literal(v) if v.to_string() == "{1}"));
        assert_eq!(toks[1], TokenKind::Number(0.5));
    }

    #[test]
    fn comments_and_escapes() {
        assert_eq!(kinds("5;comment"), vec![TokenKind::Number(5.0)]);
        assert_eq!(kinds("5 ; comment\n6").len(), 2);
        assert_eq!(kinds("\"abc;def"), vec![TokenKind::Quoted("abc".into())]);
        assert_eq!(kinds("\"abc\\;def"), vec![TokenKind::Quoted("abc;def".into())]);
        assert_eq!(kinds("\"abc\\\\def"), vec![TokenKind::Quoted("abc\\def".into())]);
        assert_eq!(kinds("\""), vec![TokenKind::Quoted("".into())]);
        assert_eq!(kinds("[ \"abc\\;def ]"), vec![TokenKind::Literal(words(&["\"abc;def"]))]);
    }

    #[test]
    fn failures() {
        assert_eq!(tokenize("[ 1 2"), Err(Error::ExpectedClose(']')));
        assert_eq!(tokenize("{ 1 2"), Err(Error::ExpectedClose('}')));
        assert_eq!(tokenize("[ 1 2 }"), Err(Error::Unexpected("}".into())));
        assert_eq!(tokenize("{ 1 2 ]"), Err(Error::Unexpected("]".into())));
        assert_eq!(tokenize("]"), Err(Error::Unexpected("]".into())));
        assert_eq!(tokenize("!@#$"), Err(Error::CannotParse("!@#$".into())));
        assert_eq!(tokenize("[ \"abc;def ]"), Err(Error::ExpectedClose(']')));
    }

    #[test]
    fn reading_lists() {
        assert_eq!(read_list("a b [c d]"), Ok(vec![
            Value::text("a"),
            Value::text("b"),
            words(&["c", "d"]),
        ]));
        assert_eq!(read_list(""), Ok(vec![]));
    }

    #[test]
    fn printed_lists_read_back() {
        for src in [
            "[]",
            "[a [b [c [d]]] e]",
            "[[[]] [1 2.5] x]",
            "[a\\[b [c [d\\]]] e\\;f]",
            "[[g\\ h] \\{i\\}]",
        ] {
            let v = read_list(src).unwrap();
            assert_eq!(v.len(), 1, "{src}");
            let shown = v[0].to_string();
            assert_eq!(read_list(&shown).unwrap(), v, "{src} printed as {shown}");
        }
    }
}
