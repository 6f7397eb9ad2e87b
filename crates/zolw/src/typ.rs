use std::{cell::RefCell, fmt::Write as _, rc::Rc};

use crate::Error;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
}

impl Span {
    pub fn union(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
        }
    }
}

impl From<crate::lex::Input<'_>> for Span {
    fn from(sp: crate::lex::Input) -> Self {
        Span {
            start: sp.location_offset(),
            end: sp.location_offset() + sp.fragment().len(),
            line: sp.location_line(),
        }
    }
}

/// A mutable array, shared between every value that refers to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    pub items: Vec<Value>,
    pub origin: i64,
}

impl Array {
    /// Translates a user-facing index into a position in `items`.
    pub fn slot(&self, index: i64) -> Result<usize, Error> {
        index
            .checked_sub(self.origin)
            .and_then(|pos| usize::try_from(pos).ok())
            .filter(|&pos| pos < self.items.len())
            .ok_or(Error::IndexOutOfBounds)
    }
}

/// A LOGO value.
///
/// Words come in two flavors: ones that came out of arithmetic or number literals are stored
/// as numbers, and everything else (quoted words, the contents of list literals) as text. Text
/// that looks like a number is still a number as far as arithmetic is concerned.
///
/// Lists are immutable, so sharing them is indistinguishable from copying them. Arrays are
/// mutable in place and every clone refers to the same storage.
#[derive(Clone, Debug)]
pub enum Value {
    Num(f64),
    Text(Rc<str>),
    List(Rc<[Value]>),
    Array(Rc<RefCell<Array>>),
}

impl Value {
    pub fn num(x: f64) -> Value {
        Value::Num(x)
    }

    pub fn text(s: impl Into<Rc<str>>) -> Value {
        Value::Text(s.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(items.into())
    }

    pub fn empty_list() -> Value {
        Value::List(Rc::from(Vec::new()))
    }

    pub fn array(items: Vec<Value>, origin: i64) -> Value {
        Value::Array(Rc::new(RefCell::new(Array { items, origin })))
    }

    pub fn bool(b: bool) -> Value {
        Value::Num(if b { 1.0 } else { 0.0 })
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Value::Num(_) | Value::Text(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Num(x) => Some(*x),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// The text of a word; numbers are formatted the way they print.
    pub fn as_word(&self) -> Option<String> {
        match self {
            Value::Num(x) => Some(format_number(*x)),
            Value::Text(s) => Some(s.to_string()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Value::Num(x) => Ok(*x != 0.0),
            Value::Text(s) => match s.to_lowercase().as_str() {
                "true" | "prawda" => Ok(true),
                "false" | "fałsz" => Ok(false),
                other => parse_number(other)
                    .map(|x| x != 0.0)
                    .ok_or(Error::ExpectedNumber),
            },
            _ => Err(Error::ExpectedNumber),
        }
    }

    /// The elements of a sequence: list items, array items, or the characters of a word.
    ///
    /// Numbers are rejected even though they print as words, so `first 123` is an error while
    /// `first "123` is not.
    pub fn items(&self) -> Result<Vec<Value>, Error> {
        match self {
            Value::Text(s) => Ok(s.chars().map(|c| Value::text(c.to_string())).collect()),
            Value::List(items) => Ok(items.to_vec()),
            Value::Array(arr) => Ok(arr.borrow().items.clone()),
            Value::Num(_) => Err(Error::ExpectedList),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Num(_) => false,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            // An empty array is still something.
            Value::Array(_) => false,
        }
    }

    /// The form `print` uses: like `show`, but without the brackets around a top-level list.
    pub fn print_form(&self) -> String {
        match self {
            Value::List(items) => join(items, |v| v.to_string()),
            _ => self.to_string(),
        }
    }

    /// Source text that lexes back into this value when run as code.
    ///
    /// Word characters that would otherwise end the word or start a comment are escaped.
    pub fn to_source(&self) -> String {
        match self {
            Value::Num(x) => format_number(*x),
            Value::Text(s) => {
                let mut out = String::with_capacity(s.len());
                for c in s.chars() {
                    if c.is_whitespace() || "\\;[]{}".contains(c) {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out
            }
            Value::List(items) => format!("[{}]", join(items, Value::to_source)),
            Value::Array(arr) => {
                let arr = arr.borrow();
                let mut out = format!("{{{}}}", join(&arr.items, Value::to_source));
                if arr.origin != 1 {
                    let _ = write!(out, "@{}", arr.origin);
                }
                out
            }
        }
    }
}

// Words inside a list are escaped so that the list reads back as the same list.
fn item_form(v: &Value) -> String {
    match v {
        Value::Text(_) => v.to_source(),
        _ => v.to_string(),
    }
}

fn join(items: &[Value], f: impl Fn(&Value) -> String) -> String {
    items.iter().map(f).collect::<Vec<_>>().join(" ")
}

/// LOGO equality: words that both look like numbers compare numerically, other words compare
/// as text, lists compare element-wise, and arrays are only equal to themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (a, b) if a.is_word() && b.is_word() => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => a.as_word() == b.as_word(),
            },
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Num(x) => f.write_str(&format_number(*x)),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", join(items, item_form)),
            Value::Array(arr) => {
                let arr = arr.borrow();
                write!(f, "{{{}}}", join(&arr.items, item_form))?;
                if arr.origin != 1 {
                    write!(f, "@{}", arr.origin)?;
                }
                Ok(())
            }
        }
    }
}

pub fn format_number(x: f64) -> String {
    if x == 0.0 {
        // Avoids printing "-0".
        "0".to_owned()
    } else {
        x.to_string()
    }
}

/// Parses a word as a number, accepting only plain decimal notation (so no "inf" or "nan").
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let plausible = !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if plausible {
        s.parse().ok()
    } else {
        None
    }
}

// Operator precedence, with the loosest-binding ones first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Cmp,
    Add,
    Mul,
    Pow,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Op {
    pub fn priority(&self) -> Priority {
        match self {
            Op::Add | Op::Sub => Priority::Add,
            Op::Mul | Op::Div | Op::Rem => Priority::Mul,
            Op::Pow => Priority::Pow,
            Op::Eq | Op::Ne | Op::Lt | Op::Gt | Op::Le | Op::Ge => Priority::Cmp,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Rem => "%",
            Op::Pow => "^",
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
        }
    }

    pub fn eval(&self, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
        match self {
            Op::Eq => return Ok(Value::bool(lhs == rhs)),
            Op::Ne => return Ok(Value::bool(lhs != rhs)),
            _ => {}
        }
        let l = lhs.as_number().ok_or(Error::ExpectedNumber)?;
        let r = rhs.as_number().ok_or(Error::ExpectedNumber)?;
        Ok(match self {
            Op::Add => Value::num(l + r),
            Op::Sub => Value::num(l - r),
            Op::Mul => Value::num(l * r),
            Op::Div => Value::num(checked_div(l, r)?),
            Op::Rem => Value::num(remainder(l, r)?),
            Op::Pow => Value::num(l.powf(r)),
            Op::Lt => Value::bool(l < r),
            Op::Gt => Value::bool(l > r),
            Op::Le => Value::bool(l <= r),
            Op::Ge => Value::bool(l >= r),
            Op::Eq | Op::Ne => unreachable!(),
        })
    }
}

impl TryFrom<&str> for Op {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value {
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "%" => Op::Rem,
            "^" => Op::Pow,
            "=" => Op::Eq,
            "<>" => Op::Ne,
            "<" => Op::Lt,
            ">" => Op::Gt,
            "<=" => Op::Le,
            ">=" => Op::Ge,
            _ => Err(())?,
        })
    }
}

pub fn checked_div(l: f64, r: f64) -> Result<f64, Error> {
    if r == 0.0 {
        Err(Error::DivisionByZero)
    } else {
        Ok(l / r)
    }
}

/// Remainder with the sign of the dividend.
pub fn remainder(l: f64, r: f64) -> Result<f64, Error> {
    if r == 0.0 {
        Err(Error::DivisionByZero)
    } else {
        Ok(l % r)
    }
}

/// Modulus with the sign of the divisor.
pub fn modulo(l: f64, r: f64) -> Result<f64, Error> {
    Ok(remainder(l, r)?.abs() * r.signum())
}
