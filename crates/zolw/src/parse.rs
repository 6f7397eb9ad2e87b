use std::rc::Rc;

use crate::{
    env::Env,
    eval::Block,
    lex::{Token, TokenKind},
    proc::UserProc,
    typ::{Op, Priority, Span, Value},
    Error,
};

#[derive(Clone, Debug)]
pub enum Node {
    Literal(Value),
    Var(String),
    /// A procedure call. The name is lower case; the procedure itself is looked up again when
    /// the call runs, so that redefinitions take effect immediately.
    Call {
        name: String,
        args: Vec<Node>,
        paren: bool,
        span: Span,
    },
    Infix(Op, Box<Node>, Box<Node>),
    Negate(Box<Node>),
    Define(Rc<UserProc>),
}

/// Turns tokens into statements, one at a time.
///
/// Parsing needs to know how many inputs each procedure takes, so it has to be interleaved with
/// evaluation: a statement can call a procedure that the previous statement defined.
pub struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn peek_op(&self) -> Option<(Op, &'a Token)> {
        match self.peek() {
            Some(tok @ Token {
                kind: TokenKind::Op(op),
                ..
            }) => Some((*op, tok)),
            _ => None,
        }
    }

    /// Parses the next statement, or returns `None` if there aren't any more.
    pub fn statement(&mut self, env: &Env) -> Result<Option<Node>, Error> {
        if self.at_end() {
            return Ok(None);
        }
        self.expression(env).map(Some)
    }

    /// Parses everything that's left as a sequence of expressions.
    pub fn expressions(&mut self, env: &Env) -> Result<Vec<Node>, Error> {
        let mut ret = Vec::new();
        while !self.at_end() {
            ret.push(self.expression(env)?);
        }
        Ok(ret)
    }

    pub fn expression(&mut self, env: &Env) -> Result<Node, Error> {
        self.binary(Priority::Cmp, env)
    }

    /// Parses a chain of binary operators that bind at least as tightly as `priority`.
    fn binary(&mut self, priority: Priority, env: &Env) -> Result<Node, Error> {
        let mut lhs = match priority.tighter() {
            Some(p) => self.binary(p, env)?,
            None => self.unary(env)?,
        };
        while let Some((op, tok)) = self.peek_op() {
            if op.priority() != priority {
                break;
            }
            // In `foo 10 -4`, the minus sign starts a new argument instead of subtracting.
            if op == Op::Sub && tok.space_before && !tok.space_after {
                break;
            }
            self.pos += 1;
            let rhs = match priority.tighter() {
                Some(p) => self.binary(p, env)?,
                None => self.unary(env)?,
            };
            lhs = Node::Infix(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self, env: &Env) -> Result<Node, Error> {
        if let Some((Op::Sub, _)) = self.peek_op() {
            self.pos += 1;
            let inner = self.unary(env)?;
            return Ok(Node::Negate(Box::new(inner)));
        }
        self.term(env)
    }

    fn term(&mut self, env: &Env) -> Result<Node, Error> {
        let tok = self.next().ok_or(Error::UnexpectedEnd)?;
        match &tok.kind {
            TokenKind::Number(x) => Ok(Node::Literal(Value::num(*x))),
            TokenKind::Quoted(w) => Ok(Node::Literal(Value::text(w.as_str()))),
            TokenKind::Literal(v) => Ok(Node::Literal(v.clone())),
            TokenKind::Var(v) => Ok(Node::Var(v.to_lowercase())),
            TokenKind::Close | TokenKind::Op(_) => Err(Error::Unexpected(tok.to_string())),
            TokenKind::Open => self.parenthesized(env),
            TokenKind::Word(w) => {
                if env.locale().is(w, "to") {
                    return self.define(env);
                }
                let name = w.to_lowercase();
                let proc = env
                    .procedure(&name)
                    .ok_or_else(|| Error::UnknownCall(w.to_uppercase()))?;
                let count = proc.arity().default;
                let mut args = Vec::with_capacity(count);
                for _ in 0..count {
                    args.push(self.expression(env)?);
                }
                Ok(Node::Call {
                    name,
                    args,
                    paren: false,
                    span: self.span_from(tok),
                })
            }
        }
    }

    // Called just after an opening parenthesis.
    fn parenthesized(&mut self, env: &Env) -> Result<Node, Error> {
        let open = &self.tokens[self.pos - 1];
        if let Some(Token {
            kind: TokenKind::Word(w),
            ..
        }) = self.peek()
        {
            if !env.locale().is(w, "to") {
                self.pos += 1;
                let name = w.to_lowercase();
                let proc = env
                    .procedure(&name)
                    .ok_or_else(|| Error::UnknownCall(w.to_uppercase()))?;
                let mut args = Vec::new();
                loop {
                    match self.peek() {
                        None => return Err(Error::ExpectedParen),
                        Some(Token {
                            kind: TokenKind::Close,
                            ..
                        }) => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => args.push(self.expression(env)?),
                    }
                }
                proc.arity().check(args.len(), w)?;
                return Ok(Node::Call {
                    name,
                    args,
                    paren: true,
                    span: self.span_from(open),
                });
            }
        }

        let inner = self.expression(env)?;
        match self.next() {
            None => Err(Error::ExpectedParen),
            Some(Token {
                kind: TokenKind::Close,
                ..
            }) => Ok(inner),
            Some(tok) => Err(Error::ExpectedParenSaw(tok.to_string())),
        }
    }

    /// Parses a procedure definition, just after the `to` keyword.
    fn define(&mut self, env: &Env) -> Result<Node, Error> {
        let locale = env.locale();
        let name = match self.next() {
            Some(Token {
                kind: TokenKind::Word(w),
                ..
            }) => w.to_lowercase(),
            _ => return Err(Error::ExpectedIdent),
        };
        let mut params = Vec::new();
        while let Some(Token {
            kind: TokenKind::Var(v),
            ..
        }) = self.peek()
        {
            params.push(v.to_lowercase());
            self.pos += 1;
        }

        let body_start = self.pos;
        loop {
            match self.next() {
                None => return Err(Error::ExpectedEnd(locale.display("end"))),
                Some(Token {
                    kind: TokenKind::Word(w),
                    ..
                }) if locale.is(w, "end") => break,
                Some(_) => {}
            }
        }
        let body = &self.tokens[body_start..self.pos - 1];
        let body_source = match (body.first(), body.last()) {
            (Some(first), Some(last)) => &self.source[first.span.start..last.span.end],
            _ => "",
        };

        let mut text = locale.aliases("to").first().copied().unwrap_or("to").to_owned();
        text.push(' ');
        text.push_str(&name);
        for p in &params {
            text.push_str(" :");
            text.push_str(p);
        }
        text.push('\n');
        for line in body_source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            text.push_str("  ");
            text.push_str(line);
            text.push('\n');
        }
        text.push_str(locale.aliases("end").first().copied().unwrap_or("end"));

        Ok(Node::Define(Rc::new(UserProc {
            name,
            params,
            body: Block::compile(body_source)?,
            text,
        })))
    }

    fn span_from(&self, start: &Token) -> Span {
        match self.tokens.get(self.pos.wrapping_sub(1)) {
            Some(end) => start.span.union(end.span),
            None => start.span,
        }
    }
}

impl Priority {
    /// The next priority level up, if there is one.
    fn tighter(self) -> Option<Priority> {
        match self {
            Priority::Cmp => Some(Priority::Add),
            Priority::Add => Some(Priority::Mul),
            Priority::Mul => Some(Priority::Pow),
            Priority::Pow => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::tokenize;

    fn parse_all(env: &Env, s: &str) -> Result<Vec<Node>, Error> {
        let tokens = tokenize(s)?;
        let mut parser = Parser::new(s, &tokens);
        let mut ret = Vec::new();
        while let Some(node) = parser.statement(env)? {
            ret.push(node);
        }
        Ok(ret)
    }

    // A compact rendering of a parse tree, for comparing against.
    fn render(node: &Node) -> String {
        match node {
            Node::Literal(v) => v.to_string(),
            Node::Var(v) => format!(":{v}"),
            Node::Call { name, args, .. } => {
                let args: Vec<_> = args.iter().map(render).collect();
                format!("({name} {})", args.join(" "))
            }
            Node::Infix(op, l, r) => format!("({} {} {})", render(l), op.name(), render(r)),
            Node::Negate(inner) => format!("-{}", render(inner)),
            Node::Define(p) => format!("define {}", p.name),
        }
    }

    fn rendered(s: &str) -> Vec<String> {
        let env = Env::default();
        parse_all(&env, s).unwrap().iter().map(render).collect()
    }

    #[test]
    fn precedence() {
        assert_eq!(rendered("1 + 2 * 3"), vec!["(1 + (2 * 3))"]);
        assert_eq!(rendered("1 * 2 + 3 < 4"), vec!["(((1 * 2) + 3) < 4)"]);
        assert_eq!(rendered("2 ^ 3 * 4"), vec!["((2 ^ 3) * 4)"]);
        assert_eq!(rendered("(1 + 2) * 3"), vec!["((1 + 2) * 3)"]);
        assert_eq!(rendered("-7 % 4"), vec!["(-7 % 4)"]);
    }

    #[test]
    fn minus() {
        assert_eq!(rendered("- 4 + 10"), vec!["(-4 + 10)"]);
        assert_eq!(rendered("10 + - 4"), vec!["(10 + -4)"]);
        assert_eq!(rendered("10 - 4"), vec!["(10 - 4)"]);
        assert_eq!(rendered("10-4"), vec!["(10 - 4)"]);
        assert_eq!(rendered("10- 4"), vec!["(10 - 4)"]);
        assert_eq!(rendered("10 -4"), vec!["10", "-4"]);
        assert_eq!(rendered("suma 10 -4"), vec!["(suma 10 -4)"]);
        assert_eq!(rendered("ujemny 3 + 4"), vec!["(ujemny (3 + 4))"]);
    }

    #[test]
    fn calls() {
        assert_eq!(rendered("(suma 1 2 3 4)"), vec!["(suma 1 2 3 4)"]);
        assert_eq!(rendered("PISZ suma 1 2"), vec!["(pisz (suma 1 2))"]);
        assert_eq!(rendered("numpow-1"), vec!["((numpow ) - 1)"]);
    }

    #[test]
    fn failures() {
        let env = Env::default();
        let err = |s: &str| parse_all(&env, s).unwrap_err();
        assert_eq!(err("suma 10 - 4"), Error::UnexpectedEnd);
        assert_eq!(err("1 + -"), Error::UnexpectedEnd);
        assert_eq!(err("( 1 + 2"), Error::ExpectedParen);
        assert_eq!(err("( 1 + 2 3"), Error::ExpectedParenSaw("3".into()));
        assert_eq!(err(")"), Error::Unexpected(")".into()));
        assert_eq!(err("nosuchproc"), Error::UnknownCall("NOSUCHPROC".into()));
        assert_eq!(err("oto +"), Error::ExpectedIdent);
        assert_eq!(err("oto whatever np 100"), Error::ExpectedEnd("JUŻ".into()));
        assert_eq!(err("(ujemny)"), Error::NotEnoughInputs("UJEMNY".into()));
        assert_eq!(err("(ujemny 1 2)"), Error::TooManyInputs("UJEMNY".into()));
    }

    #[test]
    fn definitions() {
        let env = Env::default();
        let nodes = parse_all(&env, "oto foo :x :Y\n  bar 1 \"a + :x [ 1 2 ]\nJUŻ").unwrap();
        let [Node::Define(p)] = nodes.as_slice() else {
            panic!("expected a definition, got {nodes:?}");
        };
        assert_eq!(p.name, "foo");
        assert_eq!(p.params, vec!["x", "y"]);
        assert_eq!(p.text, "oto foo :x :y\n  bar 1 \"a + :x [ 1 2 ]\njuż");

        let nodes = parse_all(&env, "oto foo już").unwrap();
        let [Node::Define(p)] = nodes.as_slice() else {
            panic!("expected a definition, got {nodes:?}");
        };
        assert_eq!(p.text, "oto foo\njuż");
    }
}
