use std::rc::Rc;

use log::trace;

use crate::{
    env::Env,
    error::{EvalResult, Interrupt},
    lex::{tokenize, Token},
    parse::{Node, Parser},
    typ::Value,
    Error,
};

/// Code that's ready to run: source text, already split into tokens.
#[derive(Clone, Debug)]
pub struct Block {
    source: Rc<str>,
    tokens: Rc<[Token]>,
}

impl Block {
    pub fn compile(source: &str) -> Result<Block, Error> {
        Ok(Block {
            tokens: tokenize(source)?.into(),
            source: source.into(),
        })
    }

    /// Turns a list (or a word) into code.
    pub fn from_value(v: &Value) -> Result<Block, Error> {
        match v {
            Value::List(items) => {
                let source: Vec<String> = items.iter().map(Value::to_source).collect();
                Block::compile(&source.join(" "))
            }
            Value::Text(_) | Value::Num(_) => Block::compile(&v.to_source()),
            Value::Array(_) => Err(Error::ExpectedBlock),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn parser(&self) -> Parser<'_> {
        Parser::new(&self.source, &self.tokens)
    }
}

/// What to do with a statement that produces a value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// It's an error: every statement has to be a command.
    Command,
    /// Keep it; the value of the last statement is the value of the block.
    Tolerate,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunOptions {
    /// Return the value of the last statement instead of complaining about it.
    pub return_result: bool,
}

impl Env {
    /// Runs source code at top level.
    pub fn run(&mut self, source: &str, options: RunOptions) -> Result<Option<Value>, Error> {
        let block = Block::compile(source)?;
        let mode = if options.return_result {
            Mode::Tolerate
        } else {
            Mode::Command
        };
        match self.execute(&block, mode) {
            Ok(v) => Ok(v),
            Err(Interrupt::Error(e)) => Err(e),
            Err(Interrupt::Output(_)) => Err(Error::OutsideProcedure(self.display("output"))),
            Err(Interrupt::Stop) => Err(Error::OutsideProcedure(self.display("stop"))),
            Err(Interrupt::Break) => Err(Error::OutsideLoop(self.display("break"))),
        }
    }

    /// Runs source code at top level, and returns the value of its last statement.
    pub fn eval_str(&mut self, source: &str) -> Result<Option<Value>, Error> {
        self.run(
            source,
            RunOptions {
                return_result: true,
            },
        )
    }

    /// Runs the statements of a block, one after another.
    pub fn execute(&mut self, block: &Block, mode: Mode) -> EvalResult {
        let mut parser = block.parser();
        let mut last = None;
        while let Some(node) = parser.statement(self)? {
            let val = self.eval(&node)?;
            match (mode, val) {
                (Mode::Command, Some(v)) => return Err(Error::unused(&v).into()),
                (_, v) => last = v,
            }
        }
        Ok(last)
    }

    /// Runs a value as code, as `run` does.
    pub fn run_value(&mut self, code: &Value, mode: Mode) -> EvalResult {
        let block = Block::from_value(code)?;
        self.execute(&block, mode)
    }

    pub fn eval(&mut self, node: &Node) -> EvalResult {
        match node {
            Node::Literal(v) => Ok(Some(v.clone())),
            Node::Var(name) => match self.lookup(name) {
                Some(v) => Ok(Some(v)),
                None => Err(Error::UnknownVar(name.to_uppercase()).into()),
            },
            Node::Infix(op, lhs, rhs) => {
                let lhs = self.eval_arg(lhs)?;
                let rhs = self.eval_arg(rhs)?;
                Ok(Some(op.eval(&lhs, &rhs)?))
            }
            Node::Negate(inner) => {
                let x = self.eval_arg(inner)?;
                let x = x.as_number().ok_or(Error::ExpectedNumber)?;
                Ok(Some(Value::num(-x)))
            }
            Node::Define(proc) => {
                self.define(proc.clone())?;
                Ok(None)
            }
            Node::Call { name, args, .. } => {
                let proc = self
                    .procedure(name)
                    .ok_or_else(|| Error::UnknownProc(name.to_uppercase()))?;
                trace!("calling {name} with {} inputs", args.len());
                proc.call_unevaluated(args, self)
            }
        }
    }

    /// Evaluates an expression whose value is needed.
    pub fn eval_arg(&mut self, node: &Node) -> Result<Value, Interrupt> {
        self.eval(node)?.ok_or(Interrupt::Error(Error::NoOutput))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_from_values() {
        let list = Value::list(vec![Value::text("pisz"), Value::text("a;b")]);
        let block = Block::from_value(&list).unwrap();
        assert_eq!(block.source(), "pisz a\\;b");
        assert!(Block::from_value(&Value::empty_list()).unwrap().is_empty());
        assert_eq!(
            Block::from_value(&Value::array(vec![], 1)).unwrap_err(),
            Error::ExpectedBlock
        );
    }

    #[test]
    fn unused_values() {
        let mut env = Env::default();
        assert_eq!(
            env.run("1 + 2", RunOptions::default()),
            Err(Error::UnusedValue("3".into()))
        );
        assert_eq!(env.eval_str("1 + 2"), Ok(Some(Value::num(3.0))));
        assert_eq!(env.eval_str("1 2 3"), Ok(Some(Value::num(3.0))));
        assert_eq!(env.eval_str(""), Ok(None));
    }

    #[test]
    fn outputs_outside_procedures() {
        let mut env = Env::default();
        assert_eq!(
            env.eval_str("wynik 1"),
            Err(Error::OutsideProcedure("WYNIK".into()))
        );
        assert_eq!(
            env.eval_str("stopmnie"),
            Err(Error::OutsideProcedure("STOPMNIE".into()))
        );
        assert_eq!(env.eval_str("dość"), Err(Error::OutsideLoop("DOŚĆ".into())));
    }
}
