use std::{convert::Infallible, marker::PhantomData, rc::Rc};

use crate::{
    env::Env,
    error::{EvalResult, Interrupt},
    eval::{Block, Mode},
    parse::Node,
    typ::Value,
    Error,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProcKind {
    Primitive,
    /// A primitive that can't be redefined, erased, or used as a template.
    Special,
    User,
}

/// How many inputs a procedure takes.
///
/// A call without parentheses always passes `default` inputs; a parenthesized call can pass
/// anything from `min` to `max`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Arity {
    pub min: usize,
    pub default: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn fixed(n: usize) -> Arity {
        Arity {
            min: n,
            default: n,
            max: Some(n),
        }
    }

    pub const fn variadic(min: usize, default: usize) -> Arity {
        Arity {
            min,
            default,
            max: None,
        }
    }

    pub const fn range(min: usize, default: usize, max: usize) -> Arity {
        Arity {
            min,
            default,
            max: Some(max),
        }
    }

    pub fn check(&self, count: usize, name: &str) -> Result<(), Error> {
        if count < self.min {
            Err(Error::NotEnoughInputs(name.to_uppercase()))
        } else if self.max.is_some_and(|max| count > max) {
            Err(Error::TooManyInputs(name.to_uppercase()))
        } else {
            Ok(())
        }
    }
}

pub trait Proc {
    /// Primitives are named by their internal (English) identifier, whatever the locale.
    fn name(&self) -> &str;
    fn arity(&self) -> Arity;
    fn kind(&self) -> ProcKind;

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult;

    /// Calls the procedure on argument expressions that haven't been evaluated yet.
    ///
    /// Most procedures just evaluate them all, left to right; special forms get to decide.
    fn call_unevaluated(&self, args: &[Node], env: &mut Env) -> EvalResult {
        let mut vals = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(env.eval_arg(arg)?);
        }
        self.call(vals, env)
    }

    /// The source text of a user-defined procedure.
    fn definition(&self) -> Option<&str> {
        None
    }
}

impl std::fmt::Debug for dyn Proc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:?} {}>", self.kind(), self.name())
    }
}

#[derive(Debug)]
pub struct UserProc {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    pub text: String,
}

impl Proc for UserProc {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> Arity {
        Arity::fixed(self.params.len())
    }

    fn kind(&self) -> ProcKind {
        ProcKind::User
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        env.scoped(|env| {
            for (name, val) in self.params.iter().zip(args) {
                env.local_make(name, val);
            }
            match env.execute(&self.body, Mode::Command) {
                Ok(_) | Err(Interrupt::Stop) => Ok(None),
                Err(Interrupt::Output(v)) => Ok(Some(v)),
                Err(Interrupt::Break) => Err(Error::OutsideLoop(env.display("break")).into()),
                Err(e) => Err(e),
            }
        })
    }

    fn definition(&self) -> Option<&str> {
        Some(&self.text)
    }
}

impl From<Infallible> for Error {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        value.as_number().ok_or(Error::ExpectedNumber)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        let x = f64::try_from(value)?;
        if x.fract() != 0.0 || !x.is_finite() {
            return Err(Error::ExpectedInteger);
        }
        Ok(x as i64)
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        value.as_bool()
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        value.as_word().ok_or(Error::ExpectedString)
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Error> {
        match value {
            Value::List(items) => Ok(items.to_vec()),
            _ => Err(Error::ExpectedList),
        }
    }
}

pub trait IntoEvalResult {
    fn into_eval_result(self) -> EvalResult;
}

impl IntoEvalResult for () {
    fn into_eval_result(self) -> EvalResult {
        Ok(None)
    }
}

impl IntoEvalResult for EvalResult {
    fn into_eval_result(self) -> EvalResult {
        self
    }
}

impl IntoEvalResult for Value {
    fn into_eval_result(self) -> EvalResult {
        Ok(Some(self))
    }
}

impl IntoEvalResult for Option<Value> {
    fn into_eval_result(self) -> EvalResult {
        Ok(self)
    }
}

impl IntoEvalResult for f64 {
    fn into_eval_result(self) -> EvalResult {
        Ok(Some(Value::num(self)))
    }
}

impl IntoEvalResult for bool {
    fn into_eval_result(self) -> EvalResult {
        Ok(Some(Value::bool(self)))
    }
}

impl IntoEvalResult for String {
    fn into_eval_result(self) -> EvalResult {
        Ok(Some(Value::text(self)))
    }
}

impl IntoEvalResult for Vec<Value> {
    fn into_eval_result(self) -> EvalResult {
        Ok(Some(Value::list(self)))
    }
}

impl<T: IntoEvalResult> IntoEvalResult for Result<T, Error> {
    fn into_eval_result(self) -> EvalResult {
        self?.into_eval_result()
    }
}

fn convert<T>(v: Value) -> Result<T, Error>
where
    T: TryFrom<Value>,
    Error: From<T::Error>,
{
    Ok(T::try_from(v)?)
}

struct FnZero<F: Fn(&mut Env) -> EvalResult> {
    f: F,
    name: &'static str,
}

struct FnOne<T, F: Fn(T, &mut Env) -> EvalResult> {
    f: F,
    marker: PhantomData<T>,
    name: &'static str,
}

struct FnTwo<S, T, F: Fn(S, T, &mut Env) -> EvalResult> {
    f: F,
    marker1: PhantomData<S>,
    marker2: PhantomData<T>,
    name: &'static str,
}

struct FnThree<R, S, T, F: Fn(R, S, T, &mut Env) -> EvalResult> {
    f: F,
    marker: PhantomData<(R, S, T)>,
    name: &'static str,
}

struct FnMany<F: Fn(Vec<Value>, &mut Env) -> EvalResult> {
    f: F,
    arity: Arity,
    name: &'static str,
}

struct SpecialForm<F: Fn(&[Node], &mut Env) -> EvalResult> {
    f: F,
    arity: Arity,
    name: &'static str,
}

impl<F: Fn(&mut Env) -> EvalResult> Proc for FnZero<F> {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::fixed(0)
    }

    fn kind(&self) -> ProcKind {
        ProcKind::Primitive
    }

    fn call(&self, _args: Vec<Value>, env: &mut Env) -> EvalResult {
        (self.f)(env)
    }
}

impl<T, F> Proc for FnOne<T, F>
where
    T: TryFrom<Value>,
    Error: From<T::Error>,
    F: Fn(T, &mut Env) -> EvalResult,
{
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::fixed(1)
    }

    fn kind(&self) -> ProcKind {
        ProcKind::Primitive
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        let mut args = args.into_iter();
        let x = convert(args.next().ok_or(Error::NotEnoughInputs(self.name.to_uppercase()))?)?;
        (self.f)(x, env)
    }
}

impl<S, T, F> Proc for FnTwo<S, T, F>
where
    S: TryFrom<Value>,
    T: TryFrom<Value>,
    Error: From<S::Error> + From<T::Error>,
    F: Fn(S, T, &mut Env) -> EvalResult,
{
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::fixed(2)
    }

    fn kind(&self) -> ProcKind {
        ProcKind::Primitive
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        let [x, y]: [Value; 2] = args
            .try_into()
            .map_err(|_| Error::NotEnoughInputs(self.name.to_uppercase()))?;
        (self.f)(convert(x)?, convert(y)?, env)
    }
}

impl<R, S, T, F> Proc for FnThree<R, S, T, F>
where
    R: TryFrom<Value>,
    S: TryFrom<Value>,
    T: TryFrom<Value>,
    Error: From<R::Error> + From<S::Error> + From<T::Error>,
    F: Fn(R, S, T, &mut Env) -> EvalResult,
{
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        Arity::fixed(3)
    }

    fn kind(&self) -> ProcKind {
        ProcKind::Primitive
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        let [x, y, z]: [Value; 3] = args
            .try_into()
            .map_err(|_| Error::NotEnoughInputs(self.name.to_uppercase()))?;
        (self.f)(convert(x)?, convert(y)?, convert(z)?, env)
    }
}

impl<F: Fn(Vec<Value>, &mut Env) -> EvalResult> Proc for FnMany<F> {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn kind(&self) -> ProcKind {
        ProcKind::Primitive
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        self.arity.check(args.len(), self.name)?;
        (self.f)(args, env)
    }
}

impl<F: Fn(&[Node], &mut Env) -> EvalResult> Proc for SpecialForm<F> {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn kind(&self) -> ProcKind {
        ProcKind::Special
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        let nodes: Vec<Node> = args.into_iter().map(Node::Literal).collect();
        (self.f)(&nodes, env)
    }

    fn call_unevaluated(&self, args: &[Node], env: &mut Env) -> EvalResult {
        (self.f)(args, env)
    }
}

pub fn fn_zero<U, F>(name: &'static str, f: F) -> Rc<dyn Proc>
where
    U: IntoEvalResult + 'static,
    F: Fn(&mut Env) -> U + 'static,
{
    Rc::new(FnZero {
        f: move |env: &mut Env| f(env).into_eval_result(),
        name,
    })
}

pub fn fn_one<T, U, F>(name: &'static str, f: F) -> Rc<dyn Proc>
where
    T: TryFrom<Value> + 'static,
    Error: From<T::Error>,
    U: IntoEvalResult + 'static,
    F: Fn(T, &mut Env) -> U + 'static,
{
    Rc::new(FnOne {
        f: move |x: T, env: &mut Env| f(x, env).into_eval_result(),
        marker: PhantomData,
        name,
    })
}

pub fn fn_two<S, T, U, F>(name: &'static str, f: F) -> Rc<dyn Proc>
where
    S: TryFrom<Value> + 'static,
    T: TryFrom<Value> + 'static,
    Error: From<S::Error> + From<T::Error>,
    U: IntoEvalResult + 'static,
    F: Fn(S, T, &mut Env) -> U + 'static,
{
    Rc::new(FnTwo {
        f: move |x: S, y: T, env: &mut Env| f(x, y, env).into_eval_result(),
        marker1: PhantomData,
        marker2: PhantomData,
        name,
    })
}

pub fn fn_three<R, S, T, U, F>(name: &'static str, f: F) -> Rc<dyn Proc>
where
    R: TryFrom<Value> + 'static,
    S: TryFrom<Value> + 'static,
    T: TryFrom<Value> + 'static,
    Error: From<R::Error> + From<S::Error> + From<T::Error>,
    U: IntoEvalResult + 'static,
    F: Fn(R, S, T, &mut Env) -> U + 'static,
{
    Rc::new(FnThree {
        f: move |x: R, y: S, z: T, env: &mut Env| f(x, y, z, env).into_eval_result(),
        marker: PhantomData,
        name,
    })
}

pub fn fn_many<U, F>(name: &'static str, arity: Arity, f: F) -> Rc<dyn Proc>
where
    U: IntoEvalResult + 'static,
    F: Fn(Vec<Value>, &mut Env) -> U + 'static,
{
    Rc::new(FnMany {
        f: move |args: Vec<Value>, env: &mut Env| f(args, env).into_eval_result(),
        arity,
        name,
    })
}

pub fn special<U, F>(name: &'static str, arity: Arity, f: F) -> Rc<dyn Proc>
where
    U: IntoEvalResult + 'static,
    F: Fn(&[Node], &mut Env) -> U + 'static,
{
    Rc::new(SpecialForm {
        f: move |args: &[Node], env: &mut Env| f(args, env).into_eval_result(),
        arity,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_checks() {
        let a = Arity::range(1, 2, 3);
        assert_eq!(a.check(0, "foo"), Err(Error::NotEnoughInputs("FOO".into())));
        assert_eq!(a.check(2, "foo"), Ok(()));
        assert_eq!(a.check(4, "foo"), Err(Error::TooManyInputs("FOO".into())));
        assert_eq!(Arity::variadic(0, 2).check(100, "foo"), Ok(()));
    }

    #[test]
    fn conversions() {
        assert_eq!(f64::try_from(Value::text("2.5")), Ok(2.5));
        assert_eq!(f64::try_from(Value::text("x")), Err(Error::ExpectedNumber));
        assert_eq!(i64::try_from(Value::num(3.0)), Ok(3));
        assert_eq!(i64::try_from(Value::num(3.5)), Err(Error::ExpectedInteger));
        assert_eq!(String::try_from(Value::num(3.0)), Ok("3".to_owned()));
        assert_eq!(
            String::try_from(Value::empty_list()),
            Err(Error::ExpectedString)
        );
        assert_eq!(
            Vec::<Value>::try_from(Value::text("abc")),
            Err(Error::ExpectedList)
        );
        assert_eq!(bool::try_from(Value::text("prawda")), Ok(true));
    }

    #[test]
    fn typed_adapters() {
        let mut env = Env::default();
        let add = fn_two("add", |x: f64, y: f64, _env| x + y);
        assert_eq!(add.arity(), Arity::fixed(2));
        assert_eq!(
            add.call(vec![Value::num(1.0), Value::text("2")], &mut env),
            Ok(Some(Value::num(3.0)))
        );
        assert_eq!(
            add.call(vec![Value::num(1.0), Value::text("a")], &mut env),
            Err(Interrupt::Error(Error::ExpectedNumber))
        );

        let count = fn_many("count", Arity::variadic(1, 1), |args, _env| args.len() as f64);
        assert_eq!(
            count.call(vec![], &mut env),
            Err(Interrupt::Error(Error::NotEnoughInputs("COUNT".into())))
        );
    }
}
