//! Higher-order procedures, which take a template saying what to do with each input.
//!
//! A template is one of:
//! - the name of a procedure, which is called with the inputs;
//! - a list whose first element is a list of parameter names, `[[x y] :x + :y]`, whose
//!   remaining elements run with the parameters bound as locals;
//! - any other list, which runs with `?` (or `(? n)`) standing in for the inputs.

use std::rc::Rc;

use crate::{
    env::Env,
    error::{EvalResult, Interrupt},
    eval::{Block, Mode},
    proc::{fn_many, fn_two, Arity, Proc, ProcKind},
    typ::Value,
    Error,
};

use super::{data::same_kind, name_of};

enum Template {
    Proc(String, Rc<dyn Proc>),
    Lambda { params: Vec<String>, body: Block },
    Slots(Block),
}

impl Template {
    /// Resolves a template for the primitive `prim`, whose internal name goes into error
    /// messages.
    fn new(prim: &str, v: &Value, env: &Env) -> Result<Template, Error> {
        match v {
            Value::List(items) => match items.split_first() {
                Some((Value::List(params), body)) if params.iter().all(Value::is_word) => {
                    Ok(Template::Lambda {
                        params: params.iter().map(name_of).collect::<Result<_, _>>()?,
                        body: Block::from_value(&Value::list(body.to_vec()))?,
                    })
                }
                _ => Ok(Template::Slots(Block::from_value(v)?)),
            },
            Value::Array(_) => Err(Error::ExpectedList),
            word => {
                let name = name_of(word)?;
                let proc = env
                    .procedure(&name)
                    .ok_or_else(|| Error::UnknownTemplate(name.to_uppercase()))?;
                if proc.kind() == ProcKind::Special {
                    return Err(Error::ApplySpecial {
                        prim: prim.to_uppercase(),
                        name: name.to_uppercase(),
                    });
                }
                Ok(Template::Proc(name, proc))
            }
        }
    }

    fn call(&self, args: Vec<Value>, env: &mut Env) -> EvalResult {
        match self {
            Template::Proc(name, proc) => {
                proc.arity().check(args.len(), name)?;
                proc.call(args, env)
            }
            Template::Lambda { params, body } => env.scoped(|env| {
                for (param, arg) in params.iter().zip(args) {
                    env.local_make(param, arg);
                }
                match env.execute(body, Mode::Tolerate) {
                    Err(Interrupt::Output(v)) => Ok(Some(v)),
                    Err(Interrupt::Stop) => Ok(None),
                    res => res,
                }
            }),
            Template::Slots(body) => {
                env.template_args.push(args);
                let res = env.execute(body, Mode::Tolerate);
                env.template_args.pop();
                res
            }
        }
    }

    /// Calls the template for a value that has to be there.
    fn value(&self, args: Vec<Value>, env: &mut Env) -> Result<Value, Interrupt> {
        self.call(args, env)?.ok_or(Interrupt::Error(Error::NoOutput))
    }

    fn test(&self, arg: Value, env: &mut Env) -> Result<bool, Interrupt> {
        Ok(self.value(vec![arg], env)?.as_bool()?)
    }
}

pub(super) fn install(env: &mut Env) {
    env.add_primitive(fn_two(
        "apply",
        |template: Value, args: Vec<Value>, env| -> EvalResult {
            Template::new("apply", &template, env)?.call(args, env)
        },
    ));
    env.add_primitive(fn_many("invoke", Arity::variadic(1, 2), |args, env| -> EvalResult {
        let Some((template, args)) = args.split_first() else {
            return Err(Error::NotEnoughInputs(env.display("invoke")).into());
        };
        Template::new("invoke", template, env)?.call(args.to_vec(), env)
    }));
    env.add_primitive(fn_two(
        "foreach",
        |template: Value, seq: Value, env| -> EvalResult {
            let template = Template::new("foreach", &template, env)?;
            for item in seq.items()? {
                template.call(vec![item], env)?;
            }
            Ok(None)
        },
    ));
    env.add_primitive(fn_many("map", Arity::variadic(2, 2), |args, env| -> EvalResult {
        let Some((template, seqs)) = args.split_first() else {
            return Err(Error::NotEnoughInputs(env.display("map")).into());
        };
        let template = Template::new("map", template, env)?;
        let columns = seqs.iter().map(Value::items).collect::<Result<Vec<_>, _>>()?;
        let len = columns.iter().map(Vec::len).min().unwrap_or(0);
        let mut ret = Vec::with_capacity(len);
        for i in 0..len {
            let row = columns.iter().map(|c| c[i].clone()).collect();
            ret.push(template.value(row, env)?);
        }
        Ok(Some(same_kind(&seqs[0], ret)))
    }));
    env.add_primitive(fn_two(
        "filter",
        |template: Value, seq: Value, env| -> EvalResult {
            let template = Template::new("filter", &template, env)?;
            let mut kept = Vec::new();
            for item in seq.items()? {
                if template.test(item.clone(), env)? {
                    kept.push(item);
                }
            }
            Ok(Some(same_kind(&seq, kept)))
        },
    ));
    env.add_primitive(fn_two(
        "find",
        |template: Value, seq: Value, env| -> EvalResult {
            let template = Template::new("find", &template, env)?;
            for item in seq.items()? {
                if template.test(item.clone(), env)? {
                    return Ok(Some(item));
                }
            }
            Ok(Some(Value::empty_list()))
        },
    ));
    env.add_primitive(fn_many("reduce", Arity::range(2, 2, 3), |args, env| -> EvalResult {
        let [template, seq, init @ ..] = args.as_slice() else {
            return Err(Error::NotEnoughInputs(env.display("reduce")).into());
        };
        let template = Template::new("reduce", template, env)?;
        let mut items = seq.items()?.into_iter();
        let first = match init.first() {
            Some(v) => v.clone(),
            None => items.next().ok_or(Error::IndexOutOfBounds)?,
        };
        let mut acc = first;
        for item in items {
            acc = template.value(vec![acc, item], env)?;
        }
        Ok(Some(acc))
    }));
    env.add_primitive(fn_many("?", Arity::range(0, 0, 1), |args, env| -> Result<Value, Error> {
        let n = match args.into_iter().next() {
            Some(v) => i64::try_from(v)?,
            None => 1,
        };
        env.template_args
            .last()
            .zip(n.checked_sub(1).and_then(|i| usize::try_from(i).ok()))
            .and_then(|(slots, i)| slots.get(i).cloned())
            .ok_or(Error::IndexOutOfBounds)
    }));
}
