use crate::{
    env::Env,
    error::Interrupt,
    parse::Node,
    proc::{fn_many, fn_one, fn_zero, special, Arity},
    typ::Value,
    Error,
};

/// Evaluates arguments left to right until one of them is `stop_at`.
fn short_circuit(args: &[Node], env: &mut Env, stop_at: bool) -> Result<bool, Interrupt> {
    for arg in args {
        if env.eval_arg(arg)?.as_bool()? == stop_at {
            return Ok(stop_at);
        }
    }
    Ok(!stop_at)
}

pub(super) fn install(env: &mut Env) {
    env.add_primitive(fn_zero("true", |_env| true));
    env.add_primitive(fn_zero("false", |_env| false));
    env.add_primitive(special("and", Arity::variadic(0, 2), |args, env| {
        short_circuit(args, env, false).map(|b| Some(Value::bool(b)))
    }));
    env.add_primitive(special("or", Arity::variadic(0, 2), |args, env| {
        short_circuit(args, env, true).map(|b| Some(Value::bool(b)))
    }));
    env.add_primitive(fn_many(
        "xor",
        Arity::variadic(0, 2),
        |args, _env| -> Result<bool, Error> {
            let mut ret = false;
            for arg in args {
                ret ^= arg.as_bool()?;
            }
            Ok(ret)
        },
    ));
    env.add_primitive(fn_one("not", |b: bool, _env| !b));
}

#[cfg(test)]
mod tests {
    use crate::{Env, Error, Value};

    #[test]
    fn connectives() {
        let mut env = Env::default();
        assert_eq!(env.eval_str("i prawda \"prawda"), Ok(Some(Value::num(1.0))));
        assert_eq!(env.eval_str("(i prawda 1 0)"), Ok(Some(Value::num(0.0))));
        assert_eq!(env.eval_str("(lub)"), Ok(Some(Value::num(0.0))));
        assert_eq!(env.eval_str("(albo 1 1 1)"), Ok(Some(Value::num(1.0))));
        assert_eq!(env.eval_str("nie fałsz"), Ok(Some(Value::num(1.0))));
        assert_eq!(env.eval_str("nie \"x"), Err(Error::ExpectedNumber));
    }

    #[test]
    fn short_circuits() {
        let mut env = Env::default();
        // The second argument would fail if it were evaluated.
        assert_eq!(
            env.eval_str("i fałsz :nieznana"),
            Ok(Some(Value::num(0.0)))
        );
        assert_eq!(env.eval_str("lub 1 1 / 0"), Ok(Some(Value::num(1.0))));
        assert_eq!(
            env.eval_str("i prawda :nieznana"),
            Err(Error::UnknownVar("NIEZNANA".into()))
        );
    }
}
