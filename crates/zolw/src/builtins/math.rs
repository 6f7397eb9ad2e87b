use crate::{
    env::Env,
    io::DEFAULT_SEED,
    proc::{fn_many, fn_one, fn_three, fn_two, Arity},
    typ::{checked_div, modulo, remainder, Value},
    Error,
};

fn numbers(args: Vec<Value>) -> Result<Vec<f64>, Error> {
    args.into_iter().map(f64::try_from).collect()
}

// Bitwise operations work on 32-bit integers, wrapping anything bigger.
fn int32(x: f64) -> i32 {
    x as i64 as i32
}

fn bitwise(args: Vec<Value>, op: impl Fn(i32, i32) -> i32) -> Result<f64, Error> {
    let xs = numbers(args)?;
    let mut xs = xs.into_iter().map(int32);
    let first = xs.next().ok_or(Error::ExpectedNumber)?;
    Ok(f64::from(xs.fold(first, op)))
}

fn arctan(args: Vec<Value>) -> Result<f64, Error> {
    match numbers(args)?.as_slice() {
        [x] => Ok(x.atan()),
        [x, y] => Ok(y.atan2(*x)),
        _ => Err(Error::ExpectedNumber),
    }
}

pub(super) fn install(env: &mut Env) {
    env.add_primitive(fn_many("sum", Arity::variadic(0, 2), |args, _env| {
        Ok::<_, Error>(numbers(args)?.into_iter().sum::<f64>())
    }));
    env.add_primitive(fn_two("difference", |x: f64, y: f64, _env| x - y));
    env.add_primitive(fn_one("minus", |x: f64, _env| -x));
    env.add_primitive(fn_many("product", Arity::variadic(0, 2), |args, _env| {
        Ok::<_, Error>(numbers(args)?.into_iter().product::<f64>())
    }));
    env.add_primitive(fn_many(
        "quotient",
        Arity::range(1, 2, 2),
        |args, _env| -> Result<f64, Error> {
            match numbers(args)?.as_slice() {
                [x] => checked_div(1.0, *x),
                [x, y] => checked_div(*x, *y),
                _ => Err(Error::ExpectedNumber),
            }
        },
    ));
    env.add_primitive(fn_two("remainder", |x: f64, y: f64, _env| remainder(x, y)));
    env.add_primitive(fn_two("modulo", |x: f64, y: f64, _env| modulo(x, y)));
    env.add_primitive(fn_one("abs", |x: f64, _env| x.abs()));
    env.add_primitive(fn_one("int", |x: f64, _env| x.trunc()));
    // Halves go up, so -2.5 rounds to -2.
    env.add_primitive(fn_one("round", |x: f64, _env| (x + 0.5).floor()));
    // Halves go away from zero, so -2.5 rounds to -3.
    env.add_primitive(fn_one("roundaway", |x: f64, _env| x.round()));
    env.add_primitive(fn_one("sqrt", |x: f64, _env| x.sqrt()));
    env.add_primitive(fn_two("power", |x: f64, y: f64, _env| x.powf(y)));
    env.add_primitive(fn_one("exp", |x: f64, _env| x.exp()));
    env.add_primitive(fn_one("log10", |x: f64, _env| x.log10()));
    env.add_primitive(fn_one("ln", |x: f64, _env| x.ln()));

    env.add_primitive(fn_many("arctan", Arity::range(1, 1, 2), |args, _env| {
        arctan(args).map(f64::to_degrees)
    }));
    env.add_primitive(fn_one("sin", |x: f64, _env| x.to_radians().sin()));
    env.add_primitive(fn_one("cos", |x: f64, _env| x.to_radians().cos()));
    env.add_primitive(fn_one("tan", |x: f64, _env| x.to_radians().tan()));
    env.add_primitive(fn_many("radarctan", Arity::range(1, 1, 2), |args, _env| {
        arctan(args)
    }));
    env.add_primitive(fn_one("radsin", |x: f64, _env| x.sin()));
    env.add_primitive(fn_one("radcos", |x: f64, _env| x.cos()));
    env.add_primitive(fn_one("radtan", |x: f64, _env| x.tan()));

    env.add_primitive(fn_two("iseq", |from: i64, to: i64, _env| -> Result<Vec<Value>, Error> {
        let step = if from <= to { 1 } else { -1 };
        let len = to
            .checked_sub(from)
            .and_then(i64::checked_abs)
            .and_then(|n| n.checked_add(1))
            .ok_or(Error::IndexOutOfBounds)?;
        Ok((0..len)
            .map(|i| Value::num((from + i * step) as f64))
            .collect())
    }));
    env.add_primitive(fn_three("rseq", |from: f64, to: f64, count: i64, _env| {
        let step = if count > 1 {
            (to - from) / (count - 1) as f64
        } else {
            0.0
        };
        (0..count.max(0))
            .map(|i| Value::num(from + i as f64 * step))
            .collect::<Vec<_>>()
    }));
    env.add_primitive(fn_two("greaterp", |x: f64, y: f64, _env| x > y));
    env.add_primitive(fn_two("greaterequalp", |x: f64, y: f64, _env| x >= y));
    env.add_primitive(fn_two("lessp", |x: f64, y: f64, _env| x < y));
    env.add_primitive(fn_two("lessequalp", |x: f64, y: f64, _env| x <= y));

    env.add_primitive(fn_many(
        "random",
        Arity::range(1, 1, 2),
        |args, env| -> Result<f64, Error> {
            let (lo, hi) = match numbers(args)?.as_slice() {
                [n] => (0.0, n.floor()),
                [a, b] => (a.floor(), b.floor() + 1.0),
                _ => return Err(Error::ExpectedNumber),
            };
            Ok(lo + (env.random() * (hi - lo)).floor())
        },
    ));
    env.add_primitive(fn_many(
        "rerandom",
        Arity::range(0, 0, 1),
        |args, env| -> Result<(), Error> {
            let seed = match args.into_iter().next() {
                Some(v) => i64::try_from(v)? as u64,
                None => DEFAULT_SEED,
            };
            env.reseed(seed);
            Ok(())
        },
    ));
    env.add_primitive(fn_three(
        "form",
        |x: f64, width: i64, precision: i64, _env| {
            let width = usize::try_from(width).unwrap_or(0);
            let precision = usize::try_from(precision).unwrap_or(0);
            format!("{x:>width$.precision$}")
        },
    ));

    env.add_primitive(fn_many("bitand", Arity::variadic(1, 2), |args, _env| {
        bitwise(args, |a, b| a & b)
    }));
    env.add_primitive(fn_many("bitor", Arity::variadic(1, 2), |args, _env| {
        bitwise(args, |a, b| a | b)
    }));
    env.add_primitive(fn_many("bitxor", Arity::variadic(1, 2), |args, _env| {
        bitwise(args, |a, b| a ^ b)
    }));
    env.add_primitive(fn_one("bitnot", |x: f64, _env| f64::from(!int32(x))));
    env.add_primitive(fn_two("ashift", |x: f64, n: i64, _env| {
        let x = int32(x);
        let shifted = if n >= 0 {
            x.wrapping_shl(n as u32)
        } else {
            x.wrapping_shr(n.unsigned_abs() as u32)
        };
        f64::from(shifted)
    }));
    env.add_primitive(fn_two("lshift", |x: f64, n: i64, _env| {
        let x = int32(x) as u32;
        if n >= 0 {
            f64::from(x.wrapping_shl(n as u32) as i32)
        } else {
            f64::from(x.wrapping_shr(n.unsigned_abs() as u32))
        }
    }));
}

#[cfg(test)]
mod tests {
    use crate::{Env, Error, Value};

    fn num(env: &mut Env, s: &str) -> f64 {
        env.eval_str(s)
            .unwrap()
            .and_then(|v| v.as_number())
            .unwrap()
    }

    #[test]
    fn arithmetic() {
        let mut env = Env::default();
        assert_eq!(num(&mut env, "(suma 1 2 3 4)"), 10.0);
        assert_eq!(num(&mut env, "(iloczyn 2 3 4)"), 24.0);
        assert_eq!(num(&mut env, "(iloraz 2)"), 0.5);
        assert_eq!(num(&mut env, "reszta -7 4"), -3.0);
        assert_eq!(num(&mut env, "mod -7 4"), 3.0);
        assert_eq!(num(&mut env, "mod 7 -4"), -3.0);
        assert_eq!(env.eval_str("iloraz 1 0"), Err(Error::DivisionByZero));
        assert_eq!(num(&mut env, "int -3.5"), -3.0);
    }

    #[test]
    fn rounding() {
        let mut env = Env::default();
        assert_eq!(num(&mut env, "zaokr 2.5"), 3.0);
        assert_eq!(num(&mut env, "zaokr -2.5"), -2.0);
        assert_eq!(num(&mut env, "zaokr -2.6"), -3.0);
        assert_eq!(num(&mut env, "zaokrąglij -2.5"), -3.0);
        assert_eq!(num(&mut env, "zaokrąglij 2.5"), 3.0);
    }

    #[test]
    fn trigonometry() {
        let mut env = Env::default();
        assert_eq!(num(&mut env, "arctg 1"), 45.0);
        assert_eq!(num(&mut env, "2 * (arctg 0 1)"), 180.0);
        assert!((num(&mut env, "sin 30") - 0.5).abs() < 1e-12);
        assert!((num(&mut env, "radcos 1.0471975511965976") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sequences() {
        let mut env = Env::default();
        let show = |env: &mut Env, s: &str| env.eval_str(s).unwrap().unwrap().to_string();
        assert_eq!(show(&mut env, "isekw 7 3"), "[7 6 5 4 3]");
        assert_eq!(show(&mut env, "rsekw 3 5 5"), "[3 3.5 4 4.5 5]");
        assert_eq!(show(&mut env, "postać 123.456 10 2"), "    123.46");
        assert_eq!(show(&mut env, "postać 123.456 10 0"), "       123");
        assert_eq!(
            env.eval_str("długość isekw -9e18 9e18"),
            Err(Error::IndexOutOfBounds)
        );
    }

    #[test]
    fn bits() {
        let mut env = Env::default();
        assert_eq!(num(&mut env, "(biti 7 11 15)"), 3.0);
        assert_eq!(num(&mut env, "(bitalbo 1 2 7)"), 4.0);
        assert_eq!(num(&mut env, "bitnie 0"), -1.0);
        assert_eq!(num(&mut env, "przesuńarytmetyczniewlewo -1024 -1"), -512.0);
        assert_eq!(num(&mut env, "przesuńarytmetyczniewlewo 1 2"), 4.0);
        assert_eq!(num(&mut env, "przesuńlogiczniewlewo -1 -1"), 2147483647.0);
    }

    #[test]
    fn random_numbers() {
        let mut env = Env::default();
        for _ in 0..20 {
            let x = num(&mut env, "losowa 10");
            assert!((0.0..10.0).contains(&x) && x.fract() == 0.0);
        }
        let code = "startlos przypisz \"x losowa 100 startlos przypisz \"y losowa 100 :x - :y";
        assert_eq!(num(&mut env, code), 0.0);
        assert_eq!(
            env.eval_str("(startlos 7) losowa 1000"),
            env.eval_str("(startlos 7) losowa 1000")
        );
        assert!(matches!(env.eval_str("losowa 5"), Ok(Some(Value::Num(_)))));
    }
}
