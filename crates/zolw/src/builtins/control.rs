//! Control structures: running lists as code, conditionals and loops.

use log::trace;

use crate::{
    env::Env,
    error::{EvalResult, Interrupt},
    eval::{Block, Mode},
    parse::Node,
    proc::{fn_many, fn_one, fn_three, fn_two, fn_zero, special, Arity},
    typ::Value,
    Error,
};

use super::name_of;

/// Runs a loop body until `more` says to stop or the body breaks out.
///
/// The iteration number is visible to the body as `repcount`.
fn run_loop(env: &mut Env, body: &Block, more: impl Fn(f64) -> bool) -> EvalResult {
    env.repcounts.push(0.0);
    let res = iterate(env, body, more);
    env.repcounts.pop();
    res
}

fn iterate(env: &mut Env, body: &Block, more: impl Fn(f64) -> bool) -> EvalResult {
    let mut i = 1.0;
    while more(i) {
        if let Some(count) = env.repcounts.last_mut() {
            *count = i;
        }
        match env.execute(body, Mode::Command) {
            Ok(_) => {}
            Err(Interrupt::Break) => break,
            Err(e) => return Err(e),
        }
        i += 1.0;
    }
    Ok(None)
}

fn run_if(env: &mut Env, cond: bool, code: &Value) -> EvalResult {
    if cond {
        env.run_value(code, Mode::Tolerate)
    } else {
        Ok(None)
    }
}

/// Evaluates a loop body argument, which has to be a list.
fn block_arg(env: &mut Env, node: &Node) -> Result<Block, Interrupt> {
    match env.eval_arg(node)? {
        v @ Value::List(_) => Ok(Block::from_value(&v)?),
        _ => Err(Error::ExpectedBlock.into()),
    }
}

/// Evaluates a loop condition. A list is run as code, and its value is the condition.
fn condition(env: &mut Env, node: &Node) -> Result<bool, Interrupt> {
    let v = match env.eval_arg(node)? {
        v @ Value::List(_) => env
            .run_value(&v, Mode::Tolerate)?
            .ok_or(Error::NoOutput)?,
        v => v,
    };
    Ok(v.as_bool()?)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Check {
    Before,
    After,
}

/// The `while` family: `check` says whether the condition is tested before or after the body,
/// and the loop runs for as long as the condition equals `keep_going`.
fn conditional_loop(
    id: &str,
    args: &[Node],
    env: &mut Env,
    check: Check,
    keep_going: bool,
) -> EvalResult {
    let (body, cond) = match (check, args) {
        (Check::After, [body, cond]) | (Check::Before, [cond, body]) => (body, cond),
        _ => return Err(Error::NotEnoughInputs(env.display(id)).into()),
    };
    let body = block_arg(env, body)?;
    let mut first = check == Check::After;
    loop {
        if !first && condition(env, cond)? != keep_going {
            return Ok(None);
        }
        first = false;
        match env.execute(&body, Mode::Command) {
            Ok(_) => {}
            Err(Interrupt::Break) => return Ok(None),
            Err(e) => return Err(e),
        }
    }
}

/// Splits a clause of `case` or `cond` into its selector and the code after it.
fn clause(v: &Value) -> Result<(Value, Value), Error> {
    let mut items = Vec::<Value>::try_from(v.clone())?;
    if items.is_empty() {
        return Err(Error::ExpectedList);
    }
    let selector = items.remove(0);
    Ok((selector, Value::list(items)))
}

fn is_else(env: &Env, selector: &Value) -> bool {
    selector
        .as_word()
        .is_some_and(|w| w.to_lowercase() == env.locale().else_word())
}

fn for_loop(control: Vec<Value>, body: Value, env: &mut Env) -> EvalResult {
    let Some((var, rest)) = control.split_first() else {
        return Err(Error::ExpectedList.into());
    };
    let var = name_of(var)?;
    let exprs = Block::from_value(&Value::list(rest.to_vec()))?;
    let nodes = exprs.parser().expressions(env)?;
    let (start, end, step) = match nodes.as_slice() {
        [start, end] => (start, end, None),
        [start, end, step] => (start, end, Some(step)),
        _ => return Err(Error::ExpectedList.into()),
    };
    let number = |env: &mut Env, node: &Node| -> Result<f64, Interrupt> {
        Ok(env.eval_arg(node)?.as_number().ok_or(Error::ExpectedNumber)?)
    };
    let start = number(env, start)?;
    let end = number(env, end)?;
    let body = Block::from_value(&body)?;
    trace!("for {var} from {start} to {end}");

    env.scoped(|env| {
        let mut i = start;
        loop {
            env.local_make(&var, Value::num(i));
            let step = match step {
                Some(node) => number(env, node)?,
                None if start <= end => 1.0,
                None => -1.0,
            };
            if !((step > 0.0 && i <= end) || (step < 0.0 && i >= end)) {
                return Ok(None);
            }
            match env.execute(&body, Mode::Command) {
                Ok(_) => {}
                Err(Interrupt::Break) => return Ok(None),
                Err(e) => return Err(e),
            }
            i += step;
        }
    })
}

pub(super) fn install(env: &mut Env) {
    env.add_primitive(fn_one("run", |code: Value, env| {
        env.run_value(&code, Mode::Tolerate)
    }));
    env.add_primitive(fn_one("runresult", |code: Value, env| -> EvalResult {
        let res = env.run_value(&code, Mode::Tolerate)?;
        Ok(Some(Value::list(res.into_iter().collect())))
    }));
    env.add_primitive(fn_two("repeat", |count: f64, body: Value, env| -> EvalResult {
        let body = Block::from_value(&body)?;
        let count = count.floor();
        run_loop(env, &body, |i| i <= count)
    }));
    env.add_primitive(fn_one("forever", |body: Value, env| -> EvalResult {
        let body = Block::from_value(&body)?;
        run_loop(env, &body, |_| true)
    }));
    env.add_primitive(fn_zero("repcount", |env| {
        env.repcounts.last().copied().unwrap_or(-1.0)
    }));

    env.add_primitive(fn_many("if", Arity::range(2, 2, 3), |args, env| -> EvalResult {
        match args.as_slice() {
            [cond, then] => run_if(env, cond.as_bool()?, then),
            [cond, then, otherwise] => {
                let code = if cond.as_bool()? { then } else { otherwise };
                env.run_value(code, Mode::Tolerate)
            }
            _ => Err(Error::NotEnoughInputs(env.display("if")).into()),
        }
    }));
    env.add_primitive(fn_three(
        "ifelse",
        |cond: bool, then: Value, otherwise: Value, env| {
            env.run_value(if cond { &then } else { &otherwise }, Mode::Tolerate)
        },
    ));
    env.add_primitive(fn_one("test", |cond: bool, env| env.test = cond));
    env.add_primitive(fn_one("iftrue", |code: Value, env| {
        let test = env.test;
        run_if(env, test, &code)
    }));
    env.add_primitive(fn_one("iffalse", |code: Value, env| {
        let test = env.test;
        run_if(env, !test, &code)
    }));
    env.add_primitive(fn_zero("break", |_env| -> EvalResult { Err(Interrupt::Break) }));
    env.add_primitive(fn_one("ignore", |_v: Value, _env| ()));

    env.add_primitive(fn_two("for", for_loop));
    env.add_primitive(special("do.while", Arity::fixed(2), |args, env| {
        conditional_loop("do.while", args, env, Check::After, true)
    }));
    env.add_primitive(special("while", Arity::fixed(2), |args, env| {
        conditional_loop("while", args, env, Check::Before, true)
    }));
    env.add_primitive(special("do.until", Arity::fixed(2), |args, env| {
        conditional_loop("do.until", args, env, Check::After, false)
    }));
    env.add_primitive(special("until", Arity::fixed(2), |args, env| {
        conditional_loop("until", args, env, Check::Before, false)
    }));

    env.add_primitive(fn_two(
        "case",
        |value: Value, clauses: Vec<Value>, env| -> EvalResult {
            for c in &clauses {
                let (selector, code) = clause(c)?;
                let matches = match &selector {
                    Value::List(items) => items.contains(&value),
                    s if is_else(env, s) => true,
                    s => *s == value,
                };
                if matches {
                    return env.run_value(&code, Mode::Tolerate);
                }
            }
            Ok(None)
        },
    ));
    env.add_primitive(fn_one("cond", |clauses: Vec<Value>, env| -> EvalResult {
        for c in &clauses {
            let (selector, code) = clause(c)?;
            let matches = match &selector {
                Value::List(_) => env
                    .run_value(&selector, Mode::Tolerate)?
                    .ok_or(Error::NoOutput)?
                    .as_bool()?,
                s if is_else(env, s) => true,
                s => s.as_bool()?,
            };
            if matches {
                return env.run_value(&code, Mode::Tolerate);
            }
        }
        Ok(None)
    }));
}

#[cfg(test)]
mod tests {
    use crate::{Env, Error, Value};

    fn show(env: &mut Env, s: &str) -> String {
        env.eval_str(s).unwrap().map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn running() {
        let mut env = Env::default();
        assert_eq!(show(&mut env, "przypisz \"c 0  zapuść [ przypisz \"c 5 ]  :c"), "5");
        assert_eq!(show(&mut env, "zapuśćraportuj [ przypisz \"x 1 ]"), "[]");
        assert_eq!(show(&mut env, "zapuśćraportuj [ 1 + 2 ]"), "[3]");
        assert_eq!(show(&mut env, "zapuść \"numpow"), "-1");
        assert_eq!(env.eval_str("ignoruj 1 > 2"), Ok(None));
    }

    #[test]
    fn repeating() {
        let mut env = Env::default();
        assert_eq!(
            show(&mut env, "przypisz \"c 0  powtórz 4 [ przypisz \"c :c + numpow ]  :c"),
            "10"
        );
        assert_eq!(show(&mut env, "przypisz \"c 0  powtórz 2.7 [ przypisz \"c :c + 1 ]  :c"), "2");
        env.eval_str("oto foo pętla [ przypisz \"c :c + numpow jeśli numpow = 4 [ stopmnie ] ] już")
            .unwrap();
        assert_eq!(show(&mut env, "przypisz \"c 0 foo :c"), "10");
        assert_eq!(env.eval_str("pętla [ jeśli numpow = 5 [ dość ] ]"), Ok(None));
        assert_eq!(show(&mut env, "numpow"), "-1");
        assert_eq!(
            env.eval_str("powtórz 2 [ 1 ]"),
            Err(Error::UnusedValue("1".into()))
        );
    }

    #[test]
    fn conditionals() {
        let mut env = Env::default();
        assert_eq!(
            show(&mut env, "jeśliinaczej 1 [ przypisz \"r \"a ] [ przypisz \"r \"b ]  :r"),
            "a"
        );
        assert_eq!(
            show(&mut env, "jeśliinaczej 0 [ przypisz \"r \"a ] [ przypisz \"r \"b ]  :r"),
            "b"
        );
        assert_eq!(show(&mut env, "(jeśli \"fałsz [ 1 ] [ 2 ])"), "2");
        env.eval_str("oto foo jeśli 1 [ wynik \"a ] wynik \"b już").unwrap();
        assert_eq!(show(&mut env, "foo"), "a");
        assert_eq!(
            show(&mut env, "przypisz \"c 1  test 2 > 1  jeślitak  [ przypisz \"c 2 ]  :c"),
            "2"
        );
        assert_eq!(
            show(&mut env, "przypisz \"c 1  test 2 > 1  jeślin [ przypisz \"c 2 ]  :c"),
            "1"
        );
        assert_eq!(env.eval_str("jeśli \"x [ ]"), Err(Error::ExpectedNumber));
    }

    #[test]
    fn counting() {
        let mut env = Env::default();
        let sum = |env: &mut Env, control: &str| {
            show(env, &format!("przypisz \"x 0  dla {control} [ przypisz \"x :x + :r ]  :x"))
        };
        assert_eq!(sum(&mut env, "[ r 1 5 ]"), "15");
        assert_eq!(sum(&mut env, "[ r 0 10 2 ]"), "30");
        assert_eq!(sum(&mut env, "[ r 10 0 -2 ]"), "30");
        assert_eq!(sum(&mut env, "[ r 10 0 -2-2 ]"), "18");
        assert_eq!(sum(&mut env, "[ r 5 1 ]"), "15");
        assert_eq!(
            show(&mut env, "przypisz \"x 0  dla [i 0 100 :i + 1] [przypisz \"x :x + :i]  :x"),
            "120"
        );
        assert_eq!(
            show(&mut env, "przypisz \"x 0  powtórz 3 [ dla [i 1 4] [przypisz \"x :x + 1] ]  :x"),
            "12"
        );
        assert_eq!(show(&mut env, "zmiennap \"i"), "0");
    }

    #[test]
    fn while_loops() {
        let mut env = Env::default();
        assert_eq!(
            show(&mut env, "przypisz \"x 0  wykonuj.dopóki [ przypisz \"x :x + 1 ] :x < 10  :x"),
            "10"
        );
        assert_eq!(
            show(&mut env, "przypisz \"x 0  dopóki :x < 10 [ przypisz \"x :x + 1 ]  :x"),
            "10"
        );
        assert_eq!(
            show(&mut env, "przypisz \"x 0  wykonuj.dopókinie [ przypisz \"x :x + 1 ] :x > 10  :x"),
            "11"
        );
        assert_eq!(
            show(&mut env, "przypisz \"x 0  dopókinie :x > 10 [ przypisz \"x :x + 1 ]  :x"),
            "11"
        );
        assert_eq!(show(&mut env, "przypisz \"x 5  dopóki [:x < 3] [ przypisz \"x 0 ]  :x"), "5");
        assert_eq!(
            show(&mut env, "przypisz \"x 5  wykonuj.dopóki [ przypisz \"x 0 ] \"fałsz  :x"),
            "0"
        );
        for code in ["wykonuj.dopóki 1 2", "dopóki 1 2", "wykonuj.dopókinie 1 2", "dopókinie 1 2"] {
            assert_eq!(env.eval_str(code), Err(Error::ExpectedBlock), "{code}");
        }
    }

    #[test]
    fn choosing() {
        let mut env = Env::default();
        env.eval_str(
            "oto samogłoskap :litera
               wynik wybierz :litera [ [[a e i o u] \"prawda] [inaczej \"fałsz] ]
             już",
        )
        .unwrap();
        assert_eq!(show(&mut env, "(lista samogłoskap \"a samogłoskap \"b)"), "[prawda fałsz]");
        assert_eq!(show(&mut env, "wybierz 3 [ [1 \"a] [3 \"c] ]"), "c");
        assert_eq!(env.eval_str("wybierz 4 [ [1 \"a] ]"), Ok(None));

        env.eval_str(
            "oto parzystap :n
               wynik nie biti :n 1
             już
             oto parzyste :liczby
               wy warunki [ [ [pustep :liczby] [] ]
                            [ [parzystap pierwszy :liczby]
                              nap pierwszy :liczby parzyste bezpierw :liczby ]
                            [ inaczej parzyste bezpierw :liczby ] ]
             już",
        )
        .unwrap();
        assert_eq!(show(&mut env, "parzyste [ 1 2 3 4 5 6 ]"), "[2 4 6]");
        assert_eq!(
            env.eval_str("warunki [ [ [ 1 ] \"a ] ]"),
            Ok(Some(Value::text("a")))
        );
    }
}
