//! Words, lists and arrays: building them, taking them apart, and asking about them.

use crate::{
    env::Env,
    proc::{fn_many, fn_one, fn_three, fn_two, fn_zero, Arity},
    typ::{parse_number, Value},
    Error,
};

use super::var;

/// Rebuilds a sequence of the same flavor as `like` from some of its elements.
pub(super) fn same_kind(like: &Value, items: Vec<Value>) -> Value {
    match like {
        Value::Text(_) => Value::text(
            items
                .iter()
                .filter_map(Value::as_word)
                .collect::<String>(),
        ),
        _ => Value::list(items),
    }
}

fn nonempty(v: &Value) -> Result<Vec<Value>, Error> {
    let items = v.items()?;
    if items.is_empty() {
        Err(Error::IndexOutOfBounds)
    } else {
        Ok(items)
    }
}

fn concat(args: &[Value]) -> Result<String, Error> {
    args.iter()
        .map(|v| v.as_word().ok_or(Error::ExpectedString))
        .collect()
}

fn list_var(env: &Env, name: &str) -> Result<Vec<Value>, Error> {
    Vec::<Value>::try_from(var(env, name)?)
}

fn first(v: Value) -> Result<Value, Error> {
    Ok(nonempty(&v)?.swap_remove(0))
}

fn butfirst(v: Value) -> Result<Value, Error> {
    let mut items = nonempty(&v)?;
    items.remove(0);
    Ok(same_kind(&v, items))
}

fn array_origin(origin: Option<Value>) -> Result<i64, Error> {
    origin.map_or(Ok(1), i64::try_from)
}

pub(super) fn install(env: &mut Env) {
    // Constructors
    env.add_primitive(fn_many("word", Arity::variadic(0, 2), |args, _env| {
        concat(&args)
    }));
    env.add_primitive(fn_many("list", Arity::variadic(0, 2), |args, _env| args));
    env.add_primitive(fn_many("sentence", Arity::variadic(0, 2), |args, _env| {
        let mut ret = Vec::new();
        for a in args {
            match a {
                Value::List(items) => ret.extend(items.iter().cloned()),
                a => ret.push(a),
            }
        }
        ret
    }));
    env.add_primitive(fn_two("fput", |thing: Value, seq: Value, _env| -> Result<Value, Error> {
        match seq {
            Value::List(items) => {
                let mut ret = vec![thing];
                ret.extend(items.iter().cloned());
                Ok(Value::list(ret))
            }
            Value::Text(_) | Value::Num(_) => Ok(Value::text(concat(&[thing, seq])?)),
            Value::Array(_) => Err(Error::ExpectedList),
        }
    }));
    env.add_primitive(fn_two("lput", |thing: Value, seq: Value, _env| -> Result<Value, Error> {
        match seq {
            Value::List(items) => {
                let mut ret = items.to_vec();
                ret.push(thing);
                Ok(Value::list(ret))
            }
            Value::Text(_) | Value::Num(_) => Ok(Value::text(concat(&[seq, thing])?)),
            Value::Array(_) => Err(Error::ExpectedList),
        }
    }));
    env.add_primitive(fn_two("combine", |a: Value, b: Value, _env| -> Result<Value, Error> {
        match b {
            Value::List(items) => {
                let mut ret = vec![a];
                ret.extend(items.iter().cloned());
                Ok(Value::list(ret))
            }
            b => Ok(Value::text(concat(&[a, b])?)),
        }
    }));
    env.add_primitive(fn_one("reverse", |seq: Value, _env| -> Result<Value, Error> {
        let mut items = seq.items()?;
        items.reverse();
        Ok(same_kind(&seq, items))
    }));
    env.add_primitive(fn_zero("gensym", |env| env.gensym()));
    env.add_primitive(fn_many("array", Arity::range(1, 1, 2), |args, _env| -> Result<Value, Error> {
        let mut args = args.into_iter();
        let size = args.next().map_or(Ok(0), i64::try_from)?;
        let size = usize::try_from(size).map_err(|_| Error::IndexOutOfBounds)?;
        let origin = array_origin(args.next())?;
        Ok(Value::array(vec![Value::empty_list(); size], origin))
    }));
    env.add_primitive(fn_many(
        "listtoarray",
        Arity::range(1, 1, 2),
        |args, _env| -> Result<Value, Error> {
            let mut args = args.into_iter();
            let items = args
                .next()
                .map_or(Err(Error::ExpectedList), Vec::<Value>::try_from)?;
            let origin = array_origin(args.next())?;
            Ok(Value::array(items, origin))
        },
    ));
    env.add_primitive(fn_one("arraytolist", |arr: Value, _env| match arr {
        Value::Array(arr) => Ok(Value::list(arr.borrow().items.clone())),
        _ => Err(Error::ExpectedArray),
    }));

    // Selectors
    env.add_primitive(fn_one("first", |v: Value, _env| first(v)));
    env.add_primitive(fn_one("firsts", |v: Value, _env| -> Result<Value, Error> {
        let firsts = v.items()?.into_iter().map(first).collect::<Result<_, _>>()?;
        Ok(Value::list(firsts))
    }));
    env.add_primitive(fn_one("last", |v: Value, _env| -> Result<Value, Error> {
        let mut items = nonempty(&v)?;
        Ok(items.swap_remove(items.len() - 1))
    }));
    env.add_primitive(fn_one("butfirst", |v: Value, _env| butfirst(v)));
    env.add_primitive(fn_one("butfirsts", |v: Value, _env| -> Result<Value, Error> {
        let rests = v
            .items()?
            .into_iter()
            .map(butfirst)
            .collect::<Result<_, _>>()?;
        Ok(Value::list(rests))
    }));
    env.add_primitive(fn_one("butlast", |v: Value, _env| -> Result<Value, Error> {
        let mut items = nonempty(&v)?;
        items.pop();
        Ok(same_kind(&v, items))
    }));
    env.add_primitive(fn_two("item", |index: i64, seq: Value, _env| -> Result<Value, Error> {
        if let Value::Array(arr) = &seq {
            let arr = arr.borrow();
            return Ok(arr.items[arr.slot(index)?].clone());
        }
        let items = seq.items()?;
        index
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| items.get(i).cloned())
            .ok_or(Error::IndexOutOfBounds)
    }));
    env.add_primitive(fn_one("pick", |seq: Value, env| -> Result<Value, Error> {
        let items = nonempty(&seq)?;
        let i = (env.random() * items.len() as f64).floor() as usize;
        Ok(items[i.min(items.len() - 1)].clone())
    }));
    env.add_primitive(fn_two("remove", |thing: Value, seq: Value, _env| -> Result<Value, Error> {
        let items = seq.items()?.into_iter().filter(|v| *v != thing).collect();
        Ok(same_kind(&seq, items))
    }));
    env.add_primitive(fn_one("remdup", |seq: Value, _env| -> Result<Value, Error> {
        let mut kept: Vec<Value> = Vec::new();
        for v in seq.items()? {
            if !kept.contains(&v) {
                kept.push(v);
            }
        }
        Ok(same_kind(&seq, kept))
    }));

    // Mutators
    env.add_primitive(fn_three(
        "setitem",
        |index: i64, arr: Value, val: Value, _env| -> Result<(), Error> {
            match arr {
                Value::Array(arr) => {
                    let mut arr = arr.borrow_mut();
                    let slot = arr.slot(index)?;
                    arr.items[slot] = val;
                    Ok(())
                }
                _ => Err(Error::ExpectedArray),
            }
        },
    ));
    env.add_primitive(fn_two("push", |name: String, thing: Value, env| -> Result<(), Error> {
        let name = name.to_lowercase();
        let mut items = list_var(env, &name)?;
        items.insert(0, thing);
        env.assign(&name, Value::list(items));
        Ok(())
    }));
    env.add_primitive(fn_one("pop", |name: String, env| -> Result<Value, Error> {
        let name = name.to_lowercase();
        let mut items = list_var(env, &name)?;
        if items.is_empty() {
            return Err(Error::IndexOutOfBounds);
        }
        let top = items.remove(0);
        env.assign(&name, Value::list(items));
        Ok(top)
    }));
    env.add_primitive(fn_two("queue", |name: String, thing: Value, env| -> Result<(), Error> {
        let name = name.to_lowercase();
        let mut items = list_var(env, &name)?;
        items.push(thing);
        env.assign(&name, Value::list(items));
        Ok(())
    }));
    env.add_primitive(fn_one("dequeue", |name: String, env| -> Result<Value, Error> {
        let name = name.to_lowercase();
        let mut items = list_var(env, &name)?;
        let last = items.pop().ok_or(Error::IndexOutOfBounds)?;
        env.assign(&name, Value::list(items));
        Ok(last)
    }));

    // Predicates
    env.add_primitive(fn_one("wordp", |v: Value, _env| {
        matches!(v, Value::Text(_))
    }));
    env.add_primitive(fn_one("listp", |v: Value, _env| {
        matches!(v, Value::List(_))
    }));
    env.add_primitive(fn_one("arrayp", |v: Value, _env| {
        matches!(v, Value::Array(_))
    }));
    env.add_primitive(fn_two("equalp", |a: Value, b: Value, _env| a == b));
    env.add_primitive(fn_two("notequalp", |a: Value, b: Value, _env| a != b));
    env.add_primitive(fn_one("numberp", |v: Value, _env| match v {
        Value::Num(_) => true,
        Value::Text(s) => parse_number(&s).is_some(),
        _ => false,
    }));
    env.add_primitive(fn_one("emptyp", |v: Value, _env| v.is_empty()));
    env.add_primitive(fn_two("beforep", |a: String, b: String, _env| a < b));
    env.add_primitive(fn_two("substringp", |a: String, b: String, _env| {
        b.contains(a.as_str())
    }));
    env.add_primitive(fn_two("memberp", |thing: Value, seq: Value, _env| -> Result<bool, Error> {
        Ok(seq.items()?.contains(&thing))
    }));

    // Queries
    env.add_primitive(fn_one("count", |v: Value, _env| -> Result<f64, Error> {
        let n = match &v {
            Value::Num(_) => v.as_word().map_or(0, |w| w.chars().count()),
            _ => v.items()?.len(),
        };
        Ok(n as f64)
    }));
    env.add_primitive(fn_one("ascii", |w: String, _env| {
        w.chars()
            .next()
            .map(|c| f64::from(u32::from(c)))
            .ok_or(Error::ExpectedString)
    }));
    env.add_primitive(fn_one("char", |code: i64, _env| {
        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or(Error::ExpectedInteger)
    }));
    env.add_primitive(fn_one("lowercase", |w: String, _env| w.to_lowercase()));
    env.add_primitive(fn_one("uppercase", |w: String, _env| w.to_uppercase()));
    env.add_primitive(fn_one("standout", |w: String, _env| w));
}
