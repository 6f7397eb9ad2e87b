use crate::{
    env::Env,
    error::{EvalResult, Interrupt},
    proc::{fn_many, fn_one, fn_three, fn_two, fn_zero, special, Arity, ProcKind},
    typ::Value,
    Error,
};

use super::{name_of, names_of, var, word_list};

/// The three sections of a contents list: procedures, variables and property lists.
#[derive(Debug, Default)]
struct Contents {
    procs: Vec<String>,
    names: Vec<String>,
    plists: Vec<String>,
}

impl Contents {
    /// Reads a contents list. A bare word or a flat list of words names procedures.
    fn parse(v: &Value) -> Result<Contents, Error> {
        let items = match v {
            Value::List(items) if !items.iter().all(Value::is_word) => items.to_vec(),
            _ => {
                return Ok(Contents {
                    procs: names_of(v)?,
                    ..Contents::default()
                })
            }
        };
        let mut sections = items.iter().map(names_of);
        let mut next = || sections.next().transpose().map(Option::unwrap_or_default);
        Ok(Contents {
            procs: next()?,
            names: next()?,
            plists: next()?,
        })
    }

    fn current(env: &Env) -> Contents {
        Contents {
            procs: env.user_procs(),
            names: env.global_names(),
            plists: env.plists.names(),
        }
    }

    fn into_value(self) -> Value {
        Value::list(vec![
            word_list(self.procs),
            word_list(self.names),
            word_list(self.plists),
        ])
    }

    fn erase(self, env: &mut Env) -> Result<(), Error> {
        for p in &self.procs {
            env.erase_proc(p)?;
        }
        for n in &self.names {
            env.erase_global(n);
        }
        for p in &self.plists {
            env.plists.erase(p);
        }
        Ok(())
    }

    fn bury(self, env: &mut Env, buried: bool) {
        for p in &self.procs {
            env.bury_proc(p, buried);
        }
        for n in &self.names {
            env.bury_global(n, buried);
        }
        for p in &self.plists {
            if buried {
                env.plists.bury(p);
            } else {
                env.plists.unbury(p);
            }
        }
    }
}

// Contents lists that only mention variables, or only property lists.
fn names_section(names: Vec<String>) -> Value {
    Value::list(vec![Value::empty_list(), word_list(names)])
}

fn plists_section(plists: Vec<String>) -> Value {
    Value::list(vec![Value::empty_list(), Value::empty_list(), word_list(plists)])
}

fn kind(env: &Env, name: &Value) -> Result<Option<ProcKind>, Error> {
    Ok(env.procedure(&name_of(name)?).map(|p| p.kind()))
}

pub(super) fn install(env: &mut Env) {
    // Definitions are handled by the parser; these only run when they turn up out of place.
    env.add_primitive(special("to", Arity::fixed(0), |_args, env| -> Result<(), Error> {
        Err(Error::Unexpected(env.display("to")))
    }));
    env.add_primitive(special("end", Arity::fixed(0), |_args, env| -> Result<(), Error> {
        Err(Error::Unexpected(env.display("end")))
    }));
    env.add_primitive(fn_one("output", |v: Value, _env| -> EvalResult {
        Err(Interrupt::Output(v))
    }));
    env.add_primitive(fn_zero("stop", |_env| -> EvalResult { Err(Interrupt::Stop) }));
    env.add_primitive(special(".maybeoutput", Arity::fixed(1), |args, env| -> EvalResult {
        let [arg] = args else {
            return Err(Error::NotEnoughInputs(env.display(".maybeoutput")).into());
        };
        match env.eval(arg)? {
            Some(v) => Err(Interrupt::Output(v)),
            None => Err(Interrupt::Stop),
        }
    }));

    env.add_primitive(fn_two("make", |name: Value, v: Value, env| -> Result<(), Error> {
        env.assign(&name_of(&name)?, v);
        Ok(())
    }));
    env.add_primitive(fn_two("name", |v: Value, name: Value, env| -> Result<(), Error> {
        env.assign(&name_of(&name)?, v);
        Ok(())
    }));
    env.add_primitive(fn_many(
        "local",
        Arity::variadic(1, 1),
        |args, env| -> Result<(), Error> {
            for arg in &args {
                for name in names_of(arg)? {
                    env.declare_local(&name);
                }
            }
            Ok(())
        },
    ));
    env.add_primitive(fn_two(
        "localmake",
        |name: Value, v: Value, env| -> Result<(), Error> {
            env.local_make(&name_of(&name)?, v);
            Ok(())
        },
    ));
    env.add_primitive(fn_one("thing", |name: Value, env| -> Result<Value, Error> {
        var(env, &name_of(&name)?)
    }));
    env.add_primitive(fn_many(
        "global",
        Arity::variadic(1, 1),
        |args, env| -> Result<(), Error> {
            for arg in &args {
                for name in names_of(arg)? {
                    env.declare_global(&name);
                }
            }
            Ok(())
        },
    ));

    env.add_primitive(fn_one("procedurep", |name: Value, env| {
        kind(env, &name).map(|k| k.is_some())
    }));
    env.add_primitive(fn_one("primitivep", |name: Value, env| {
        kind(env, &name).map(|k| k.is_some_and(|k| k != ProcKind::User))
    }));
    env.add_primitive(fn_one("definedp", |name: Value, env| {
        kind(env, &name).map(|k| k == Some(ProcKind::User))
    }));
    env.add_primitive(fn_one("namep", |name: Value, env| {
        name_of(&name).map(|n| env.is_bound(&n))
    }));
    env.add_primitive(fn_two(
        "copydef",
        |new: Value, old: Value, env| -> Result<(), Error> {
            env.copy_def(&name_of(&new)?, &name_of(&old)?)
        },
    ));
    env.add_primitive(fn_one("text", |name: Value, env| -> Result<Value, Error> {
        Ok(Value::text(env.proc_text(&name_of(&name)?)?))
    }));

    env.add_primitive(fn_three(
        "pprop",
        |owner: Value, prop: Value, v: Value, env| -> Result<(), Error> {
            env.plists.put(&name_of(&owner)?, &name_of(&prop)?, v);
            Ok(())
        },
    ));
    env.add_primitive(fn_two(
        "gprop",
        |owner: Value, prop: Value, env| -> Result<Value, Error> {
            Ok(env.plists.get(&name_of(&owner)?, &name_of(&prop)?))
        },
    ));
    env.add_primitive(fn_two(
        "remprop",
        |owner: Value, prop: Value, env| -> Result<(), Error> {
            env.plists.remove(&name_of(&owner)?, &name_of(&prop)?);
            Ok(())
        },
    ));
    env.add_primitive(fn_one("plist", |owner: Value, env| {
        name_of(&owner).map(|o| env.plists.list(&o))
    }));
    env.add_primitive(fn_one("plistp", |owner: Value, env| {
        name_of(&owner).map(|o| env.plists.contains(&o))
    }));

    env.add_primitive(fn_zero("contents", |env| Contents::current(env).into_value()));
    env.add_primitive(fn_zero("procedures", |env| word_list(env.user_procs())));
    env.add_primitive(fn_zero("globals", |env| word_list(env.global_names())));
    env.add_primitive(fn_zero("names", |env| names_section(env.global_names())));
    env.add_primitive(fn_zero("plists", |env| plists_section(env.plists.names())));
    env.add_primitive(fn_one("namelist", |v: Value, _env| {
        names_of(&v).map(names_section)
    }));
    env.add_primitive(fn_one("pllist", |v: Value, _env| {
        names_of(&v).map(plists_section)
    }));

    env.add_primitive(fn_one("erase", |v: Value, env| -> Result<(), Error> {
        Contents::parse(&v)?.erase(env)
    }));
    env.add_primitive(fn_zero("erall", |env| Contents::current(env).erase(env)));
    env.add_primitive(fn_zero("erps", |env| {
        Contents {
            procs: env.user_procs(),
            ..Contents::default()
        }
        .erase(env)
    }));
    env.add_primitive(fn_zero("erns", |env| {
        Contents {
            names: env.global_names(),
            ..Contents::default()
        }
        .erase(env)
    }));
    env.add_primitive(fn_zero("erpls", |env| {
        Contents {
            plists: env.plists.names(),
            ..Contents::default()
        }
        .erase(env)
    }));
    env.add_primitive(fn_one("ern", |v: Value, env| -> Result<(), Error> {
        for name in names_of(&v)? {
            env.erase_global(&name);
        }
        Ok(())
    }));
    env.add_primitive(fn_one("erpl", |v: Value, env| -> Result<(), Error> {
        for name in names_of(&v)? {
            env.plists.erase(&name);
        }
        Ok(())
    }));

    env.add_primitive(fn_one("bury", |v: Value, env| -> Result<(), Error> {
        Contents::parse(&v)?.bury(env, true);
        Ok(())
    }));
    env.add_primitive(fn_zero("buryall", |env| Contents::current(env).bury(env, true)));
    env.add_primitive(fn_one("unbury", |v: Value, env| -> Result<(), Error> {
        Contents::parse(&v)?.bury(env, false);
        Ok(())
    }));
    env.add_primitive(fn_zero("unburyall", |env| env.unbury_all()));
    env.add_primitive(fn_one("buriedp", |v: Value, env| -> Result<bool, Error> {
        let c = Contents::parse(&v)?;
        Ok(if let Some(p) = c.procs.first() {
            env.proc_buried(p)
        } else if let Some(n) = c.names.first() {
            env.global_buried(n)
        } else if let Some(p) = c.plists.first() {
            env.plists.is_buried(p)
        } else {
            false
        })
    }));
}

#[cfg(test)]
mod tests {
    use crate::{Env, Error, Value};

    fn show(env: &mut Env, s: &str) -> String {
        env.eval_str(s).unwrap().map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn variables() {
        let mut env = Env::default();
        env.eval_str("przypisz \"X 1 nazwij 2 \"y").unwrap();
        assert_eq!(show(&mut env, ":x + niech \"Y"), "3");
        assert_eq!(show(&mut env, "zmiennap \"x"), "1");
        assert_eq!(show(&mut env, "zmiennap \"z"), "0");
        assert_eq!(
            env.eval_str("niech \"z"),
            Err(Error::UnknownVar("Z".into()))
        );
        env.eval_str("globalna \"z").unwrap();
        assert_eq!(show(&mut env, "zmiennap \"z"), "0");
        assert_eq!(show(&mut env, "globalne"), "[x y z]");
    }

    #[test]
    fn procedures() {
        let mut env = Env::default();
        env.eval_str("oto kw :x\nwynik :x * :x\njuż").unwrap();
        assert_eq!(show(&mut env, "kw 5"), "25");
        assert_eq!(show(&mut env, "określonep \"kw"), "1");
        assert_eq!(show(&mut env, "pierwotnep \"kw"), "0");
        assert_eq!(show(&mut env, "pierwotnep \"pisz"), "1");
        assert_eq!(show(&mut env, "procedurap \"nic"), "0");
        env.eval_str("kopiujdef \"kwadrat \"kw").unwrap();
        assert_eq!(show(&mut env, "kwadrat 3"), "9");
        assert_eq!(show(&mut env, "procedury"), "[kw kwadrat]");
        assert_eq!(show(&mut env, "proc \"kw"), "oto kw :x\n  wynik :x * :x\njuż");
        assert_eq!(
            env.eval_str("proc \"pisz"),
            Err(Error::CantShow("PISZ".into()))
        );
        assert_eq!(env.eval_str("już"), Err(Error::Unexpected("JUŻ".into())));
    }

    #[test]
    fn maybe_output() {
        let mut env = Env::default();
        env.eval_str("oto f :x\n.możewynik zapuść :x\njuż").unwrap();
        assert_eq!(show(&mut env, "f [1 + 2]"), "3");
        assert_eq!(env.eval_str("f []"), Ok(None));
    }

    #[test]
    fn property_lists() {
        let mut env = Env::default();
        env.eval_str("przywłaść \"kot \"imię \"Filemon przywłaść \"kot \"wiek 3").unwrap();
        assert_eq!(show(&mut env, "lwł \"KOT \"imię"), "Filemon");
        assert_eq!(show(&mut env, "lwł \"kot \"kolor"), "[]");
        assert_eq!(show(&mut env, "właściwość \"kot"), "[imię Filemon wiek 3]");
        env.eval_str("uswłaś \"kot \"imię").unwrap();
        assert_eq!(show(&mut env, "właściwość \"kot"), "[wiek 3]");
        assert_eq!(show(&mut env, "właściwości"), "[[] [] [kot]]");
        env.eval_str("uswłaś \"kot \"wiek").unwrap();
        assert_eq!(show(&mut env, "włp \"kot"), "0");
    }

    #[test]
    fn erasing() {
        let mut env = Env::default();
        env.eval_str("oto p\njuż\noto q\njuż\nprzypisz \"a 1 przywłaść \"l \"p 1").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[p q] [a] [l]]");
        env.eval_str("wymaż \"p").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[q] [a] [l]]");
        env.eval_str("wymaż [[] [a] []]").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[q] [] [l]]");
        env.eval_str("usw").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[] [] []]");
        assert_eq!(
            env.eval_str("wymaż \"pisz"),
            Err(Error::ErasePrimitive("PRZEDEFP".into()))
        );
        assert_eq!(
            env.eval_str("wymaż \"oto"),
            Err(Error::EraseSpecial("OTO".into()))
        );
    }

    #[test]
    fn burying() {
        let mut env = Env::default();
        env.eval_str("oto p\njuż\nprzypisz \"a 1 przypisz \"b 2").unwrap();
        env.eval_str("pochowaj [[p] [a]]").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[] [b] []]");
        assert_eq!(show(&mut env, "pochowanyp [[] [a]]"), "1");
        assert_eq!(show(&mut env, "pochowanyp \"p"), "1");
        env.eval_str("usw").unwrap();
        assert_eq!(show(&mut env, ":a"), "1");
        env.eval_str("odgrzebwszystko").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[p] [a] []]");
        env.eval_str("pochowajwszystko").unwrap();
        assert_eq!(show(&mut env, "zawartości"), "[[] [] []]");
        env.eval_str("odgrzeb [[] [a]]").unwrap();
        assert_eq!(show(&mut env, "nazwy"), "[[] [a]]");
        assert_eq!(show(&mut env, "listanazw [x y]"), "[[] [x y]]");
        assert_eq!(show(&mut env, "listawł \"x"), "[[] [] [x]]");
    }

    #[test]
    fn locals() {
        let mut env = Env::default();
        env.eval_str("oto f\nlokalna [a b]\nprzypisz \"a 1\ntwórzlokalną \"c 2\nwynik :a + :c\njuż")
            .unwrap();
        assert_eq!(show(&mut env, "f"), "3");
        assert_eq!(show(&mut env, "zmiennap \"a"), "0");
        assert_eq!(show(&mut env, "zmiennap \"c"), "0");
        assert_eq!(env.eval_str("zmiennap \"a"), Ok(Some(Value::num(0.0))));
    }
}
