use crate::{
    env::Env,
    lex::read_list,
    proc::{fn_many, fn_zero, Arity},
    typ::Value,
    Error,
};

fn joined(args: &[Value], sep: &str, f: impl Fn(&Value) -> String) -> String {
    args.iter().map(f).collect::<Vec<_>>().join(sep)
}

fn prompt(args: &[Value]) -> Option<String> {
    args.first().map(Value::print_form)
}

pub(super) fn install(env: &mut Env) {
    env.add_primitive(fn_many("print", Arity::variadic(0, 1), |args, env| {
        let mut line = joined(&args, " ", Value::print_form);
        line.push('\n');
        env.write(&line);
    }));
    env.add_primitive(fn_many("type", Arity::variadic(0, 1), |args, env| {
        env.write(&joined(&args, "", Value::print_form));
    }));
    env.add_primitive(fn_many("show", Arity::variadic(0, 1), |args, env| {
        let mut line = joined(&args, " ", Value::to_string);
        line.push('\n');
        env.write(&line);
    }));
    env.add_primitive(fn_many("readword", Arity::variadic(0, 0), |args, env| {
        match env.read(prompt(&args).as_deref()) {
            Some(line) => Value::text(line),
            None => Value::empty_list(),
        }
    }));
    env.add_primitive(fn_many(
        "readlist",
        Arity::variadic(0, 0),
        |args, env| -> Result<Value, Error> {
            match env.read(prompt(&args).as_deref()) {
                Some(line) => Ok(Value::list(read_list(&line)?)),
                None => Ok(Value::empty_list()),
            }
        },
    ));
    env.add_primitive(fn_zero("cleartext", |env| env.clear_text()));
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::{io::BufferStream, Env, Value};

    fn env_with(input: &[&str]) -> (Env, Rc<RefCell<BufferStream>>) {
        let stream = Rc::new(RefCell::new(BufferStream::with_input(input.iter().copied())));
        (Env::default().with_stream(stream.clone()), stream)
    }

    #[test]
    fn printing() {
        let (mut env, stream) = env_with(&[]);
        env.eval_str("(pisz \"a 1 [2 [3]])  (wpisz \"a 1 [2 [3]])  (pokaż \"a 1 [2 [3]])")
            .unwrap();
        assert_eq!(
            stream.borrow_mut().take_output(),
            "a 1 2 [3]\na12 [3]a 1 [2 [3]]\n"
        );
        env.eval_str("pisz \"a zt").unwrap();
        assert_eq!(stream.borrow_mut().take_output(), "");
    }

    #[test]
    fn reading() {
        let (mut env, stream) = env_with(&["a b c 1 2 3", "x [y z]"]);
        assert_eq!(
            env.eval_str("(czytajsłowo [a b c])").unwrap(),
            Some(Value::text("a b c 1 2 3"))
        );
        assert_eq!(stream.borrow().last_prompt.as_deref(), Some("a b c"));
        assert_eq!(
            env.eval_str("czytajlistę").unwrap().unwrap().to_string(),
            "[x [y z]]"
        );
        assert_eq!(stream.borrow().last_prompt, None);
        assert_eq!(env.eval_str("czytajsłowo").unwrap(), Some(Value::empty_list()));
    }
}
