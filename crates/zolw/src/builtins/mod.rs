//! The primitive procedures.
//!
//! Each submodule registers its primitives by their internal English names; the environment
//! takes care of registering them under the current locale's aliases.

use log::debug;

use crate::{env::Env, typ::Value, Error};

mod control;
mod data;
mod graphics;
mod io;
mod logic;
mod math;
mod template;
mod workspace;

pub fn install(env: &mut Env) {
    debug!("installing primitives for {:?}", env.locale());
    data::install(env);
    io::install(env);
    math::install(env);
    logic::install(env);
    graphics::install(env);
    workspace::install(env);
    control::install(env);
    template::install(env);
}

/// A variable or procedure name, as stored.
fn name_of(v: &Value) -> Result<String, Error> {
    v.as_word()
        .map(|w| w.to_lowercase())
        .ok_or(Error::ExpectedString)
}

/// A single name, or a list of them.
fn names_of(v: &Value) -> Result<Vec<String>, Error> {
    match v {
        Value::List(items) => items.iter().map(name_of).collect(),
        _ => Ok(vec![name_of(v)?]),
    }
}

/// The value of a variable that has to exist.
fn var(env: &Env, name: &str) -> Result<Value, Error> {
    env.lookup(name)
        .ok_or_else(|| Error::UnknownVar(name.to_uppercase()))
}

fn word_list(words: Vec<String>) -> Value {
    Value::list(words.into_iter().map(Value::text).collect())
}
