//! An interpreter for a LOGO dialect whose primitives answer to Polish (or English) names,
//! driving a turtle that lives on a bounded field.
//!
//! ```
//! use zolw::{Env, Value};
//!
//! let mut env = Env::default();
//! env.eval_str("oto kw :x wynik :x * :x już").unwrap();
//! assert_eq!(env.eval_str("kw 7"), Ok(Some(Value::num(49.0))));
//! ```

mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod io;
pub mod keywords;
pub mod lex;
pub mod parse;
pub mod plist;
pub mod proc;
pub mod turtle;
pub mod typ;

pub use config::Config;
pub use env::Env;
pub use error::{Error, ErrorKind, EvalResult, Interrupt};
pub use eval::{Block, Mode, RunOptions};
pub use io::{BufferStream, Random, StdRandom, StdStream, Stream};
pub use keywords::Locale;
pub use turtle::{Canvas, DrawOp, NullCanvas, Pen, PenMode, Recorder, Turtle, TurtleMode};
pub use typ::Value;
