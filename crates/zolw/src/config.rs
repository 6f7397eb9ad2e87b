use crate::{keywords::Locale, turtle::TurtleMode};

/// Settings that an interpreter starts out with, and returns to on `reset`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub locale: Locale,
    /// Half the width of the turtle's field; x runs from `-half_width` to `half_width`.
    pub half_width: f64,
    pub half_height: f64,
    pub turtle_mode: TurtleMode,
    /// Seed for the random number generator. Without one, the generator is seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            locale: Locale::Polish,
            half_width: 150.0,
            half_height: 150.0,
            turtle_mode: TurtleMode::Wrap,
            seed: None,
        }
    }
}

impl Config {
    pub fn english() -> Config {
        Config {
            locale: Locale::English,
            ..Config::default()
        }
    }
}
