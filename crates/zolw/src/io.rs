use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{BufRead, Write},
    rc::Rc,
};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Where text goes to and comes from.
pub trait Stream {
    /// Appends text to the output, exactly as given.
    fn write(&mut self, text: &str);

    /// Reads a line of input, without its line terminator. `None` means the input is exhausted.
    fn read(&mut self, prompt: Option<&str>) -> Option<String>;

    fn clear(&mut self) {}
}

/// The process's own stdin and stdout.
#[derive(Debug, Default)]
pub struct StdStream;

impl Stream for StdStream {
    fn write(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        // There's nowhere to report a broken stdout.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn read(&mut self, prompt: Option<&str>) -> Option<String> {
        if let Some(prompt) = prompt {
            self.write(prompt);
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_owned()),
        }
    }

    fn clear(&mut self) {
        // ANSI clear screen, then home the cursor.
        self.write("\x1b[2J\x1b[H");
    }
}

/// An in-memory stream: input is queued up ahead of time and output is collected.
#[derive(Debug, Default)]
pub struct BufferStream {
    pub input: VecDeque<String>,
    pub output: String,
    pub last_prompt: Option<String>,
}

impl BufferStream {
    pub fn with_input<I: IntoIterator<Item = S>, S: Into<String>>(lines: I) -> Self {
        BufferStream {
            input: lines.into_iter().map(Into::into).collect(),
            ..BufferStream::default()
        }
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Stream for BufferStream {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read(&mut self, prompt: Option<&str>) -> Option<String> {
        self.last_prompt = prompt.map(str::to_owned);
        self.input.pop_front()
    }

    fn clear(&mut self) {
        self.output.clear();
        self.last_prompt = None;
    }
}

impl<S: Stream> Stream for Rc<RefCell<S>> {
    fn write(&mut self, text: &str) {
        self.borrow_mut().write(text)
    }

    fn read(&mut self, prompt: Option<&str>) -> Option<String> {
        self.borrow_mut().read(prompt)
    }

    fn clear(&mut self) {
        self.borrow_mut().clear()
    }
}

/// A source of random numbers.
pub trait Random {
    /// A number in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    fn reseed(&mut self, seed: u64);
}

// What RERANDOM uses when it isn't given a seed.
pub const DEFAULT_SEED: u64 = 0x5EED;

#[derive(Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        StdRandom { rng }
    }
}

impl Random for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: Random> Random for Rc<RefCell<R>> {
    fn next_f64(&mut self) -> f64 {
        self.borrow_mut().next_f64()
    }

    fn reseed(&mut self, seed: u64) {
        self.borrow_mut().reseed(seed)
    }
}
