use std::{cell::RefCell, path::Path, rc::Rc};

use zolw::{BufferStream, Env, Error, Value};

#[derive(Default, Clone)]
pub struct TestCase {
    input: String,
    expected: String,
}

fn env() -> (Env, Rc<RefCell<BufferStream>>) {
    let stream = Rc::new(RefCell::new(BufferStream::default()));
    (Env::default().with_stream(stream.clone()), stream)
}

fn exec_one(s: &str) -> Result<Option<Value>, Error> {
    env().0.eval_str(s)
}

impl TestCase {
    /// The expected text is the shown form of the value the input ends with.
    fn exec(&self) {
        let val = exec_one(&self.input).unwrap_or_else(|e| panic!("{}: {e}", self.input.trim()));
        let shown = val.map(|v| v.to_string()).unwrap_or_default();
        assert_eq!(shown, self.expected.trim(), "{}", self.input.trim());
    }

    /// The expected text is everything the input prints.
    fn exec_output(&self) {
        let (mut env, stream) = env();
        if let Err(e) = env.eval_str(&self.input) {
            panic!("{}: {e}", self.input.trim());
        }
        let output = stream.borrow_mut().take_output();
        assert_eq!(output, self.expected, "{}", self.input.trim());
    }

    /// The expected text is the message of the error the input stops with.
    fn exec_failure(&self) {
        let err = exec_one(&self.input).unwrap_err();
        assert_eq!(err.to_string(), self.expected.trim(), "{}", self.input.trim());
    }
}

pub fn read_tests(path: impl AsRef<Path>) -> Vec<TestCase> {
    let text = std::fs::read_to_string(path).unwrap();
    let mut ret = Vec::new();
    let mut in_input = true;
    let mut cur = TestCase::default();

    fn separator_line(line: &str, ch: u8) -> bool {
        line.trim().len() >= 2 && line.trim().bytes().all(|c| c == ch)
    }

    for line in text.split_inclusive('\n') {
        if in_input {
            if separator_line(line, b'-') {
                in_input = false;
            } else {
                cur.input += line;
            }
        } else if separator_line(line, b'=') {
            in_input = true;
            ret.push(std::mem::take(&mut cur));
        } else {
            cur.expected += line;
        }
    }
    ret
}

#[test]
fn text_tests() {
    let tests = read_tests("tests/basic.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec();
    }
}

#[test]
fn output_tests() {
    let tests = read_tests("tests/output.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec_output();
    }
}

#[test]
fn failure_tests() {
    let tests = read_tests("tests/exec-failures.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec_failure();
    }
}
