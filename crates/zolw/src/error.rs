use crate::typ::Value;

/// Coarse classification of an [`Error`], for embedders that want to react to the kind of
/// failure without matching on message text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Syntax,
    Name,
    Output,
    Type,
    Range,
    Domain,
    Redefinition,
}

// Names in messages are always upper case; callers do the conversion so that the variants
// can hold whatever the user actually typed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("cannot parse: '{0}'")]
    CannotParse(String),
    #[error("expected '{0}'")]
    ExpectedClose(char),
    #[error("unexpected '{0}'")]
    Unexpected(String),
    #[error("unexpected end of instruction")]
    UnexpectedEnd,
    #[error("expected ')'")]
    ExpectedParen,
    #[error("expected ')', saw {0}")]
    ExpectedParenSaw(String),
    #[error("expected identifier")]
    ExpectedIdent,
    #[error("expected {0}")]
    ExpectedEnd(String),
    #[error("don't know how to: {0}")]
    UnknownCall(String),

    #[error("don't know about variable {0}")]
    UnknownVar(String),
    #[error("don't know about: {0}")]
    UnknownProc(String),
    #[error("don't know anything about: {0}")]
    UnknownTemplate(String),
    #[error("can't apply {prim} to special form {name}")]
    ApplySpecial { prim: String, name: String },

    #[error("don't know what to do with: {0}")]
    UnusedValue(String),
    #[error("no output from procedure")]
    NoOutput,
    #[error("can only use {0} inside a procedure")]
    OutsideProcedure(String),
    #[error("can only use {0} inside a loop")]
    OutsideLoop(String),

    #[error("not enough inputs to {0}")]
    NotEnoughInputs(String),
    #[error("too many inputs to {0}")]
    TooManyInputs(String),
    #[error("expected number")]
    ExpectedNumber,
    #[error("expected integer")]
    ExpectedInteger,
    #[error("expected string")]
    ExpectedString,
    #[error("expected list")]
    ExpectedList,
    #[error("expected array")]
    ExpectedArray,
    #[error("expected list of length 2")]
    ExpectedPair,
    #[error("expected block")]
    ExpectedBlock,

    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("division by zero")]
    DivisionByZero,

    #[error("can't redefine {0}")]
    CantRedefine(String),
    #[error("can't overwrite special form {0}")]
    OverwriteSpecial(String),
    #[error("can't overwrite primitive unless {0} is TRUE")]
    OverwritePrimitive(String),
    #[error("can't erase special form {0}")]
    EraseSpecial(String),
    #[error("can't erase primitive unless {0} is TRUE")]
    ErasePrimitive(String),
    #[error("can't show definition: {0}")]
    CantShow(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            CannotParse(_) | ExpectedClose(_) | Unexpected(_) | UnexpectedEnd | ExpectedParen
            | ExpectedParenSaw(_) | ExpectedIdent | ExpectedEnd(_) | UnknownCall(_) => {
                ErrorKind::Syntax
            }
            UnknownVar(_) | UnknownProc(_) | UnknownTemplate(_) => ErrorKind::Name,
            UnusedValue(_) | NoOutput | OutsideProcedure(_) | OutsideLoop(_) => ErrorKind::Output,
            ApplySpecial { .. } | NotEnoughInputs(_) | TooManyInputs(_) | ExpectedNumber
            | ExpectedInteger | ExpectedString | ExpectedList | ExpectedArray | ExpectedPair
            | ExpectedBlock => ErrorKind::Type,
            IndexOutOfBounds => ErrorKind::Range,
            DivisionByZero => ErrorKind::Domain,
            CantRedefine(_) | OverwriteSpecial(_) | OverwritePrimitive(_) | EraseSpecial(_)
            | ErasePrimitive(_) | CantShow(_) => ErrorKind::Redefinition,
        }
    }

    pub(crate) fn unused(val: &Value) -> Error {
        Error::UnusedValue(val.to_string())
    }
}

/// The ways evaluation can leave a statement early.
///
/// Only `Error` is a failure; the rest are the control transfers of `OUTPUT`, `STOP` and
/// `BREAK`, caught by the nearest procedure call or loop.
#[derive(Clone, Debug, PartialEq)]
pub enum Interrupt {
    Error(Error),
    Output(Value),
    Stop,
    Break,
}

impl From<Error> for Interrupt {
    fn from(e: Error) -> Self {
        Interrupt::Error(e)
    }
}

pub type EvalResult = Result<Option<Value>, Interrupt>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Error::ExpectedClose(']').to_string(), "expected ']'");
        assert_eq!(
            Error::ApplySpecial {
                prim: "MAP".into(),
                name: "OTO".into()
            }
            .to_string(),
            "can't apply MAP to special form OTO"
        );
        assert_eq!(
            Error::OverwritePrimitive("PRZEDEFP".into()).to_string(),
            "can't overwrite primitive unless PRZEDEFP is TRUE"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::DivisionByZero.kind(), ErrorKind::Domain);
        assert_eq!(Error::UnknownTemplate("X".into()).kind(), ErrorKind::Name);
        assert_ne!(
            Error::ApplySpecial {
                prim: "MAP".into(),
                name: "X".into()
            }
            .kind(),
            ErrorKind::Name
        );
        assert_eq!(Error::EraseSpecial("X".into()).kind(), ErrorKind::Redefinition);
        assert_eq!(Error::IndexOutOfBounds.kind(), ErrorKind::Range);
    }
}
