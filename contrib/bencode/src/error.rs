use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected a digit at byte offset {0}")]
    ExpectedDigit(usize),
    #[error("invalid integer at byte offset {0}")]
    InvalidInteger(usize),
    #[error("invalid length prefix at byte offset {0}")]
    InvalidLength(usize),
    #[error("unrecognized value tag {0:#x} at byte offset {1}")]
    UnknownTag(u8, usize),
    #[error("{0} trailing byte(s) after the top-level value")]
    TrailingData(usize),
}
