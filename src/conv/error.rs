use crate::parse::{error::ParseError, Parser};

/// Error returned by the top-level decoding entry points
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// The value itself could not be parsed
    Parse(ParseError),
    /// The value parsed, but this many bytes were left over
    NonEmpty(usize),
}

impl From<std::convert::Infallible> for DecodeError {
    fn from(_void: std::convert::Infallible) -> Self {
        match _void {}
    }
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Parse(err) => {
                write!(f, "parser encountered error: {}", err)
            }
            DecodeError::NonEmpty(residual) => {
                write!(f, "parser had {} unconsumed bytes after decoding", residual)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Parse(err) => Some(err),
            DecodeError::NonEmpty(_) => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Disposes of a parser once a top-level value has been read from it.
pub(crate) fn finish<P: Parser>(p: P) -> DecodeResult<()> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "check_complete_parse")] {
            match p.cleanup() {
                0 => Ok(()),
                residual => Err(DecodeError::NonEmpty(residual)),
            }
        } else {
            let _ = p;
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    fn dummy<T: Send + Sync>() {}

    #[test]
    fn decode_error_threadsafe() {
        dummy::<super::DecodeError>()
    }
}
