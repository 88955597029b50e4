use crate::error::{RedwireError, RedwireResult};
use crate::reply::Reply;
use std::borrow::Cow;

/// A command argument.
///
/// Redis commands accept exactly these four kinds of value. The set is
/// closed on purpose: adding a fifth kind forces every `match` on `Arg`
/// to be revisited instead of failing at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Raw bytes, passed through to the wire unchanged.
    Bytes(Vec<u8>),
    /// Text, encoded as UTF-8.
    Text(String),
    /// Encoded as its decimal text form.
    Int(i64),
    /// Encoded as its shortest decimal text form.
    Float(f64),
}

impl Arg {
    /// Canonical binary encoding of this argument.
    pub fn encode(&self) -> Vec<u8> {
        self.encoded().into_owned()
    }

    /// Encoding that borrows where the bytes already exist.
    pub(crate) fn encoded(&self) -> Cow<'_, [u8]> {
        match self {
            Arg::Bytes(b) => Cow::Borrowed(b),
            Arg::Text(s) => Cow::Borrowed(s.as_bytes()),
            Arg::Int(n) => Cow::Owned(n.to_string().into_bytes()),
            Arg::Float(f) => Cow::Owned(f.to_string().into_bytes()),
        }
    }
}

impl From<Vec<u8>> for Arg {
    fn from(b: Vec<u8>) -> Self {
        Arg::Bytes(b)
    }
}

impl From<&[u8]> for Arg {
    fn from(b: &[u8]) -> Self {
        Arg::Bytes(b.to_vec())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<f64> for Arg {
    fn from(f: f64) -> Self {
        Arg::Float(f)
    }
}

/// Replies echoed back as arguments (SCAN cursors, keys from a previous
/// reply) are only encodable when they are scalar.
impl TryFrom<&Reply> for Arg {
    type Error = RedwireError;

    fn try_from(reply: &Reply) -> RedwireResult<Arg> {
        match reply {
            Reply::Bytes(b) => Ok(Arg::Bytes(b.clone())),
            Reply::Text(s) => Ok(Arg::Text(s.clone())),
            Reply::Int(n) => Ok(Arg::Int(*n)),
            other => Err(RedwireError::UnsupportedArgument(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_bytes_passthrough() {
        assert_eq!(Arg::Bytes(vec![0, 159, 146]).encode(), vec![0, 159, 146]);
    }

    #[test]
    fn test_encode_text_utf8() {
        assert_eq!(Arg::from("héllo").encode(), "héllo".as_bytes());
    }

    #[test]
    fn test_encode_int_decimal() {
        assert_eq!(Arg::from(42i64).encode(), b"42");
        assert_eq!(Arg::from(-7i64).encode(), b"-7");
    }

    #[test]
    fn test_encode_float_decimal() {
        assert_eq!(Arg::from(3.14).encode(), b"3.14");
        assert_eq!(Arg::from(-0.5).encode(), b"-0.5");
    }

    #[test]
    fn test_reply_scalar_converts() {
        let arg = Arg::try_from(&Reply::Bytes(b"5".to_vec())).unwrap();
        assert_eq!(arg, Arg::Bytes(b"5".to_vec()));
        let arg = Arg::try_from(&Reply::Int(5)).unwrap();
        assert_eq!(arg, Arg::Int(5));
    }

    #[test]
    fn test_reply_array_is_unsupported() {
        let reply = Reply::Array(vec![Reply::Int(1)]);
        let err = Arg::try_from(&reply).unwrap_err();
        assert!(matches!(err, RedwireError::UnsupportedArgument(_)));
    }

    #[test]
    fn test_reply_nil_is_unsupported() {
        let err = Arg::try_from(&Reply::Nil).unwrap_err();
        assert!(matches!(err, RedwireError::UnsupportedArgument(_)));
    }
}
