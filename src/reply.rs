use crate::error::{RedwireError, RedwireResult};

/// A decoded server reply, before any text materialization.
///
/// The transport's RESP parser produces these; bulk strings arrive as
/// [`Reply::Bytes`], simple strings as [`Reply::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Bulk-string payload as raw bytes.
    Bytes(Vec<u8>),
    /// Simple-string payload, or bytes already materialized as text.
    Text(String),
    Int(i64),
    /// Null bulk string or null array.
    Nil,
    Array(Vec<Reply>),
}

/// How [`Reply::decode_text`] materializes bulk payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Strict UTF-8; invalid bytes fail with [`RedwireError::InvalidText`].
    Utf8,
    /// UTF-8 with U+FFFD replacement for invalid sequences.
    Utf8Lossy,
}

impl Reply {
    pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
        Reply::Bytes(data.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    pub fn int(n: i64) -> Self {
        Reply::Int(n)
    }

    pub fn array(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }

    /// Recursively materialize every bulk payload as text.
    ///
    /// Arrays are decoded element-wise, preserving order and length, at any
    /// nesting depth. Non-bulk leaves pass through unchanged.
    pub fn decode_text(self, encoding: TextEncoding) -> RedwireResult<Reply> {
        match self {
            Reply::Bytes(b) => Ok(Reply::Text(match encoding {
                TextEncoding::Utf8 => String::from_utf8(b)?,
                TextEncoding::Utf8Lossy => String::from_utf8_lossy(&b).into_owned(),
            })),
            Reply::Array(items) => items
                .into_iter()
                .map(|item| item.decode_text(encoding))
                .collect::<RedwireResult<Vec<_>>>()
                .map(Reply::Array),
            other => Ok(other),
        }
    }

    /// True iff this reply is the literal `OK` acknowledgment, in either
    /// byte or text form.
    pub fn is_ok_token(&self) -> bool {
        match self {
            Reply::Bytes(b) => b == b"OK",
            Reply::Text(s) => s == "OK",
            _ => false,
        }
    }

    /// True iff this reply is the literal `QUEUED` sentinel a server sends
    /// for commands issued inside MULTI, in either byte or text form.
    pub fn is_queued_token(&self) -> bool {
        match self {
            Reply::Bytes(b) => b == b"QUEUED",
            Reply::Text(s) => s == "QUEUED",
            _ => false,
        }
    }
}

/// The outcome of a command that may have been queued inside a transaction.
///
/// Commands sent between MULTI and EXEC are acknowledged with the `QUEUED`
/// sentinel instead of a real reply. Tagging that case once, at the
/// transport boundary, lets every adapter pattern-match instead of
/// re-comparing magic tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TxReply<T = Reply> {
    /// The command was queued behind MULTI rather than executed.
    Queued,
    Value(T),
}

impl TxReply {
    /// Tag a raw reply at the transport boundary.
    pub fn from_reply(reply: Reply) -> TxReply {
        if reply.is_queued_token() {
            TxReply::Queued
        } else {
            TxReply::Value(reply)
        }
    }
}

impl<T> TxReply<T> {
    pub fn is_queued(&self) -> bool {
        matches!(self, TxReply::Queued)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            TxReply::Queued => None,
            TxReply::Value(v) => Some(v),
        }
    }
}

/// Regroup a flat sequence into consecutive (key, value) pairs.
///
/// Elements 0 and 1 form the first pair, 2 and 3 the next, and so on.
/// An odd-length sequence has no defined pairing and is a malformed reply.
pub fn pair_up(items: Vec<Reply>) -> RedwireResult<Vec<(Reply, Reply)>> {
    if items.len() % 2 != 0 {
        return Err(RedwireError::MalformedReply(format!(
            "cannot pair an odd-length sequence of {} elements",
            items.len()
        )));
    }
    let mut pairs = Vec::with_capacity(items.len() / 2);
    let mut it = items.into_iter();
    while let (Some(key), Some(value)) = (it.next(), it.next()) {
        pairs.push((key, value));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bulk_to_text() {
        let reply = Reply::bulk("hello");
        assert_eq!(
            reply.decode_text(TextEncoding::Utf8).unwrap(),
            Reply::text("hello")
        );
    }

    #[test]
    fn test_decode_nested_arrays() {
        let reply = Reply::array(vec![
            Reply::bulk("a"),
            Reply::array(vec![Reply::bulk("b"), Reply::Int(1)]),
            Reply::Nil,
        ]);
        assert_eq!(
            reply.decode_text(TextEncoding::Utf8).unwrap(),
            Reply::array(vec![
                Reply::text("a"),
                Reply::array(vec![Reply::text("b"), Reply::Int(1)]),
                Reply::Nil,
            ])
        );
    }

    #[test]
    fn test_decode_leaves_pass_through() {
        assert_eq!(
            Reply::Int(7).decode_text(TextEncoding::Utf8).unwrap(),
            Reply::Int(7)
        );
        assert_eq!(
            Reply::Nil.decode_text(TextEncoding::Utf8).unwrap(),
            Reply::Nil
        );
    }

    #[test]
    fn test_decode_invalid_utf8_strict_fails() {
        let reply = Reply::Bytes(vec![0xff, 0xfe]);
        let err = reply.decode_text(TextEncoding::Utf8).unwrap_err();
        assert!(matches!(err, RedwireError::InvalidText(_)));
    }

    #[test]
    fn test_decode_invalid_utf8_lossy_replaces() {
        let reply = Reply::Bytes(vec![0xff]);
        assert_eq!(
            reply.decode_text(TextEncoding::Utf8Lossy).unwrap(),
            Reply::text("\u{fffd}")
        );
    }

    #[test]
    fn test_sentinel_tokens_both_forms() {
        assert!(Reply::bulk("OK").is_ok_token());
        assert!(Reply::text("OK").is_ok_token());
        assert!(!Reply::bulk("PONG").is_ok_token());
        assert!(Reply::bulk("QUEUED").is_queued_token());
        assert!(Reply::text("QUEUED").is_queued_token());
        assert!(!Reply::Int(1).is_queued_token());
    }

    #[test]
    fn test_tx_reply_tagging() {
        assert_eq!(TxReply::from_reply(Reply::bulk("QUEUED")), TxReply::Queued);
        assert_eq!(
            TxReply::from_reply(Reply::bulk("OK")),
            TxReply::Value(Reply::bulk("OK"))
        );
    }

    #[test]
    fn test_pair_up_even() {
        let pairs = pair_up(vec![
            Reply::bulk("a"),
            Reply::Int(1),
            Reply::bulk("b"),
            Reply::Int(2),
        ])
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                (Reply::bulk("a"), Reply::Int(1)),
                (Reply::bulk("b"), Reply::Int(2)),
            ]
        );
    }

    #[test]
    fn test_pair_up_empty() {
        assert_eq!(pair_up(vec![]).unwrap(), vec![]);
    }

    #[test]
    fn test_pair_up_odd_is_malformed() {
        let err = pair_up(vec![Reply::Int(1)]).unwrap_err();
        assert!(matches!(err, RedwireError::MalformedReply(_)));
    }
}
