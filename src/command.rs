use crate::arg::Arg;
use crate::error::RedwireResult;
use crate::reply::Reply;
use bytes::{BufMut, BytesMut};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Decimal renderings of small lengths repeat heavily across commands, so
/// they are memoized in a bounded cache shared by all serialization calls.
const LEN_CACHE_CAPACITY: usize = 1024;

static LEN_CACHE: Lazy<Mutex<LenCache>> =
    Lazy::new(|| Mutex::new(LenCache::new(LEN_CACHE_CAPACITY)));

/// Bounded map from integer to its decimal byte rendering, with
/// least-recently-used eviction driven by a monotonic tick.
struct LenCache {
    capacity: usize,
    entries: HashMap<usize, (Vec<u8>, u64)>,
    tick: u64,
}

impl LenCache {
    fn new(capacity: usize) -> Self {
        LenCache {
            capacity,
            entries: HashMap::with_capacity(capacity),
            tick: 0,
        }
    }

    /// Append the decimal rendering of `n` to `out`.
    fn render(&mut self, n: usize, out: &mut BytesMut) {
        self.tick += 1;
        let tick = self.tick;
        if let Some((bytes, last_used)) = self.entries.get_mut(&n) {
            *last_used = tick;
            out.put_slice(bytes);
            return;
        }
        let bytes = n.to_string().into_bytes();
        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        out.put_slice(&bytes);
        self.entries.insert(n, (bytes, tick));
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|(_, (_, last_used))| *last_used)
            .map(|(n, _)| *n)
        {
            self.entries.remove(&oldest);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Encode an argument list as a RESP request: a `*`-prefixed array of
/// `$`-prefixed bulk strings.
///
/// Output grammar is exactly `*<N>\r\n` followed by `$<len>\r\n<bytes>\r\n`
/// per argument. A real server parses this byte for byte; a single wrong
/// length prefix desynchronizes the whole connection.
pub fn encode_command(args: &[Arg]) -> BytesMut {
    // Rough guess: header plus prefix and payload per argument.
    let mut buf = BytesMut::with_capacity(16 + args.len() * 16);
    buf.put_u8(b'*');
    LEN_CACHE.lock().render(args.len(), &mut buf);
    buf.put_slice(b"\r\n");
    for arg in args {
        let encoded = arg.encoded();
        buf.put_u8(b'$');
        LEN_CACHE.lock().render(encoded.len(), &mut buf);
        buf.put_slice(b"\r\n");
        buf.put_slice(&encoded);
        buf.put_slice(b"\r\n");
    }
    buf
}

/// Encode from reply fragments echoed back as arguments (SCAN cursors, keys
/// lifted out of a previous reply).
///
/// Fails with [`UnsupportedArgument`](crate::error::RedwireError::UnsupportedArgument)
/// if any fragment is not a scalar; nothing is emitted in that case.
pub fn try_encode_command<'a, I>(args: I) -> RedwireResult<BytesMut>
where
    I: IntoIterator<Item = &'a Reply>,
{
    let args = args
        .into_iter()
        .map(Arg::try_from)
        .collect::<RedwireResult<Vec<_>>>()?;
    Ok(encode_command(&args))
}
