use crate::error::RedwireResult;
use crate::reply::{Reply, pair_up};
use std::collections::VecDeque;
use tracing::trace;

/// The cursor token a scan starts from, and the one that marks completion.
pub const ZERO_CURSOR: &[u8] = b"0";

/// One page of a cursor-driven scan: the next cursor token plus the items
/// found on this page.
pub type ScanPage = (Vec<u8>, Vec<Reply>);

/// The low-level scan primitive supplied by the transport, typically a
/// wrapper around one `SCAN`/`HSCAN`/`SSCAN`/`ZSCAN` round trip.
///
/// Network I/O happens inside `scan`; the iterators only call it again once
/// the previous page is fully drained.
pub trait ScanCommand {
    fn scan(&mut self, cursor: &[u8]) -> impl Future<Output = RedwireResult<ScanPage>> + Send;
}

/// Scan phase. A page fetch is only ever attempted from `Fetching`, so the
/// initial zero cursor still forces the first round trip; the completion
/// check (zero cursor AND drained buffer) runs only after a fetch has
/// replaced the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Buffer is empty and the server may have more pages.
    Fetching,
    /// Buffered items remain from the last fetched page.
    Draining,
    /// The cursor returned to zero and the buffer is drained. Terminal.
    Exhausted,
}

/// The state machine shared by both iterator variants. `regroup` maps a raw
/// page onto the buffered item type.
struct ScanDriver<S, T> {
    scan: S,
    cursor: Vec<u8>,
    buffer: VecDeque<T>,
    state: ScanState,
}

impl<S: ScanCommand, T> ScanDriver<S, T> {
    fn new(scan: S) -> Self {
        ScanDriver {
            scan,
            cursor: ZERO_CURSOR.to_vec(),
            buffer: VecDeque::new(),
            state: ScanState::Fetching,
        }
    }

    async fn next<F>(&mut self, regroup: F) -> Option<RedwireResult<T>>
    where
        F: Fn(Vec<Reply>) -> RedwireResult<Vec<T>>,
    {
        loop {
            match self.state {
                ScanState::Exhausted => return None,
                ScanState::Draining => {
                    let Some(item) = self.buffer.pop_front() else {
                        self.state = ScanState::Fetching;
                        continue;
                    };
                    if self.buffer.is_empty() {
                        self.state = if self.cursor == ZERO_CURSOR {
                            ScanState::Exhausted
                        } else {
                            ScanState::Fetching
                        };
                    }
                    return Some(Ok(item));
                }
                ScanState::Fetching => {
                    let (cursor, page) = match self.scan.scan(&self.cursor).await {
                        Ok(page) => page,
                        // The cursor is untouched; the caller may call again.
                        Err(e) => return Some(Err(e)),
                    };
                    trace!(items = page.len(), "scan page fetched");
                    self.cursor = cursor;
                    match regroup(page) {
                        Ok(items) => self.buffer.extend(items),
                        Err(e) => return Some(Err(e)),
                    }
                    if !self.buffer.is_empty() {
                        self.state = ScanState::Draining;
                    } else if self.cursor == ZERO_CURSOR {
                        self.state = ScanState::Exhausted;
                    }
                    // An empty page with a live cursor stays in Fetching and
                    // loops into the next round trip.
                }
            }
        }
    }
}

/// Lazy item-at-a-time iteration over a cursor-driven scan.
///
/// Items are yielded in server order across pages, and at most one page is
/// buffered at a time. Single-consumer: the `&mut self` receiver means one
/// advance can be in flight per iterator.
pub struct ScanIter<S> {
    driver: ScanDriver<S, Reply>,
}

impl<S: ScanCommand> ScanIter<S> {
    pub fn new(scan: S) -> Self {
        ScanIter {
            driver: ScanDriver::new(scan),
        }
    }

    /// Yield the next item, fetching pages as needed. `None` means the scan
    /// completed normally; it is not an error.
    pub async fn next(&mut self) -> Option<RedwireResult<Reply>> {
        self.driver.next(Ok).await
    }

    /// Drain the remaining items into a vector.
    pub async fn collect(mut self) -> RedwireResult<Vec<Reply>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }
}

/// Key/value-pair variant: each page is a flat sequence regrouped into
/// consecutive pairs before buffering (as `HSCAN` and `ZSCAN` return them).
/// An odd-length page is a malformed reply.
pub struct ScanPairsIter<S> {
    driver: ScanDriver<S, (Reply, Reply)>,
}

impl<S: ScanCommand> ScanPairsIter<S> {
    pub fn new(scan: S) -> Self {
        ScanPairsIter {
            driver: ScanDriver::new(scan),
        }
    }

    pub async fn next(&mut self) -> Option<RedwireResult<(Reply, Reply)>> {
        self.driver.next(pair_up).await
    }

    pub async fn collect(mut self) -> RedwireResult<Vec<(Reply, Reply)>> {
        let mut pairs = Vec::new();
        while let Some(pair) = self.next().await {
            pairs.push(pair?);
        }
        Ok(pairs)
    }
}
