use crate::arg::Arg;
use crate::coerced::CoercedKeyMap;
use crate::error::{RedwireError, RedwireResult};
use crate::reply::{Reply, TxReply, pair_up};
use tokio::sync::oneshot;
use tracing::{debug, error};

type Settled = RedwireResult<TxReply>;

/// Transport-side handle that settles a [`PendingReply`] exactly once.
#[derive(Debug)]
pub struct ReplySender {
    tx: Option<oneshot::Sender<Settled>>,
}

/// An in-flight reply awaiting settlement by the transport.
///
/// One cell per issued command; the call site awaits it (directly via
/// [`wait`](PendingReply::wait) or through one of the adapters) while the
/// transport settles it when the matching reply arrives. Dropping the cell
/// cancels it.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<Settled>,
}

impl PendingReply {
    pub fn new() -> (ReplySender, PendingReply) {
        let (tx, rx) = oneshot::channel();
        (ReplySender { tx: Some(tx) }, PendingReply { rx })
    }

    /// Give up on this reply. Any later settlement becomes a no-op.
    pub fn cancel(self) {}

    /// Await the raw settled outcome.
    pub async fn wait(self) -> RedwireResult<TxReply> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RedwireError::Dropped),
        }
    }

    /// Await an `OK` acknowledgment.
    ///
    /// A `QUEUED` outcome passes through so transaction code can see it;
    /// otherwise yields `true` iff the reply is the literal `OK` token.
    pub async fn ok(self) -> RedwireResult<TxReply<bool>> {
        match self.wait().await? {
            TxReply::Queued => Ok(TxReply::Queued),
            TxReply::Value(reply) => Ok(TxReply::Value(reply.is_ok_token())),
        }
    }

    /// Await and convert the reply through `convert`.
    ///
    /// A `QUEUED` outcome passes through without conversion. Errors from
    /// `convert` propagate unchanged.
    pub async fn convert<T, F>(self, convert: F) -> RedwireResult<TxReply<T>>
    where
        F: FnOnce(Reply) -> RedwireResult<T>,
    {
        match self.wait().await? {
            TxReply::Queued => Ok(TxReply::Queued),
            TxReply::Value(reply) => Ok(TxReply::Value(convert(reply)?)),
        }
    }

    /// Await a flat field/value array and regroup it into a map, pairing
    /// consecutive elements.
    ///
    /// A `QUEUED` outcome passes through. Odd-length arrays and non-array
    /// replies are malformed; non-scalar keys are unsupported.
    pub async fn into_map(self) -> RedwireResult<TxReply<CoercedKeyMap<Reply>>> {
        match self.wait().await? {
            TxReply::Queued => Ok(TxReply::Queued),
            TxReply::Value(Reply::Array(items)) => {
                let mut map = CoercedKeyMap::new();
                for (key, value) in pair_up(items)? {
                    map.insert(Arg::try_from(&key)?.encode(), value);
                }
                Ok(TxReply::Value(map))
            }
            TxReply::Value(other) => Err(RedwireError::MalformedReply(format!(
                "expected a field/value array, got {other:?}"
            ))),
        }
    }
}

impl ReplySender {
    /// Settle with a reply.
    pub fn settle(&mut self, reply: TxReply) {
        self.finish(Ok(reply));
    }

    /// Settle with an error.
    pub fn fail(&mut self, err: RedwireError) {
        self.finish(Err(err));
    }

    /// True once this handle has settled its cell.
    pub fn is_settled(&self) -> bool {
        self.tx.is_none()
    }

    fn finish(&mut self, outcome: Settled) {
        match self.tx.take() {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    // The awaiting side cancelled; dropping the outcome is fine.
                    debug!("settling a cancelled pending reply");
                }
            }
            None => {
                // Two replies routed to one cell means the transport lost
                // track of which reply belongs to which command.
                error!("pending reply settled twice; reply stream is desynchronized");
                debug_assert!(false, "pending reply settled twice");
            }
        }
    }
}
