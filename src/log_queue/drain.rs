use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{LogQueue, SharedSink};
use crate::utils::logging;

/// The single consumer of the [`LogQueue`]
pub struct LogDrain {
    queue: Arc<LogQueue>,
    sink: SharedSink,
    poll: Duration,
}

impl LogDrain {
    pub fn new(queue: Arc<LogQueue>, sink: SharedSink, poll: Duration) -> Self {
        Self { queue, sink, poll }
    }

    /// Forward queued lines to the sink until `shutdown` is cancelled, then
    /// flush whatever is still queued.
    ///
    /// The sink lock is taken before the queue lock, the same order `reset`
    /// uses, so a reset never interleaves with a half-forwarded batch.
    pub async fn run(self, shutdown: CancellationToken) {
        logging::log("DRAIN", "Log drain loop started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                ready = self.queue.wait(self.poll) => {
                    if !ready {
                        continue;
                    }
                }
            }
            let mut sink = self.sink.lock().await;
            self.queue.flush_into(sink.as_mut()).await;
        }
        let mut sink = self.sink.lock().await;
        let flushed = self.queue.flush_into(sink.as_mut()).await;
        logging::log("DRAIN", &format!("Log drain loop exiting after flushing {} lines", flushed));
    }
}
