// Relay a Docker event subscription into a client sink.
//
// The loop waits on three things at once: the client's cancellation signal, the daemon's
// event stream (which carries both events and errors, in order) and an optional keep-alive
// tick. Polling is biased in that order, so a client that has gone away is never written to
// again even when events are already queued.

use crate::error::DockerError;
use bollard::models::EventMessage;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};

/// Where relayed events go: a WebSocket, a chunked HTTP body, a test buffer.
pub trait EventSink: Send {
    /// Deliver one serialized event.
    fn send(&mut self, frame: String) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Keep-alive hook, called on each heartbeat tick.
    fn heartbeat(&mut self) -> impl Future<Output = anyhow::Result<()>> + Send {
        async { Ok(()) }
    }
}

/// Why a relay stopped.
#[derive(Debug)]
pub enum RelayEnd {
    /// The client cancelled (disconnected, closed the socket). Not an error.
    Cancelled,
    /// The daemon reported an error on the subscription.
    DaemonError(DockerError),
    /// Writing to the client failed. Missed events are not buffered or retried.
    SinkFailed(anyhow::Error),
    /// The daemon closed the subscription (e.g. `until` reached).
    StreamEnded,
}

/// Forward events from `events` to `sink` until cancellation, a daemon error, a sink error or
/// the end of the stream. No timeout applies to the wait itself.
pub async fn relay_events<S, K, C>(
    events: S,
    sink: &mut K,
    cancel: C,
    heartbeat: Option<Duration>,
) -> RelayEnd
where
    S: Stream<Item = Result<EventMessage, DockerError>>,
    K: EventSink,
    C: Future<Output = ()>,
{
    tokio::pin!(events);
    tokio::pin!(cancel);
    let mut ping = heartbeat.map(|period| {
        let mut i = tokio::time::interval_at(Instant::now() + period, period);
        i.set_missed_tick_behavior(MissedTickBehavior::Skip);
        i
    });

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => return RelayEnd::Cancelled,
            item = events.next() => match item {
                Some(Ok(event)) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(f) => f,
                        Err(e) => return RelayEnd::SinkFailed(e.into()),
                    };
                    if let Err(e) = sink.send(frame).await {
                        return RelayEnd::SinkFailed(e);
                    }
                }
                Some(Err(e)) => return RelayEnd::DaemonError(e),
                None => return RelayEnd::StreamEnded,
            },
            _ = next_tick(&mut ping) => {
                if let Err(e) = sink.heartbeat().await {
                    return RelayEnd::SinkFailed(e);
                }
            }
        }
    }
}

async fn next_tick(ping: &mut Option<Interval>) {
    match ping {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Newline-delimited JSON into a channel that backs a streaming HTTP body.
pub struct ChannelSink(pub mpsc::Sender<Bytes>);

impl EventSink for ChannelSink {
    async fn send(&mut self, mut frame: String) -> anyhow::Result<()> {
        frame.push('\n');
        self.0
            .send(Bytes::from(frame))
            .await
            .map_err(|_| anyhow::anyhow!("event stream client went away"))
    }
}
