//! The inbound router: one reader thread, three ordered channels.
//!
//! A single long-lived thread blocks on the transport and appends each
//! line to exactly one queue. The router performs no business logic;
//! consumers on different channels never wake or starve each other. It
//! survives any malformed line and exits only when the stream itself ends,
//! closing all three queues so every dependent sees the terminal signal.

use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::classify::{classify, Channel};
use crate::error::Result;
use crate::queue::MessageQueue;
use crate::transport::LineReader;

/// Cloneable handles to the three routed channels.
#[derive(Clone, Default)]
pub struct RouterChannels {
    /// Command acknowledgments, consumed by the dispatcher's wait loop.
    pub acks: MessageQueue<String>,
    /// Player-input events, polled by the input handler.
    pub inputs: MessageQueue<String>,
    /// Spatial events, polled by the reconciler.
    pub locations: MessageQueue<String>,
}

impl RouterChannels {
    fn close_all(&self) {
        self.acks.close();
        self.inputs.close();
        self.locations.close();
    }
}

/// Handle to the running router thread.
pub struct InboundRouter {
    thread: JoinHandle<()>,
}

impl InboundRouter {
    /// Start the router over the given reader.
    ///
    /// # Errors
    /// [`crate::WireError::Transport`] when the OS refuses the thread.
    pub fn spawn<R: LineReader + 'static>(reader: R) -> Result<(Self, RouterChannels)> {
        let channels = RouterChannels::default();
        let routed = channels.clone();
        let thread = thread::Builder::new()
            .name("stagehand-router".to_string())
            .spawn(move || run(reader, &routed))?;
        Ok((Self { thread }, channels))
    }

    /// Wait for the router thread to finish (it finishes when the engine
    /// stream ends).
    pub fn join(self) {
        if self.thread.join().is_err() {
            warn!("router thread panicked");
        }
    }
}

fn run<R: LineReader>(mut reader: R, channels: &RouterChannels) {
    loop {
        match reader.read_line() {
            Ok(Some(line)) => match classify(&line) {
                Channel::Ack => {
                    channels.acks.push(line);
                }
                Channel::Input => {
                    channels.inputs.push(line);
                }
                Channel::Location => {
                    channels.locations.push(line);
                }
                Channel::Unclassified => {
                    debug!(%line, "unclassified engine line dropped");
                }
            },
            Ok(None) => {
                info!("engine stream ended");
                break;
            }
            Err(err) => {
                warn!(%err, "engine read failed, stopping router");
                break;
            }
        }
    }
    channels.close_all();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::loopback;

    #[test]
    fn lines_land_in_exactly_one_queue() {
        let (_writer, reader, peer) = loopback();
        let (router, channels) = InboundRouter::spawn(reader).expect("spawn");

        peer.feed("succeeded ShowMenu()");
        peer.feed("input Selected Start");
        peer.feed("input arrived bob position kitchen.Door");
        peer.feed("noise from the engine");
        peer.close();
        router.join();

        assert_eq!(channels.acks.pop().expect("ack"), "succeeded ShowMenu()");
        assert_eq!(channels.inputs.pop().expect("input"), "input Selected Start");
        assert_eq!(
            channels.locations.pop().expect("location"),
            "input arrived bob position kitchen.Door"
        );

        // Nothing was double-routed, and the noise line went nowhere.
        for queue in [&channels.acks, &channels.inputs, &channels.locations] {
            assert!(matches!(
                queue.pop(),
                Err(crate::WireError::ChannelClosed)
            ));
        }
    }

    #[test]
    fn channel_order_matches_stream_order() {
        let (_writer, reader, peer) = loopback();
        let (router, channels) = InboundRouter::spawn(reader).expect("spawn");

        peer.feed("input one");
        peer.feed("succeeded A()");
        peer.feed("input two");
        peer.feed("input three");
        peer.close();
        router.join();

        assert_eq!(channels.inputs.pop().expect("1"), "input one");
        assert_eq!(channels.inputs.pop().expect("2"), "input two");
        assert_eq!(channels.inputs.pop().expect("3"), "input three");
    }

    #[test]
    fn eof_closes_every_queue() {
        let (_writer, reader, peer) = loopback();
        let (router, channels) = InboundRouter::spawn(reader).expect("spawn");
        peer.close();
        router.join();

        assert!(channels.acks.is_closed());
        assert!(channels.inputs.is_closed());
        assert!(channels.locations.is_closed());
    }

    #[test]
    fn malformed_lines_do_not_stop_the_router() {
        let (_writer, reader, peer) = loopback();
        let (router, channels) = InboundRouter::spawn(reader).expect("spawn");

        peer.feed("");
        peer.feed("garbage\u{0}line");
        peer.feed("input still alive");
        peer.close();
        router.join();

        assert_eq!(channels.inputs.pop().expect("alive"), "input still alive");
    }
}
