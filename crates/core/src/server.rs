//! Aggregator-side request dispatch.
//!
//! The dispatcher accepts connections, decodes one request from each,
//! routes it to the store, writes a response when the operation has one,
//! and closes the connection. Every connection runs on its own thread;
//! the only state shared between connections is the [`AggregateStore`]
//! and the submission sink, both safe for concurrent use.
//!
//! A connection always ends closed, whether or not its request
//! succeeded. Failures (I/O, malformed payloads, unknown operation
//! codes, sink errors) are logged and contained to their connection;
//! nothing aborts the aggregator process.
//!
//! Threads are unbounded, one per accepted connection, with no deadline
//! on a hung peer. That matches the protocol's scale assumptions; a
//! bounded pool and per-connection deadlines are the known hardening
//! points.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::codec::{self, Request};
use crate::error::Result;
use crate::framing;
use crate::histogram::ByteHistogram;
use crate::store::AggregateStore;

/// Persistence capability for individual submissions.
///
/// The dispatcher hands every accepted ADD histogram to the sink,
/// fire-and-forget: a sink failure is logged and never propagated to
/// the client, and never blocks or fails the merge. Retry and
/// durability policy live entirely behind this trait.
pub trait SubmissionSink: Send + Sync {
    /// Durably record one submitted histogram.
    fn record(&self, histogram: &ByteHistogram) -> Result<()>;
}

/// Sink that drops every submission.
pub struct NullSink;

impl SubmissionSink for NullSink {
    fn record(&self, _histogram: &ByteHistogram) -> Result<()> {
        Ok(())
    }
}

/// Accepts connections and routes decoded requests to the store.
pub struct Dispatcher {
    store: Arc<AggregateStore>,
    sink: Arc<dyn SubmissionSink>,
}

impl Dispatcher {
    /// Create a dispatcher over the given store and submission sink.
    pub fn new(store: Arc<AggregateStore>, sink: Arc<dyn SubmissionSink>) -> Self {
        Self { store, sink }
    }

    /// Run the accept loop on an already-bound listener.
    ///
    /// Spawns one thread per accepted connection and loops until the
    /// listener itself fails fatally. Individual accept errors are
    /// logged and skipped.
    pub fn serve(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "listening");
        }

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let dispatcher = Arc::clone(&self);
                    thread::spawn(move || dispatcher.handle_connection(stream));
                }
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }

        Ok(())
    }

    /// Serve one connection: read, decode, dispatch, respond, close.
    ///
    /// Dropping the stream at the end of this function is the close; an
    /// ADD's only "response" is that clean close.
    pub fn handle_connection(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());

        debug!(%peer, "reading request");

        let message = match framing::read_message(&mut stream) {
            Ok(message) => message,
            Err(e) => {
                warn!(%peer, error = %e, "request read failed");
                return;
            }
        };

        let request = match codec::decode_request(&message) {
            Ok(request) => request,
            Err(e) => {
                // Close without responding; the client sees the close
                // (or its own empty read) as the error signal.
                warn!(%peer, error = %e, "request rejected");
                return;
            }
        };

        match request {
            Request::Add(histogram) => self.add(peer, histogram),
            Request::Get => self.get(peer, &mut stream),
        }
    }

    fn add(&self, peer: String, histogram: ByteHistogram) {
        debug!(%peer, source = %histogram.source, keys = histogram.len(), "merging submission");
        self.store.merge(&histogram);

        if let Err(e) = self.sink.record(&histogram) {
            warn!(%peer, source = %histogram.source, error = %e, "submission journal failed");
        }
    }

    fn get(&self, peer: String, stream: &mut TcpStream) {
        let snapshot = self.store.snapshot();

        let response = match codec::encode_histogram(&snapshot) {
            Ok(response) => response,
            Err(e) => {
                warn!(%peer, error = %e, "snapshot encode failed");
                return;
            }
        };

        if let Err(e) = framing::write_message(stream, &response) {
            warn!(%peer, error = %e, "response write failed");
            return;
        }

        debug!(%peer, keys = snapshot.len(), "snapshot served");
    }
}
