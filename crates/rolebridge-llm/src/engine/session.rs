use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Instant;

use bytes::Bytes;
use futures_util::Stream;
use rolebridge_telemetry::RelayMetrics;
use url::Url;
use uuid::Uuid;

use super::phase::DispatchPhase;
use crate::backend::{BackendError, ByteStream};

/// Per-dispatch state, owning the upstream connection exclusively
///
/// Whatever way the session ends, dropping it releases the connection and
/// records the outcome.
pub struct StreamSession {
    id: Uuid,
    endpoint: Url,
    started: Instant,
    phase: DispatchPhase,
    upstream: Option<ByteStream>,
    bytes: u64,
    chunks: u64,
    first_byte: Option<Instant>,
}

impl StreamSession {
    pub fn new(endpoint: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint,
            started: Instant::now(),
            phase: DispatchPhase::Built,
            upstream: None,
            bytes: 0,
            chunks: 0,
            first_byte: None,
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    pub const fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Move to `next`, ignoring moves the phase table forbids
    pub fn advance(&mut self, next: DispatchPhase) {
        match self.phase.transition(next) {
            Some(phase) => self.phase = phase,
            None => tracing::warn!(
                session = %self.id,
                from = self.phase.as_str(),
                to = next.as_str(),
                "ignored invalid dispatch phase transition"
            ),
        }
    }

    /// Take ownership of the response body once headers have arrived
    pub fn attach(&mut self, upstream: ByteStream) {
        self.upstream = Some(upstream);
    }

    /// Enter a terminal phase and release the connection right away
    pub fn finish(&mut self, phase: DispatchPhase) {
        self.advance(phase);
        self.upstream = None;
    }

    fn record_chunk(&mut self, len: usize) {
        if self.first_byte.is_none() {
            self.first_byte = Some(Instant::now());
        }
        self.chunks += 1;
        self.bytes += len as u64;
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if !self.phase.is_terminal() {
            self.advance(DispatchPhase::Cancelled);
        }
        self.upstream = None;

        let duration = self.started.elapsed();
        let first_byte = self.first_byte.map(|at| at.duration_since(self.started));
        let outcome = self.phase.as_str();

        match self.phase {
            DispatchPhase::Cancelled => tracing::info!(
                session = %self.id,
                endpoint = %self.endpoint,
                bytes = self.bytes,
                chunks = self.chunks,
                elapsed_ms = duration.as_millis(),
                "caller disconnected, upstream connection released"
            ),
            DispatchPhase::TransportError => tracing::warn!(
                session = %self.id,
                endpoint = %self.endpoint,
                bytes = self.bytes,
                chunks = self.chunks,
                elapsed_ms = duration.as_millis(),
                "relay ended by transport failure"
            ),
            _ => tracing::debug!(
                session = %self.id,
                outcome,
                bytes = self.bytes,
                chunks = self.chunks,
                elapsed_ms = duration.as_millis(),
                first_byte_ms = first_byte.map(|d| d.as_millis()),
                "relay finished"
            ),
        }

        RelayMetrics::global().record(outcome, duration, first_byte, self.bytes);
    }
}

/// Body stream handed to the HTTP layer
///
/// Chunks are passed on in arrival order, one for one. Dropping the stream
/// (the caller disconnected) drops the session and with it the upstream body.
pub struct RelayStream {
    session: StreamSession,
}

impl RelayStream {
    pub(crate) fn new(mut session: StreamSession) -> Self {
        session.advance(DispatchPhase::Streaming);
        Self { session }
    }

    pub const fn session(&self) -> &StreamSession {
        &self.session
    }
}

impl Stream for RelayStream {
    type Item = Result<Bytes, BackendError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let session = &mut self.get_mut().session;
        let Some(upstream) = session.upstream.as_mut() else {
            return Poll::Ready(None);
        };

        match ready!(upstream.as_mut().poll_next(cx)) {
            Some(Ok(chunk)) => {
                session.record_chunk(chunk.len());
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(error)) => {
                // Status is already committed; ending the body is the only signal left
                tracing::error!(session = %session.id, bytes = session.bytes, error = %error, "backend stream failed mid-relay");
                session.finish(DispatchPhase::TransportError);
                Poll::Ready(Some(Err(error)))
            }
            None => {
                session.finish(DispatchPhase::Done);
                Poll::Ready(None)
            }
        }
    }
}
