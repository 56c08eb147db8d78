/// Lifecycle of one backend dispatch
///
/// ```text
/// Built -> Sent -> HeadersReceived -> Streaming -> Done
///                                  \-> ErrorResponse
/// ```
///
/// Any non-terminal phase may end in `TransportError` or `Cancelled`.
/// Once streaming has started the status line is committed, so there is no
/// edge from `Streaming` to `ErrorResponse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Built,
    Sent,
    HeadersReceived,
    Streaming,
    Done,
    ErrorResponse,
    TransportError,
    /// The caller went away before the relay finished
    Cancelled,
}

impl DispatchPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Sent => "sent",
            Self::HeadersReceived => "headers_received",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::ErrorResponse => "error_response",
            Self::TransportError => "transport_error",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::ErrorResponse | Self::TransportError | Self::Cancelled
        )
    }

    pub const fn can_transition(self, next: Self) -> bool {
        use DispatchPhase::{
            Built, Cancelled, Done, ErrorResponse, HeadersReceived, Sent, Streaming, TransportError,
        };

        match (self, next) {
            (Built, Sent) | (Sent, HeadersReceived) | (HeadersReceived, Streaming | ErrorResponse) | (Streaming, Done) => {
                true
            }
            (from, TransportError | Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// The next phase, or `None` if the move is not allowed
    pub const fn transition(self, next: Self) -> Option<Self> {
        if self.can_transition(next) { Some(next) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::DispatchPhase::{
        Built, Cancelled, Done, ErrorResponse, HeadersReceived, Sent, Streaming, TransportError,
    };

    #[test]
    fn happy_path_is_allowed() {
        let mut phase = Built;
        for next in [Sent, HeadersReceived, Streaming, Done] {
            phase = phase.transition(next).unwrap();
        }
        assert!(phase.is_terminal());
    }

    #[test]
    fn streaming_cannot_become_error_response() {
        assert!(!Streaming.can_transition(ErrorResponse));
        assert!(Streaming.can_transition(TransportError));
        assert!(Streaming.can_transition(Cancelled));
    }

    #[test]
    fn terminal_phases_are_final() {
        for terminal in [Done, ErrorResponse, TransportError, Cancelled] {
            for next in [Built, Sent, HeadersReceived, Streaming, Done, ErrorResponse, TransportError, Cancelled] {
                assert!(!terminal.can_transition(next), "{terminal:?} -> {next:?}");
            }
        }
    }

    #[test]
    fn phases_cannot_be_skipped() {
        assert!(!Built.can_transition(HeadersReceived));
        assert!(!Sent.can_transition(Streaming));
        assert!(!HeadersReceived.can_transition(Done));
    }
}
