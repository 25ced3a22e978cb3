use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one issued render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    /// Generation number; later requests have larger numbers.
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Last-request-wins filter for render results.
///
/// Issue a ticket when a render starts and pass the result through [`RenderGate::accept`] when it
/// finishes. Results whose ticket has been superseded are dropped on arrival.
#[derive(Debug, Default)]
pub struct RenderGate {
    latest: AtomicU64,
}

impl RenderGate {
    /// Gate with no tickets issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn issue(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Return `true` when no newer ticket has been issued.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Hand back `value` if `ticket` is still the latest, otherwise drop it.
    pub fn accept<T>(&self, ticket: RenderTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::Acquire),
                "discarding stale render"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/gate.rs"]
mod tests;
