//! Monotonic request tickets for discarding stale responses.
//!
//! DESIGN
//! ======
//! A screen issues a ticket before each fetch and only applies a response
//! whose ticket is still the newest. Invalidating (the screen went away)
//! bumps the counter so every outstanding ticket becomes stale and late
//! responses are dropped instead of failing.

#[cfg(test)]
#[path = "sequence_test.rs"]
mod sequence_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Make every ticket issued so far stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}
