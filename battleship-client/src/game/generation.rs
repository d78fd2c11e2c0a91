//! Generation counters used to discard results of superseded requests.
//!
//! Every fetch scope owns a [`Generation`]. Starting a request takes a [`Token`] for the
//! next generation, and a response is only applied if its token is still current. Any
//! later request, or an explicit [`Generation::invalidate`], makes older tokens stale.
//! Nothing is cancelled at the transport level; stale results are simply dropped when
//! they arrive.

use std::{fmt, marker::PhantomData};

/// Monotonic counter for one request scope. `S` is a marker type naming the scope, so
/// that tokens from different scopes cannot be mixed up.
pub struct Generation<S> {
    current: u64,
    scope: PhantomData<fn() -> S>,
}

impl<S> Generation<S> {
    pub fn new() -> Self {
        Self {
            current: 0,
            scope: PhantomData,
        }
    }

    /// Start a new request, making every earlier token stale.
    pub fn next(&mut self) -> Token<S> {
        self.current += 1;
        Token::new(self.current)
    }

    /// Token for the current generation, without superseding anything. For scopes whose
    /// requests run side by side and are only invalidated together.
    pub fn token(&self) -> Token<S> {
        Token::new(self.current)
    }

    /// Make every outstanding token stale without starting a request.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }

    /// Whether `token` belongs to the most recent request of this scope.
    pub fn is_current(&self, token: Token<S>) -> bool {
        token.value == self.current
    }
}

impl<S> Default for Generation<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Generation<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Generation").field(&self.current).finish()
    }
}

/// Identifies one request within a scope.
pub struct Token<S> {
    value: u64,
    scope: PhantomData<fn() -> S>,
}

impl<S> Token<S> {
    fn new(value: u64) -> Self {
        Self {
            value,
            scope: PhantomData,
        }
    }

    /// The generation number, for logging.
    pub fn value(&self) -> u64 {
        self.value
    }
}

// Derives would require `S: Copy` etc, but the marker is never stored.
impl<S> Clone for Token<S> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<S> Copy for Token<S> {}

impl<S> PartialEq for Token<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<S> Eq for Token<S> {}

impl<S> fmt::Debug for Token<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Token").field(&self.value).finish()
    }
}
