// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use std::fmt;

/// Handle returned when registering a listener.
///
/// Dropping the handle does not remove the listener; call [`Subscription::unsubscribe`] for that.
#[must_use = "a subscription is the only way to remove its listener again"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Removes the listener. Does nothing if its tree or store no longer exists.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
