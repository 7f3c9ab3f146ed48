//! Navigation requests issued by the session layer

use tokio::sync::mpsc;
use tracing::debug;

/// A request for the rendering surface to change location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: String,
    /// Location to return to after signing in
    pub from: Option<String>,
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

impl NavigationRequest {
    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            from: None,
            replace: true,
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

/// Sink for navigation requests
pub trait Navigator: Send + Sync {
    fn navigate(&self, request: NavigationRequest);
}

/// Forwards navigation requests into a channel drained by the rendering
/// surface
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<NavigationRequest>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, request: NavigationRequest) {
        debug!(path = %request.path, replace = request.replace, "Navigating");
        if self.tx.send(request).is_err() {
            debug!("Navigation receiver dropped, request discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_navigator_forwards_requests() {
        let (navigator, mut rx) = ChannelNavigator::new();
        navigator.navigate(NavigationRequest::replace("/login").with_from("/transfer"));

        let request = rx.try_recv().unwrap();
        assert_eq!(request.path, "/login");
        assert_eq!(request.from.as_deref(), Some("/transfer"));
        assert!(request.replace);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (navigator, rx) = ChannelNavigator::new();
        drop(rx);
        navigator.navigate(NavigationRequest::replace("/dashboard"));
    }
}
