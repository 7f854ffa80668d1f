//! Foreground window tracking for interactive flows.

use bridge_traits::presentation::{PresentationContext, PresentationSurface};
use std::sync::RwLock;
use tracing::debug;

/// Presentation surface the host updates as windows come and go.
///
/// Mirrors the mobile activity/view-controller lifecycle: attach when a window
/// becomes the foreground, detach when it goes away. Sign-in resolves whatever is
/// attached at call time.
#[derive(Debug, Default)]
pub struct DesktopPresentation {
    current: RwLock<Option<PresentationContext>>,
}

impl DesktopPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a window already attached.
    pub fn with_window(handle: impl Into<String>) -> Self {
        let surface = Self::new();
        surface.attach(handle);
        surface
    }

    /// Replace the current foreground window.
    pub fn attach(&self, handle: impl Into<String>) {
        let context = PresentationContext::new(handle);
        debug!(handle = %context.handle, "Presentation surface attached");
        match self.current.write() {
            Ok(mut guard) => *guard = Some(context),
            Err(poisoned) => *poisoned.into_inner() = Some(context),
        }
    }

    pub fn detach(&self) {
        debug!("Presentation surface detached");
        match self.current.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.resolve().is_some()
    }
}

impl PresentationSurface for DesktopPresentation {
    fn resolve(&self) -> Option<PresentationContext> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_detached() {
        let surface = DesktopPresentation::new();
        assert!(surface.resolve().is_none());
        assert!(!surface.is_attached());
    }

    #[test]
    fn test_attach_detach_cycle() {
        let surface = DesktopPresentation::new();

        surface.attach("window-1");
        assert_eq!(surface.resolve(), Some(PresentationContext::new("window-1")));

        surface.attach("window-2");
        assert_eq!(surface.resolve().map(|c| c.handle), Some("window-2".to_string()));

        surface.detach();
        assert!(surface.resolve().is_none());
    }

    #[test]
    fn test_with_window() {
        let surface = DesktopPresentation::with_window("main");
        assert!(surface.is_attached());
    }
}
