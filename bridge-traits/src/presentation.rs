//! Presentation surface for interactive flows.
//!
//! Interactive sign-in needs something visible to present on: an `Activity` on
//! Android, a `UIViewController` on iOS, a window on desktop. The surface may come
//! and go with the host lifecycle, so it is resolved at call time rather than
//! captured once.

/// Opaque handle to a host surface, passed through to the native SDK.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresentationContext {
    pub handle: String,
}

impl PresentationContext {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
        }
    }
}

/// Resolves the current foreground surface, if any.
pub trait PresentationSurface: Send + Sync {
    /// `None` when nothing is currently presentable.
    fn resolve(&self) -> Option<PresentationContext>;
}
