//! Host platform identification.
//!
//! The same failure ("nothing to present the sign-in UI on") is reported with a
//! different code depending on the host, so the core needs to know which host it
//! runs under.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The host environment the core is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    /// Android: interactive flows need a foreground `Activity`.
    Android,
    /// iOS: interactive flows need a presenting `UIViewController`.
    Ios,
    /// Desktop hosts: interactive flows need a foreground window.
    #[default]
    Desktop,
}

impl HostPlatform {
    /// Human-readable name of the surface interactive flows are presented on.
    pub fn surface_name(&self) -> &'static str {
        match self {
            HostPlatform::Android => "activity",
            HostPlatform::Ios => "view controller",
            HostPlatform::Desktop => "window",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HostPlatform::Android => "android",
            HostPlatform::Ios => "ios",
            HostPlatform::Desktop => "desktop",
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_platform_is_desktop() {
        assert_eq!(HostPlatform::default(), HostPlatform::Desktop);
    }

    #[test]
    fn test_surface_names() {
        assert_eq!(HostPlatform::Android.surface_name(), "activity");
        assert_eq!(HostPlatform::Ios.surface_name(), "view controller");
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(HostPlatform::Ios.to_string(), "ios");
        assert_eq!(HostPlatform::Android.to_string(), "android");
    }
}
