use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Runtime error: {0}")]
    Runtime(core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),
}

impl From<core_runtime::Error> for CoreError {
    fn from(err: core_runtime::Error) -> Self {
        match err {
            core_runtime::Error::CapabilityMissing {
                capability,
                message,
            } => CoreError::CapabilityMissing {
                capability,
                message,
            },
            other => CoreError::Runtime(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_capability_is_lifted() {
        let err = CoreError::from(core_runtime::Error::CapabilityMissing {
            capability: "IdentityProvider".into(),
            message: "required".into(),
        });
        assert!(matches!(err, CoreError::CapabilityMissing { ref capability, .. } if capability == "IdentityProvider"));

        let err = CoreError::from(core_runtime::Error::Config("bad".into()));
        assert!(matches!(err, CoreError::Runtime(core_runtime::Error::Config(_))));
    }
}
