//! Error types for overlay operations.
//!
//! Structural errors (`InvalidReconfiguration`, `ReconfigurationUnsupported`,
//! `MutuallyExclusive`) are programmer errors: they are returned at the moment
//! the offending change is submitted and are never retried. Provider readiness
//! is not an error; callers wait for it instead.

use thiserror::Error;

use crate::layer::LayerId;
use crate::provider::ProviderError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OverlayError {
    /// A property that defines layer topology was changed after creation
    #[error("cannot change {property} after the layer has been created")]
    InvalidReconfiguration { property: &'static str },

    /// Live cluster reconfiguration requested on a provider without support
    #[error("cannot change {property}: the {provider} provider does not support live cluster reconfiguration")]
    ReconfigurationUnsupported {
        property: &'static str,
        provider: String,
    },

    /// Two settings that exclude each other were combined
    #[error("{property} cannot be set while {conflicts_with} is enabled")]
    MutuallyExclusive {
        property: &'static str,
        conflicts_with: &'static str,
    },

    /// Layer id was never added to the service, or was already deleted
    #[error("layer {0} is not registered")]
    UnknownLayer(LayerId),

    /// Operation on a canvas overlay after `delete()`
    #[error("canvas overlay has been disposed")]
    OverlayDisposed,

    /// Operation on a directive after teardown
    #[error("directive has been torn down")]
    DirectiveDisposed,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconfiguration_message_names_property() {
        let err = OverlayError::InvalidReconfiguration {
            property: "ClusterClickAction",
        };
        assert_eq!(
            err.to_string(),
            "cannot change ClusterClickAction after the layer has been created"
        );
    }

    #[test]
    fn test_provider_error_converts() {
        let err: OverlayError = ProviderError::InvalidOptions("bad".to_string()).into();
        assert!(matches!(err, OverlayError::Provider(_)));
        assert_eq!(err.to_string(), "Invalid options: bad");
    }

    #[test]
    fn test_mutually_exclusive_message() {
        let err = OverlayError::MutuallyExclusive {
            property: "IconCreationCallback",
            conflicts_with: "UseDynamicSizeMarkers",
        };
        assert!(err.to_string().contains("UseDynamicSizeMarkers"));
    }
}
