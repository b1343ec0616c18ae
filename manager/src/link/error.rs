use thiserror::Error;

use crate::ident::GlobalId;

/// Errors that can occur while wiring or propagating links
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// An endpoint names a proxy the session does not know
    #[error("link endpoint {id} is not a registered proxy")]
    UnknownProxy { id: GlobalId },

    /// An endpoint names a property its proxy does not carry
    #[error("link endpoint {id} has no property `{name}`")]
    UnknownProperty { id: GlobalId, name: String },

    /// A persisted link could not be re-attached on load
    #[error("link `{link}`: endpoint {id} could not be resolved")]
    UnresolvedEndpoint { link: String, id: GlobalId },

    /// A persisted property-link endpoint carries no property name
    #[error("link `{link}`: endpoint {id} names no property")]
    MissingEndpointProperty { link: String, id: GlobalId },

    /// Copying a value between linked properties failed
    #[error("copying `{name}` from {origin} to {target} failed: {reason}")]
    CopyFailed {
        name: String,
        origin: GlobalId,
        target: GlobalId,
        reason: String,
    },

    /// Forwarding an update or render through the session failed
    #[error("link propagation through the session failed: {reason}")]
    Propagation { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_failure_names_both_endpoints() {
        let error = LinkError::CopyFailed {
            name: "Radius".to_string(),
            origin: GlobalId::from_value(300),
            target: GlobalId::from_value(301),
            reason: "snapshot holds references, expected elements".to_string(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("gid:300"));
        assert!(rendered.contains("gid:301"));
    }
}
