//! Error types for Ummati infrastructure
//!
//! Errors are structured with fields so a failed deployment run names the
//! exact configuration key, argument or resource at fault. Every variant only
//! carries owned strings, which keeps `Error` cheap to clone through shared
//! deferred outputs.

use std::fmt;

use thiserror::Error;

/// Why a configuration value was rejected
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// The value could not be parsed as a number
    NotANumber,
    /// The value did not match the declared regular expression
    PatternMismatch {
        /// The pattern the value was checked against
        pattern: String,
    },
    /// The value is not one of the allowed enum names
    NotRecognized,
    /// The raw value is not a JSON array of strings
    NotAStringArray,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NotANumber => f.write_str("not a number"),
            InvalidReason::PatternMismatch { pattern } => {
                write!(f, "pattern mismatch, expected {pattern}")
            }
            InvalidReason::NotRecognized => f.write_str("not recognized"),
            InvalidReason::NotAStringArray => f.write_str("not a string array"),
        }
    }
}

/// Main error type for Ummati operations
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A required configuration key is absent from the store
    #[error("configuration missing: {key}")]
    ConfigurationMissing {
        /// The key that was read
        key: String,
    },

    /// A configuration value failed to parse, match its pattern, or map to an enum
    #[error("configuration invalid: {key} with value '{value}' ({reason})")]
    ConfigurationInvalid {
        /// The key that was read
        key: String,
        /// The raw value (or collection element) that was rejected
        value: String,
        /// Why it was rejected
        reason: InvalidReason,
    },

    /// A numeric configuration value lies outside its inclusive bounds
    #[error(
        "configuration out of range: {key} with value '{value}' must be between {} and {}",
        bound_or(.minimum, "-inf"),
        bound_or(.maximum, "+inf")
    )]
    ConfigurationOutOfRange {
        /// The key that was read
        key: String,
        /// The parsed value
        value: String,
        /// Inclusive lower bound, if declared
        minimum: Option<String>,
        /// Inclusive upper bound, if declared
        maximum: Option<String>,
    },

    /// A required argument to a resource component was empty
    #[error("invalid argument '{argument}': {message}")]
    ArgumentInvalid {
        /// Name of the argument
        argument: String,
        /// What is wrong with it
        message: String,
    },

    /// A returned value could not be decoded (base64, UTF-8)
    #[error("decode error [{context}]: {message}")]
    Decode {
        /// What was being decoded (e.g., "kubeconfig")
        context: String,
        /// Description of what failed
        message: String,
    },

    /// The provisioning engine failed to register or resolve a resource
    #[error("provisioning error for {resource}: {message}")]
    Provisioning {
        /// Logical name of the resource
        resource: String,
        /// Description of what failed
        message: String,
    },

    /// Two resources were registered under the same logical name
    #[error("duplicate resource name: {name}")]
    DuplicateResource {
        /// The logical name that was requested twice
        name: String,
    },

    /// A stack file could not be read or parsed
    #[error("stack file error [{path}]: {message}")]
    StackFile {
        /// Path of the stack file
        path: String,
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

fn bound_or<'a>(bound: &'a Option<String>, unbounded: &'a str) -> &'a str {
    bound.as_deref().unwrap_or(unbounded)
}

impl Error {
    /// Create a missing-configuration error for `key`
    pub fn missing(key: impl Into<String>) -> Self {
        Self::ConfigurationMissing { key: key.into() }
    }

    /// Create an invalid-configuration error
    pub fn invalid(key: impl Into<String>, value: impl Into<String>, reason: InvalidReason) -> Self {
        Self::ConfigurationInvalid {
            key: key.into(),
            value: value.into(),
            reason,
        }
    }

    /// Create an out-of-range error from the offending value and its bounds
    pub fn out_of_range<T: fmt::Display>(
        key: impl Into<String>,
        value: T,
        minimum: Option<T>,
        maximum: Option<T>,
    ) -> Self {
        Self::ConfigurationOutOfRange {
            key: key.into(),
            value: value.to_string(),
            minimum: minimum.map(|m| m.to_string()),
            maximum: maximum.map(|m| m.to_string()),
        }
    }

    /// Create an invalid-argument error
    pub fn argument(argument: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ArgumentInvalid {
            argument: argument.into(),
            message: msg.into(),
        }
    }

    /// Create a decode error with context
    pub fn decode(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Create a provisioning error for a named resource
    pub fn provisioning(resource: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provisioning {
            resource: resource.into(),
            message: msg.into(),
        }
    }

    /// Create a duplicate-resource error
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateResource { name: name.into() }
    }

    /// Create a stack file error
    pub fn stack_file(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StackFile {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Whether this error stems from configuration (missing, invalid or out of range)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigurationMissing { .. }
                | Error::ConfigurationInvalid { .. }
                | Error::ConfigurationOutOfRange { .. }
        )
    }

    /// Check if this error is retryable
    ///
    /// Configuration, argument, decode and serialization errors need a fix to
    /// the inputs. Only engine-side provisioning failures may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ConfigurationMissing { .. }
            | Error::ConfigurationInvalid { .. }
            | Error::ConfigurationOutOfRange { .. }
            | Error::ArgumentInvalid { .. }
            | Error::Decode { .. }
            | Error::DuplicateResource { .. }
            | Error::StackFile { .. }
            | Error::Serialization { .. } => false,
            Error::Provisioning { .. } => true,
        }
    }

    /// Get the configuration key if this error is about one
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::ConfigurationMissing { key }
            | Error::ConfigurationInvalid { key, .. }
            | Error::ConfigurationOutOfRange { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Configuration errors stop a deployment run
    // ==========================================================================

    /// Story: an operator forgets a key in the stack file
    ///
    /// The error names the key so the fix is obvious.
    #[test]
    fn story_missing_key_names_the_key() {
        let err = Error::missing("KubernetesUserNodesVmSize");
        assert_eq!(err.key(), Some("KubernetesUserNodesVmSize"));
        assert!(err.to_string().contains("KubernetesUserNodesVmSize"));
        assert!(err.is_configuration());
        assert!(!err.is_retryable());
    }

    /// Story: out-of-range messages show both inclusive bounds
    #[test]
    fn story_out_of_range_shows_bounds() {
        let err = Error::out_of_range("KubernetesSystemNodesMaximumPods", 251, Some(1), Some(250));
        let msg = err.to_string();
        assert!(msg.contains("'251'"));
        assert!(msg.contains("between 1 and 250"));

        let err = Error::out_of_range("KubernetesSystemNodesOsDiskSizeGB", 0, Some(1), None);
        assert!(err.to_string().contains("between 1 and +inf"));
    }

    #[test]
    fn invalid_reason_is_rendered() {
        let err = Error::invalid("ContainerCpu", "abc", InvalidReason::NotANumber);
        assert!(err.to_string().contains("not a number"));

        let err = Error::invalid(
            "KubernetesUserNodesMaximumSurge",
            "ten",
            InvalidReason::PatternMismatch {
                pattern: r"^(\d+)(\%?)$".to_string(),
            },
        );
        assert!(err.to_string().contains("pattern mismatch"));

        let err = Error::invalid("KubernetesUpgradeChannel", "stable", InvalidReason::NotRecognized);
        assert!(err.to_string().contains("not recognized"));
    }

    #[test]
    fn only_provisioning_errors_are_retryable() {
        assert!(Error::provisioning("kubernetes-", "throttled").is_retryable());
        assert!(!Error::argument("location", "cannot be empty").is_retryable());
        assert!(!Error::decode("kubeconfig", "bad base64").is_retryable());
        assert!(!Error::duplicate("user1").is_retryable());
        assert!(!Error::serialization("bad json").is_retryable());
    }

    #[test]
    fn non_configuration_errors_have_no_key() {
        assert_eq!(Error::argument("name", "cannot be empty").key(), None);
        assert_eq!(Error::provisioning("kubernetes-", "boom").key(), None);
    }

    #[test]
    fn serialization_for_kind_keeps_kind() {
        match Error::serialization_for_kind("ManagedCluster", "missing field") {
            Error::Serialization { kind, .. } => assert_eq!(kind.as_deref(), Some("ManagedCluster")),
            other => panic!("Expected Serialization variant, got {other:?}"),
        }
    }
}
