//! Crate-level error types shared across configuration, login, task routing, and caches.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Startup configuration problem; must abort the process.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A provider payload could not be normalized into an identity.
	#[error(transparent)]
	IdentityExtraction(#[from] crate::provider::IdentityExtractionError),
	/// A login attempt was driven out of order or cannot start.
	#[error(transparent)]
	Login(#[from] crate::auth::LoginError),
	/// A task payload was refused before reaching a worker.
	#[error(transparent)]
	TaskRejected(#[from] crate::task::TaskRejectedError),
	/// Results cache backend failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Transport failure while talking to a provider.
	#[cfg(feature = "reqwest")]
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Fatal configuration failures raised while resolving startup settings.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A mandatory setting is absent or empty.
	#[error("{key} must be set in the environment.")]
	MissingSetting {
		/// Environment key that was expected.
		key: String,
	},
	/// A provider's client identifier is present but another required field is not.
	#[error("Provider `{provider}` is partially configured: {key} is missing.")]
	IncompleteProvider {
		/// Provider name.
		provider: &'static str,
		/// Missing environment key.
		key: String,
	},
	/// A URL setting could not be parsed.
	#[error("Setting {key} is not a valid URL.")]
	InvalidUrl {
		/// Setting that failed to parse.
		key: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A numeric setting could not be parsed.
	#[error("Setting {key} is not a valid number: {value}.")]
	InvalidNumber {
		/// Setting that failed to parse.
		key: String,
		/// Offending raw value.
		value: String,
	},
	/// A boolean setting could not be parsed.
	#[error("Setting {key} is not a valid boolean: {value}.")]
	InvalidBool {
		/// Setting that failed to parse.
		key: String,
		/// Offending raw value.
		value: String,
	},
	/// An identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Two providers share the same name.
	#[error("Provider `{name}` is registered more than once.")]
	DuplicateProvider {
		/// Conflicting provider name.
		name: String,
	},
	/// A rate-limit annotation is malformed.
	#[error(transparent)]
	InvalidRateLimit(#[from] crate::task::RateLimitParseError),
	/// Task and result serializers or accepted content types disagree.
	#[error(
		"Task envelope is inconsistent: task serializer `{task}`, result serializer `{result}`, accepted content {accept:?}."
	)]
	SerializerMismatch {
		/// Task serializer name.
		task: String,
		/// Result serializer name.
		result: String,
		/// Accepted content types.
		accept: Vec<String>,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// OAuth client could not be assembled from a descriptor.
	#[error("Descriptor contains an invalid OAuth endpoint.")]
	InvalidOAuthEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
}

/// Transport-level failures (network, status, decode) while calling provider endpoints.
#[cfg(feature = "reqwest")]
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the user-info endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: ReqwestError,
	},
	/// Provider answered with a non-success status.
	#[error("User-info endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// Provider answered with a body that is not JSON.
	#[error("User-info endpoint returned malformed JSON.")]
	Decode {
		/// Underlying decoding failure.
		#[source]
		source: serde_json::Error,
	},
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::Network { source: e }
	}
}
