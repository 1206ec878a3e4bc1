//! Per-provider extraction of a normalized `{username, email}` identity.
//!
//! Dispatch is a closed match on the provider name: providers with a dedicated rule get it,
//! every other provider falls back to [`IdentityRule::Default`]. Extraction either yields a
//! complete identity or fails; partial identities are never produced.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ProviderDescriptor, ProviderKind},
};

const KOBOCAT: &str = ProviderKind::Kobocat.name();
const KOBOCAT_USER_INFO_PATH: &str = "api/v1/user";
const DEFAULT_USERNAME_FIELDS: [&str; 3] = ["username", "preferred_username", "screen_name"];

/// Opaque JSON payload returned by a provider's token or user-info endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawIdentityResponse(JsonValue);
impl RawIdentityResponse {
	/// Wraps an already-parsed payload.
	pub fn new(value: JsonValue) -> Self {
		Self(value)
	}

	/// Parses a payload from raw bytes.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(bytes).map(Self)
	}

	/// Borrows the underlying JSON value.
	pub fn as_json(&self) -> &JsonValue {
		&self.0
	}
}
impl From<JsonValue> for RawIdentityResponse {
	fn from(value: JsonValue) -> Self {
		Self(value)
	}
}

/// Provider-agnostic identity handed to the session layer after a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedIdentity {
	/// Application username.
	pub username: String,
	/// Contact e-mail; drives allow-list checks.
	pub email: String,
}

/// Errors raised when a payload does not satisfy the provider's extraction rule.
#[derive(Debug, ThisError)]
pub enum IdentityExtractionError {
	/// The payload is not a JSON object.
	#[error("Identity payload from `{provider}` is not a JSON object.")]
	NotAnObject {
		/// Provider that produced the payload.
		provider: ProviderId,
	},
	/// A required field is absent, empty, or not a string.
	#[error("Identity payload from `{provider}` lacks the `{field}` field.")]
	MissingField {
		/// Provider that produced the payload.
		provider: ProviderId,
		/// Field the rule expected.
		field: &'static str,
	},
	/// The payload does not match the provider's typed schema.
	#[error("Identity payload from `{provider}` is malformed: {source}.")]
	Malformed {
		/// Provider that produced the payload.
		provider: ProviderId,
		/// Structured failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Extraction strategy selected for a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityRule {
	/// Conventional payload: `email`, plus `username`/`preferred_username`/`screen_name`, or
	/// `<provider>_<id>` as a last resort.
	Default,
	/// Kobocat's `api/v1/user` payload with mandatory `username` and `email`.
	Kobocat,
}
impl IdentityRule {
	/// Picks the rule for `descriptor` by provider name.
	pub fn for_provider(descriptor: &ProviderDescriptor) -> Self {
		match descriptor.name() {
			KOBOCAT => IdentityRule::Kobocat,
			_ => IdentityRule::Default,
		}
	}

	/// Endpoint path, relative to the provider API base, that this rule overrides.
	pub fn user_info_path(self) -> Option<&'static str> {
		match self {
			IdentityRule::Default => None,
			IdentityRule::Kobocat => Some(KOBOCAT_USER_INFO_PATH),
		}
	}

	/// Applies the rule to `raw` on behalf of `provider`.
	pub fn apply(
		self,
		provider: &ProviderId,
		raw: &RawIdentityResponse,
	) -> Result<NormalizedIdentity, IdentityExtractionError> {
		match self {
			IdentityRule::Default => extract_default(provider, raw),
			IdentityRule::Kobocat => extract_kobocat(provider, raw),
		}
	}
}

/// Normalizes `raw` using the rule registered for `provider`.
pub fn extract(
	provider: &ProviderDescriptor,
	raw: &RawIdentityResponse,
) -> Result<NormalizedIdentity, IdentityExtractionError> {
	#[cfg(feature = "tracing")]
	tracing::debug!(provider = provider.name(), "extracting oauth user info");

	IdentityRule::for_provider(provider).apply(&provider.id, raw)
}

#[derive(Deserialize)]
struct KobocatUser {
	username: String,
	email: String,
}

fn extract_kobocat(
	provider: &ProviderId,
	raw: &RawIdentityResponse,
) -> Result<NormalizedIdentity, IdentityExtractionError> {
	if !raw.as_json().is_object() {
		return Err(IdentityExtractionError::NotAnObject { provider: provider.clone() });
	}

	let user: KobocatUser = serde_path_to_error::deserialize(raw.as_json()).map_err(|source| {
		IdentityExtractionError::Malformed { provider: provider.clone(), source }
	})?;
	let username = non_blank(user.username).ok_or_else(|| IdentityExtractionError::MissingField {
		provider: provider.clone(),
		field: "username",
	})?;
	let email = non_blank(user.email).ok_or_else(|| IdentityExtractionError::MissingField {
		provider: provider.clone(),
		field: "email",
	})?;

	Ok(NormalizedIdentity { username, email })
}

fn extract_default(
	provider: &ProviderId,
	raw: &RawIdentityResponse,
) -> Result<NormalizedIdentity, IdentityExtractionError> {
	let object = raw
		.as_json()
		.as_object()
		.ok_or_else(|| IdentityExtractionError::NotAnObject { provider: provider.clone() })?;
	let email = string_field(object, "email").ok_or_else(|| {
		IdentityExtractionError::MissingField { provider: provider.clone(), field: "email" }
	})?;
	let username = DEFAULT_USERNAME_FIELDS
		.iter()
		.find_map(|field| string_field(object, field))
		.or_else(|| id_field(object).map(|id| format!("{provider}_{id}")))
		.ok_or_else(|| IdentityExtractionError::MissingField {
			provider: provider.clone(),
			field: "username",
		})?;

	Ok(NormalizedIdentity { username, email })
}

fn string_field(object: &serde_json::Map<String, JsonValue>, field: &str) -> Option<String> {
	object.get(field).and_then(JsonValue::as_str).and_then(|v| non_blank(v.to_owned()))
}

fn id_field(object: &serde_json::Map<String, JsonValue>) -> Option<String> {
	match object.get("id")? {
		JsonValue::String(id) => non_blank(id.clone()),
		JsonValue::Number(id) => Some(id.to_string()),
		_ => None,
	}
}

fn non_blank(value: String) -> Option<String> {
	let trimmed = value.trim();

	if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}
