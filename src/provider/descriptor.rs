//! Provider descriptor data structures shared by the registry, login attempts, and the user-info
//! client.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Closed set of supported provider kinds and their static metadata.
pub mod kind;

pub use builder::*;
pub use kind::*;

// crates.io
use oauth2::{
	AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, TokenUrl, basic::BasicClient,
};
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, Secret},
	error::ConfigError,
	provider::IdentityRule,
};

/// OAuth client pre-configured with a descriptor's authorize and token endpoints.
pub type ProviderOAuthClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the user is redirected to.
	pub authorization: Url,
	/// Access-token exchange endpoint.
	pub access_token: Url,
	/// Base URL for API calls such as user-info lookups. Always ends with `/`.
	pub api_base: Url,
	/// Request-token endpoint; only OAuth 1.0a providers declare one.
	pub request_token: Option<Url>,
}

/// Case-insensitive set of accepted e-mail domain suffixes (e.g. `@example.com`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAllowList(BTreeSet<String>);
impl EmailAllowList {
	/// Builds a list from raw entries; entries are trimmed, lower-cased, and prefixed with `@`.
	pub fn new<I, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let normalized = entries
			.into_iter()
			.filter_map(|entry| {
				let entry = entry.as_ref().trim().to_ascii_lowercase();

				match entry.as_str() {
					"" | "@" => None,
					e if e.starts_with('@') => Some(entry),
					e => Some(format!("@{e}")),
				}
			})
			.collect();

		Self(normalized)
	}

	/// Parses a comma-separated list such as `@example.com, example.org`.
	pub fn parse(raw: &str) -> Self {
		Self::new(raw.split(','))
	}

	/// Returns true when `email` ends with one of the accepted domains.
	pub fn permits(&self, email: &str) -> bool {
		let email = email.trim().to_ascii_lowercase();

		self.0.iter().any(|domain| email.len() > domain.len() && email.ends_with(domain.as_str()))
	}

	/// Returns true when no domain is listed.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates the normalized domain entries.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

/// Immutable description of a configured federation provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Provider name; unique within a registry.
	pub id: ProviderId,
	/// Provider kind that determined the defaults below.
	pub kind: ProviderKind,
	/// Icon reference shown on the login page.
	pub icon: String,
	/// Token-exchange and API endpoints.
	pub endpoints: ProviderEndpoints,
	/// OAuth consumer key / client identifier.
	pub client_id: String,
	/// OAuth consumer secret.
	pub client_secret: Secret,
	/// Accepted e-mail domains; `None` admits every domain.
	pub email_allow_list: Option<EmailAllowList>,
	/// Token response field carrying the access token, when fixed.
	pub token_key: Option<String>,
	/// Scope requested on the authorization redirect.
	pub request_scope: Option<String>,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier and kind.
	pub fn builder(id: ProviderId, kind: ProviderKind) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id, kind)
	}

	/// Provider name.
	pub fn name(&self) -> &str {
		&self.id
	}

	/// Returns true for OAuth 2.0 providers (no request-token leg).
	pub fn is_oauth2(&self) -> bool {
		self.endpoints.request_token.is_none()
	}

	/// URL the identity rule for this provider reads the user payload from.
	pub fn user_info_url(&self) -> Result<Url, ConfigError> {
		let path = IdentityRule::for_provider(self)
			.user_info_path()
			.unwrap_or(self.kind.default_user_info_path());

		self.endpoints.api_base.join(path).map_err(|source| ConfigError::InvalidUrl {
			key: format!("{} user-info path", self.id),
			source,
		})
	}

	/// Builds an OAuth 2.0 client for the external token-exchange collaborator.
	pub fn oauth_client(&self) -> Result<ProviderOAuthClient, ConfigError> {
		let auth_url = AuthUrl::new(self.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidOAuthEndpoint { source })?;
		let token_url = TokenUrl::new(self.endpoints.access_token.to_string())
			.map_err(|source| ConfigError::InvalidOAuthEndpoint { source })?;

		Ok(BasicClient::new(ClientId::new(self.client_id.clone()))
			.set_client_secret(ClientSecret::new(self.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::fixture_descriptor;

	#[test]
	fn oauth_client_mirrors_descriptor_endpoints() {
		let descriptor = fixture_descriptor(ProviderKind::Kobocat);
		let client = descriptor.oauth_client().expect("Fixture endpoints should be valid.");

		assert_eq!(client.client_id().as_str(), "kobocat-client");
		assert_eq!(client.auth_uri().as_str(), "https://kc.example.org/o/authorize/");
		assert_eq!(client.token_uri().as_str(), "https://kc.example.org/o/token/");
		assert!(descriptor.is_oauth2());
		assert!(!fixture_descriptor(ProviderKind::Twitter).is_oauth2());
	}

	#[test]
	fn allow_list_normalizes_entries() {
		let list = EmailAllowList::parse(" @Example.com, example.org ,,@");

		assert_eq!(list.iter().collect::<Vec<_>>(), vec!["@example.com", "@example.org"]);
		assert!(list.permits("a@example.com"));
		assert!(list.permits("B@EXAMPLE.ORG"));
		assert!(!list.permits("a@other.com"));
		assert!(!list.permits("a@notexample.com"));
		assert!(!list.permits("@example.com"));
	}

	#[test]
	fn empty_allow_list_reports_empty() {
		assert!(EmailAllowList::parse(" , ").is_empty());
	}
}
