// self
use crate::{
	_prelude::*,
	auth::{ProviderId, Secret},
	provider::{EmailAllowList, ProviderDescriptor, ProviderEndpoints, ProviderKind},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Client identifier is mandatory.
	#[error("Provider `{provider}` is missing a client identifier.")]
	MissingClientId {
		/// Provider name.
		provider: String,
	},
	/// Client secret is mandatory.
	#[error("Provider `{provider}` is missing a client secret.")]
	MissingClientSecret {
		/// Provider name.
		provider: String,
	},
	/// Kind derives endpoints from a base URL that was not supplied.
	#[error("Provider `{provider}` requires a base URL.")]
	MissingBaseUrl {
		/// Provider name.
		provider: String,
	},
	/// A derived or static endpoint failed to parse.
	#[error("The {endpoint} endpoint of provider `{provider}` is invalid.")]
	InvalidEndpoint {
		/// Provider name.
		provider: String,
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Builder for [`ProviderDescriptor`] values.
///
/// Kind defaults (icon, token key, request scope, static endpoints) are applied in
/// [`build`](Self::build) unless overridden.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Provider kind supplying defaults.
	pub kind: ProviderKind,
	/// Icon override.
	pub icon: Option<String>,
	/// Client identifier.
	pub client_id: Option<String>,
	/// Client secret.
	pub client_secret: Option<Secret>,
	/// Base URL for kinds that derive their endpoints from one.
	pub base_url: Option<Url>,
	/// Explicit endpoints; replaces derived or static endpoints entirely.
	pub endpoints: Option<ProviderEndpoints>,
	/// Accepted e-mail domains.
	pub email_allow_list: Option<EmailAllowList>,
	/// Token response field carrying the access token.
	pub token_key: Option<String>,
	/// Scope requested on the authorization redirect.
	pub request_scope: Option<String>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier and the kind's defaults.
	pub fn new(id: ProviderId, kind: ProviderKind) -> Self {
		Self {
			id,
			kind,
			icon: None,
			client_id: None,
			client_secret: None,
			base_url: None,
			endpoints: None,
			email_allow_list: Some(EmailAllowList::new(kind.default_email_allow_list()))
				.filter(|list| !list.is_empty()),
			token_key: kind.default_token_key().map(Into::into),
			request_scope: kind.default_request_scope().map(Into::into),
		}
	}

	/// Overrides the icon reference.
	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(Secret::new(secret));

		self
	}

	/// Sets the base URL used to derive endpoints.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Replaces every endpoint with the provided set.
	pub fn endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
		self.endpoints = Some(endpoints);

		self
	}

	/// Restricts logins to the listed e-mail domains; an empty list leaves logins unrestricted.
	pub fn email_allow_list(mut self, list: EmailAllowList) -> Self {
		self.email_allow_list = if list.is_empty() { None } else { Some(list) };

		self
	}

	/// Overrides the token response field name.
	pub fn token_key(mut self, token_key: Option<String>) -> Self {
		self.token_key = token_key;

		self
	}

	/// Overrides the requested scope.
	pub fn request_scope(mut self, scope: Option<String>) -> Self {
		self.request_scope = scope;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let provider = self.id.to_string();
		let client_id = self
			.client_id
			.filter(|v| !v.trim().is_empty())
			.ok_or_else(|| ProviderDescriptorError::MissingClientId { provider: provider.clone() })?;
		let client_secret = self
			.client_secret
			.filter(|v| !v.expose().trim().is_empty())
			.ok_or_else(|| ProviderDescriptorError::MissingClientSecret {
				provider: provider.clone(),
			})?;
		let endpoints = match self.endpoints {
			Some(endpoints) => endpoints,
			None => resolve_endpoints(&provider, self.kind, self.base_url.as_ref())?,
		};

		Ok(ProviderDescriptor {
			id: self.id,
			kind: self.kind,
			icon: self.icon.unwrap_or_else(|| self.kind.icon().into()),
			endpoints,
			client_id,
			client_secret,
			email_allow_list: self.email_allow_list,
			token_key: self.token_key,
			request_scope: self.request_scope,
		})
	}
}

fn resolve_endpoints(
	provider: &str,
	kind: ProviderKind,
	base_url: Option<&Url>,
) -> Result<ProviderEndpoints, ProviderDescriptorError> {
	let parse = |endpoint: &'static str, raw: &str| {
		Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidEndpoint {
			provider: provider.to_owned(),
			endpoint,
			source,
		})
	};

	if kind.requires_base_url() {
		let base = base_url
			.ok_or_else(|| ProviderDescriptorError::MissingBaseUrl { provider: provider.into() })?;
		let root = base.as_str().trim_end_matches('/');

		return Ok(ProviderEndpoints {
			authorization: parse("authorization", &format!("{root}/o/authorize/"))?,
			access_token: parse("access_token", &format!("{root}/o/token/"))?,
			api_base: parse("api_base", &format!("{root}/"))?,
			request_token: None,
		});
	}

	let Some(declared) = kind.static_endpoints() else {
		return Err(ProviderDescriptorError::MissingBaseUrl { provider: provider.into() });
	};

	Ok(ProviderEndpoints {
		authorization: parse("authorization", declared.authorization)?,
		access_token: parse("access_token", declared.access_token)?,
		api_base: parse("api_base", declared.api_base)?,
		request_token: declared
			.request_token
			.map(|raw| parse("request_token", raw))
			.transpose()?,
	})
}
