// self
use crate::_prelude::*;

/// Statically declared endpoints for providers that do not need a configured base URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticEndpoints {
	/// Authorization (user redirect) endpoint.
	pub authorization: &'static str,
	/// Access-token exchange endpoint.
	pub access_token: &'static str,
	/// Base URL for provider API calls.
	pub api_base: &'static str,
	/// Request-token endpoint, present only for OAuth 1.0a providers.
	pub request_token: Option<&'static str>,
}

/// Closed set of provider kinds the registry knows how to configure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// Twitter (OAuth 1.0a).
	Twitter,
	/// Google (OAuth 2.0).
	Google,
	/// KoBoToolbox's Kobocat; endpoints hang off a deployment-specific base URL.
	Kobocat,
}
impl ProviderKind {
	/// Every kind, in registration order.
	pub const ALL: [ProviderKind; 3] =
		[ProviderKind::Twitter, ProviderKind::Google, ProviderKind::Kobocat];

	/// Provider name used as the registry key and in redirect paths.
	pub const fn name(self) -> &'static str {
		match self {
			ProviderKind::Twitter => "twitter",
			ProviderKind::Google => "google",
			ProviderKind::Kobocat => "kobocat",
		}
	}

	/// Icon reference shown on the login page.
	pub const fn icon(self) -> &'static str {
		match self {
			ProviderKind::Twitter => "fa-twitter",
			ProviderKind::Google => "fa-google",
			ProviderKind::Kobocat => "fa-user",
		}
	}

	/// Prefix of the environment keys carrying this provider's credentials.
	pub const fn env_prefix(self) -> &'static str {
		match self {
			ProviderKind::Twitter => "TWITTER",
			ProviderKind::Google => "GOOGLE",
			ProviderKind::Kobocat => "KOBOCAT",
		}
	}

	/// Whether the endpoints are derived from an externally configured base URL.
	pub const fn requires_base_url(self) -> bool {
		matches!(self, ProviderKind::Kobocat)
	}

	/// Static endpoints, when the provider declares them.
	pub const fn static_endpoints(self) -> Option<StaticEndpoints> {
		match self {
			ProviderKind::Twitter => Some(StaticEndpoints {
				authorization: "https://api.twitter.com/oauth/authenticate",
				access_token: "https://api.twitter.com/oauth/access_token",
				api_base: "https://api.twitter.com/1.1/",
				request_token: Some("https://api.twitter.com/oauth/request_token"),
			}),
			ProviderKind::Google => Some(StaticEndpoints {
				authorization: "https://accounts.google.com/o/oauth2/auth",
				access_token: "https://accounts.google.com/o/oauth2/token",
				api_base: "https://www.googleapis.com/oauth2/v1/",
				request_token: None,
			}),
			ProviderKind::Kobocat => None,
		}
	}

	/// Field of the token response that carries the access token.
	pub const fn default_token_key(self) -> Option<&'static str> {
		match self {
			ProviderKind::Twitter => None,
			ProviderKind::Google | ProviderKind::Kobocat => Some("access_token"),
		}
	}

	/// Scope requested on the authorization redirect.
	pub const fn default_request_scope(self) -> Option<&'static str> {
		match self {
			ProviderKind::Google => Some("https://www.googleapis.com/auth/userinfo.email"),
			ProviderKind::Twitter | ProviderKind::Kobocat => None,
		}
	}

	/// E-mail domains accepted when no allow-list is configured.
	pub const fn default_email_allow_list(self) -> &'static [&'static str] {
		match self {
			ProviderKind::Google => &["@kimetrica.com"],
			ProviderKind::Twitter | ProviderKind::Kobocat => &[],
		}
	}

	/// User-info path, relative to the API base, read by the default identity rule.
	pub const fn default_user_info_path(self) -> &'static str {
		match self {
			ProviderKind::Twitter => "account/verify_credentials.json",
			ProviderKind::Google => "userinfo",
			ProviderKind::Kobocat => "api/v1/user",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.name())
	}
}
