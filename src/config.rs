//! Immutable startup settings resolved once from an injected [`CredentialSource`].
//!
//! Resolution is fail-fast: a missing mandatory setting or a partially configured provider
//! aborts startup with a [`ConfigError`] instead of degrading silently.

pub mod source;

pub use source::*;

// self
use crate::{
	_prelude::*,
	auth::{AuthSettings, Secret},
	cache::{CacheNamespace, CacheSettings, RedisLocation},
	error::ConfigError,
	provider::ProviderRegistry,
	task::TaskRoutingConfig,
};

const DEFAULT_REDIS_HOST: &str = "redis";

/// Everything the server needs at startup, passed by reference to components.
#[derive(Clone, Debug)]
pub struct Settings {
	/// Session signing key.
	pub secret_key: Secret,
	/// Metadata database connection string.
	pub database_uri: Secret,
	/// Registered federation providers.
	pub providers: ProviderRegistry,
	/// Authentication mode and registration knobs.
	pub auth: AuthSettings,
	/// General application cache.
	pub cache: CacheSettings,
	/// Cache for table-name listings.
	pub table_names_cache: CacheSettings,
	/// Backend holding finished asynchronous query results.
	pub results_backend: CacheSettings,
	/// Task-queue topology.
	pub tasks: TaskRoutingConfig,
	/// Maximum rows a query returns by default.
	pub row_limit: u32,
	/// Trust `X-Forwarded-*` headers from a reverse proxy.
	pub enable_proxy_fix: bool,
	/// Map tile API key; empty disables map visualizations.
	pub mapbox_api_key: Secret,
	/// Silence framework warnings at startup.
	pub silence_fab: bool,
}
impl Settings {
	/// Default `row_limit`.
	pub const DEFAULT_ROW_LIMIT: u32 = 5000;

	/// Resolves every setting from `source`.
	pub fn from_source(source: &dyn CredentialSource) -> Result<Self, ConfigError> {
		let secret_key = required(source, "SECRET_KEY")?;
		let database_uri = required(source, "SQLALCHEMY_DATABASE_URI")?;
		let providers = ProviderRegistry::resolve(source)?;
		let auth = AuthSettings::from_source(&providers, source)?;
		let cache_location =
			RedisLocation::from_source(source, "CACHE_REDIS", DEFAULT_REDIS_HOST, 2)?;
		let cache = CacheSettings {
			location: cache_location.clone(),
			namespace: CacheNamespace::new("superset"),
		};
		let table_names_cache = CacheSettings {
			location: cache_location,
			namespace: CacheNamespace::new("superset_tables"),
		};
		let results_backend = CacheSettings {
			location: RedisLocation::from_source(source, "RESULTS_REDIS", DEFAULT_REDIS_HOST, 0)?,
			namespace: CacheNamespace::new("superset_results"),
		};
		let tasks = TaskRoutingConfig::from_source(source)?;
		let settings = Self {
			secret_key,
			database_uri,
			providers,
			auth,
			cache,
			table_names_cache,
			results_backend,
			tasks,
			row_limit: parse_number(source, "ROW_LIMIT", Self::DEFAULT_ROW_LIMIT)?,
			enable_proxy_fix: parse_bool(source, "ENABLE_PROXY_FIX", true)?,
			mapbox_api_key: Secret::new(source.get("MAPBOX_API_KEY").unwrap_or_default()),
			silence_fab: parse_bool(source, "SILENCE_FAB", false)?,
		};

		#[cfg(feature = "tracing")]
		tracing::info!(
			auth_mode = %settings.auth.mode,
			providers = settings.providers.len(),
			broker = %settings.tasks.broker_url,
			"resolved startup settings"
		);

		Ok(settings)
	}
}

fn required(source: &dyn CredentialSource, key: &str) -> Result<Secret, ConfigError> {
	source
		.non_empty(key)
		.map(Secret::new)
		.ok_or_else(|| ConfigError::MissingSetting { key: key.into() })
}

/// Parses `key` as a number, falling back to `default` when unset.
pub(crate) fn parse_number<T>(
	source: &dyn CredentialSource,
	key: &str,
	default: T,
) -> Result<T, ConfigError>
where
	T: FromStr,
{
	match source.non_empty(key) {
		Some(raw) => raw
			.trim()
			.parse()
			.map_err(|_| ConfigError::InvalidNumber { key: key.into(), value: raw }),
		None => Ok(default),
	}
}

/// Parses `key` as a boolean (`true`/`false`/`1`/`0`/`yes`/`no`), falling back to `default`.
pub(crate) fn parse_bool(
	source: &dyn CredentialSource,
	key: &str,
	default: bool,
) -> Result<bool, ConfigError> {
	let Some(raw) = source.non_empty(key) else {
		return Ok(default);
	};

	match raw.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidBool { key: key.into(), value: raw }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::base_credentials, auth::AuthMode};

	#[test]
	fn defaults_resolve_with_mandatory_settings_only() {
		let settings =
			Settings::from_source(&base_credentials()).expect("Base credentials should resolve.");

		assert_eq!(settings.auth.mode, AuthMode::DatabaseCredential);
		assert_eq!(settings.cache.namespace.key_prefix, "superset");
		assert_eq!(settings.cache.location.db, 2);
		assert_eq!(settings.table_names_cache.namespace.key_prefix, "superset_tables");
		assert_eq!(settings.results_backend.namespace.key_prefix, "superset_results");
		assert_eq!(settings.results_backend.location.port, RedisLocation::DEFAULT_PORT);
		assert_eq!(settings.row_limit, 5000);
		assert!(settings.enable_proxy_fix);
		assert!(!settings.silence_fab);
		assert!(settings.mapbox_api_key.expose().is_empty());
	}

	#[test]
	fn empty_mandatory_setting_counts_as_missing() {
		let source = base_credentials().with("SECRET_KEY", "   ");
		let err = Settings::from_source(&source).expect_err("Blank secret key must fail.");

		assert!(matches!(err, ConfigError::MissingSetting { ref key } if key == "SECRET_KEY"));
	}

	#[test]
	fn secrets_are_redacted_in_debug_output() {
		let settings =
			Settings::from_source(&base_credentials()).expect("Base credentials should resolve.");
		let rendered = format!("{settings:?}");

		assert!(!rendered.contains("test-secret-key"));
		assert!(!rendered.contains("superset:superset@db"));
	}

	#[test]
	fn bool_parser_accepts_common_spellings() {
		let source = MapCredentialSource::from_iter([("A", "Yes"), ("B", "0"), ("C", "sure")]);

		assert!(parse_bool(&source, "A", false).expect("`Yes` should parse."));
		assert!(!parse_bool(&source, "B", true).expect("`0` should parse."));
		assert!(parse_bool(&source, "MISSING", true).expect("Default should apply."));
		assert!(matches!(parse_bool(&source, "C", true), Err(ConfigError::InvalidBool { .. })));
	}
}
