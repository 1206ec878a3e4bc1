//! Authentication mode selection.

// self
use crate::{
	_prelude::*,
	config::{CredentialSource, parse_bool},
	error::ConfigError,
	provider::ProviderRegistry,
};

const DEFAULT_REGISTRATION_ROLE: &str = "Public";

/// Active authentication mode of the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMode {
	/// Users log in through one of the registered OAuth providers.
	Federated,
	/// Users log in with credentials stored in the application database.
	DatabaseCredential,
}
impl AuthMode {
	/// Federated exactly when at least one provider is registered.
	pub fn select(registry: &ProviderRegistry) -> Self {
		if registry.is_empty() { AuthMode::DatabaseCredential } else { AuthMode::Federated }
	}
}
impl Display for AuthMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			AuthMode::Federated => "oauth",
			AuthMode::DatabaseCredential => "db",
		})
	}
}

/// Authentication settings derived from the registry plus registration knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
	/// Selected mode.
	pub mode: AuthMode,
	/// Whether first-time federated users are registered automatically.
	pub user_registration: bool,
	/// Role granted to self-registered users.
	pub registration_role: String,
}
impl AuthSettings {
	/// Settings with registration enabled for the `Public` role.
	pub fn new(mode: AuthMode) -> Self {
		Self { mode, user_registration: true, registration_role: DEFAULT_REGISTRATION_ROLE.into() }
	}

	/// Selects the mode from `registry` and applies `AUTH_USER_REGISTRATION` and
	/// `AUTH_USER_REGISTRATION_ROLE` overrides.
	pub fn from_source(
		registry: &ProviderRegistry,
		source: &dyn CredentialSource,
	) -> Result<Self, ConfigError> {
		let mut settings = Self::new(AuthMode::select(registry));

		settings.user_registration =
			parse_bool(source, "AUTH_USER_REGISTRATION", settings.user_registration)?;

		if let Some(role) = source.non_empty("AUTH_USER_REGISTRATION_ROLE") {
			settings.registration_role = role.trim().to_owned();
		}

		Ok(settings)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::fixture_descriptor, config::MapCredentialSource, provider::ProviderKind};

	#[test]
	fn empty_registry_selects_database_credentials() {
		let registry = ProviderRegistry::default();

		assert_eq!(AuthMode::select(&registry), AuthMode::DatabaseCredential);
	}

	#[test]
	fn any_provider_selects_federation() {
		let mut registry = ProviderRegistry::default();

		registry
			.insert(fixture_descriptor(ProviderKind::Google))
			.expect("Fixture provider should insert.");

		assert_eq!(AuthMode::select(&registry), AuthMode::Federated);
		assert_eq!(AuthMode::select(&registry).to_string(), "oauth");
	}

	#[test]
	fn registration_knobs_are_overridable() {
		let registry = ProviderRegistry::default();
		let defaults = AuthSettings::from_source(&registry, &MapCredentialSource::default())
			.expect("Defaults should resolve.");

		assert!(defaults.user_registration);
		assert_eq!(defaults.registration_role, "Public");

		let source = MapCredentialSource::from_iter([
			("AUTH_USER_REGISTRATION", "false"),
			("AUTH_USER_REGISTRATION_ROLE", "Gamma"),
		]);
		let settings =
			AuthSettings::from_source(&registry, &source).expect("Overrides should resolve.");

		assert!(!settings.user_registration);
		assert_eq!(settings.registration_role, "Gamma");

		let source = MapCredentialSource::from_iter([("AUTH_USER_REGISTRATION", "maybe")]);

		assert!(matches!(
			AuthSettings::from_source(&registry, &source),
			Err(ConfigError::InvalidBool { .. })
		));
	}
}
