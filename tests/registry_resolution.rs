// self
use superset_config::{
	_preludet::*,
	auth::{AuthMode, AuthSettings},
	error::ConfigError,
	provider::{ProviderKind, ProviderRegistry},
};

#[test]
fn no_provider_credentials_selects_database_login() {
	let registry =
		ProviderRegistry::resolve(&base_credentials()).expect("Empty registry should resolve.");

	assert!(registry.is_empty());
	assert_eq!(AuthMode::select(&registry), AuthMode::DatabaseCredential);
}

#[test]
fn google_credentials_register_a_single_federated_provider() {
	let source = base_credentials()
		.with("GOOGLE_OAUTH_CONSUMER_KEY", "google-id")
		.with("GOOGLE_OAUTH_CONSUMER_SECRET", "google-secret");
	let registry = ProviderRegistry::resolve(&source).expect("Google provider should resolve.");
	let google = registry.get("google").expect("Google descriptor should be registered.");

	assert_eq!(registry.names().collect::<Vec<_>>(), vec!["google"]);
	assert_eq!(google.kind, ProviderKind::Google);
	assert_eq!(google.client_id, "google-id");
	assert_eq!(google.client_secret.expose(), "google-secret");
	assert!(google.is_oauth2());
	assert!(
		google.email_allow_list.as_ref().is_some_and(|list| list.permits("ada@kimetrica.com")
			&& !list.permits("ada@gmail.com"))
	);
	assert_eq!(
		AuthSettings::from_source(&registry, &source)
			.expect("Auth settings should resolve.")
			.mode,
		AuthMode::Federated
	);
}

#[test]
fn email_domains_setting_replaces_the_google_default() {
	let source = base_credentials()
		.with("GOOGLE_OAUTH_CONSUMER_KEY", "google-id")
		.with("GOOGLE_OAUTH_CONSUMER_SECRET", "google-secret")
		.with("GOOGLE_OAUTH_EMAIL_DOMAINS", "example.com, @example.org");
	let registry = ProviderRegistry::resolve(&source).expect("Google provider should resolve.");
	let list = registry
		.get("google")
		.and_then(|google| google.email_allow_list.as_ref())
		.expect("Google should carry the configured allow-list.");

	assert_eq!(list.iter().collect::<Vec<_>>(), vec!["@example.com", "@example.org"]);
	assert!(!list.permits("ada@kimetrica.com"));
}

#[test]
fn resolution_is_idempotent() {
	let source = base_credentials()
		.with("TWITTER_OAUTH_CONSUMER_KEY", "tw-id")
		.with("TWITTER_OAUTH_CONSUMER_SECRET", "tw-secret")
		.with("KOBOCAT_OAUTH_CONSUMER_KEY", "kc-id")
		.with("KOBOCAT_OAUTH_CONSUMER_SECRET", "kc-secret")
		.with("KOBOCAT_BASE_URL", "https://kc.example.org");
	let first = ProviderRegistry::resolve(&source).expect("Registry should resolve.");
	let second = ProviderRegistry::resolve(&source).expect("Registry should resolve again.");

	assert_eq!(first, second);
	assert_eq!(first.len(), 2);
}

#[test]
fn kobocat_without_base_url_aborts_startup() {
	let source = base_credentials()
		.with("KOBOCAT_OAUTH_CONSUMER_KEY", "kc-id")
		.with("KOBOCAT_OAUTH_CONSUMER_SECRET", "kc-secret");
	let err = ProviderRegistry::resolve(&source).expect_err("Partial Kobocat config must fail.");

	assert!(matches!(
		err,
		ConfigError::IncompleteProvider { provider: "kobocat", ref key } if key == "KOBOCAT_BASE_URL"
	));
}

#[test]
fn consumer_key_without_secret_aborts_startup() {
	let source = base_credentials().with("GOOGLE_OAUTH_CONSUMER_KEY", "google-id");

	assert!(matches!(
		ProviderRegistry::resolve(&source),
		Err(ConfigError::IncompleteProvider { provider: "google", .. })
	));
}

#[test]
fn duplicate_registration_is_refused() {
	let mut registry = ProviderRegistry::default();

	registry
		.insert(fixture_descriptor(ProviderKind::Google))
		.expect("First insert should succeed.");

	assert!(matches!(
		registry.insert(fixture_descriptor(ProviderKind::Google)),
		Err(ConfigError::DuplicateProvider { .. })
	));
}
