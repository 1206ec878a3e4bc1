//! Demonstrates resolving startup settings, running one Kobocat login against a mock user-info
//! endpoint, and parking a query result in the results cache under its dispatched key.

// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::prelude::*;
use serde_json::json;
// self
use superset_config::{
	auth::{LoginAttempt, LoginOutcome, Secret, TaskName},
	cache::{MemoryCache, ResultsCache},
	config::{MapCredentialSource, Settings},
	http::UserInfoClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/user");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"username":"demo","email":"demo@example.org"}"#);
		})
		.await;
	let source = MapCredentialSource::from_iter([
		("SECRET_KEY", "demo-secret"),
		("SQLALCHEMY_DATABASE_URI", "sqlite:////tmp/superset.db"),
		("KOBOCAT_OAUTH_CONSUMER_KEY", "demo-client"),
		("KOBOCAT_OAUTH_CONSUMER_SECRET", "demo-client-secret"),
		("KOBOCAT_OAUTH_EMAIL_DOMAINS", "example.org"),
	])
	.with("KOBOCAT_BASE_URL", server.base_url());
	let settings = Settings::from_source(&source)?;

	println!(
		"Auth mode: {} with providers {:?}.",
		settings.auth.mode,
		settings.providers.names().collect::<Vec<_>>()
	);

	let kobocat =
		settings.providers.get("kobocat").ok_or_else(|| eyre!("kobocat is not registered"))?;
	let raw = UserInfoClient::default().fetch(kobocat, &Secret::new("demo-access")).await?;
	let mut attempt = LoginAttempt::after_token_exchange(kobocat);

	attempt.extract_identity(&raw)?;
	attempt.authorize()?;

	match attempt.into_outcome()? {
		LoginOutcome::Authorized(identity) =>
			println!("Authorized {} <{}>.", identity.username, identity.email),
		LoginOutcome::Rejected(reason) => println!("Rejected: {reason}."),
	}

	user_mock.assert_async().await;

	let dispatched = settings
		.tasks
		.prepare(TaskName::new("sql_lab.get_sql_results")?, &json!({ "sql": "SELECT 1" }))?;
	let cache = MemoryCache::new(settings.results_backend.namespace.clone());

	cache.put(dispatched.result_key(), br#"{"data":[[1]]}"#.to_vec(), None).await?;

	println!(
		"Task routed to {}; result cached: {}.",
		dispatched.message.queue,
		cache.get(dispatched.result_key()).await?.is_some()
	);

	Ok(())
}
