// crates.io
use serde_json::json;
// self
use superset_config::{
	_preludet::*,
	auth::{LoginAttempt, LoginOutcome, LoginState, RejectReason},
	provider::{self, IdentityExtractionError, ProviderKind, RawIdentityResponse},
};

fn run_login(kind: ProviderKind, allow_list: Option<&str>, payload: JsonValue) -> LoginOutcome {
	let mut descriptor = fixture_descriptor(kind);

	descriptor.email_allow_list = allow_list.map(provider::EmailAllowList::parse);

	let mut attempt = LoginAttempt::new(&descriptor);
	let callback = Url::parse("https://superset.example.org/oauth-authorized/x")
		.expect("Callback fixture should parse.");

	attempt.redirect(&callback).expect("Redirect should be allowed.");

	let state = match attempt.state() {
		LoginState::ProviderRedirected { state, .. } => state.clone(),
		other => panic!("Expected a redirected attempt, got {other:?}."),
	};

	attempt.token_exchanged(&state).expect("Callback should be allowed.");

	if !attempt
		.extract_identity(&RawIdentityResponse::new(payload))
		.expect("Extraction should be allowed.")
		.is_terminal()
	{
		attempt.authorize().expect("Authorization should be allowed.");
	}

	attempt.into_outcome().expect("Attempt should be terminal.")
}

#[test]
fn allow_listed_domain_is_authorized() {
	let outcome = run_login(
		ProviderKind::Google,
		Some("@example.com"),
		json!({ "email": "a@example.com", "username": "a" }),
	);

	assert!(matches!(outcome, LoginOutcome::Authorized(ref identity) if identity.email == "a@example.com"));
}

#[test]
fn foreign_domain_is_rejected() {
	let outcome = run_login(
		ProviderKind::Google,
		Some("@example.com"),
		json!({ "email": "a@other.com", "username": "a" }),
	);

	assert!(matches!(outcome, LoginOutcome::Rejected(RejectReason::DomainNotAllowed { .. })));
}

#[test]
fn kobocat_payload_normalizes() {
	let outcome = run_login(
		ProviderKind::Kobocat,
		None,
		json!({ "username": "u1", "email": "u1@x.org", "is_superuser": false }),
	);

	match outcome {
		LoginOutcome::Authorized(identity) => {
			assert_eq!(identity.username, "u1");
			assert_eq!(identity.email, "u1@x.org");
		},
		LoginOutcome::Rejected(reason) => panic!("Unexpected rejection: {reason}."),
	}
}

#[test]
fn kobocat_payload_without_email_never_yields_partial_identity() {
	let descriptor = fixture_descriptor(ProviderKind::Kobocat);
	let err = provider::extract(&descriptor, &RawIdentityResponse::new(json!({ "username": "u1" })))
		.expect_err("Missing email must fail.");

	assert!(matches!(err, IdentityExtractionError::Malformed { .. }));
	assert!(err.to_string().contains("kobocat"));

	let outcome = run_login(ProviderKind::Kobocat, None, json!({ "username": "u1" }));

	assert!(matches!(outcome, LoginOutcome::Rejected(RejectReason::Extraction(_))));
}

#[test]
fn default_rule_falls_back_to_provider_scoped_id() {
	let descriptor = fixture_descriptor(ProviderKind::Twitter);
	let identity = provider::extract(
		&descriptor,
		&RawIdentityResponse::new(json!({ "id": 42, "email": "t@example.com" })),
	)
	.expect("Fallback username should apply.");

	assert_eq!(identity.username, "twitter_42");
}
