//! Startup wiring for an analytics server: resolves OAuth providers from credentials, picks the
//! active authentication mode, normalizes provider identities at login, and describes how
//! long-running queries are routed, serialized, and cached for later retrieval.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod provider;
pub mod task;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::MapCredentialSource,
		provider::{ProviderDescriptor, ProviderId, ProviderKind},
	};

	/// Credential set that satisfies every mandatory startup setting and configures no
	/// providers.
	pub fn base_credentials() -> MapCredentialSource {
		MapCredentialSource::from_iter([
			("SECRET_KEY", "test-secret-key"),
			("SQLALCHEMY_DATABASE_URI", "postgresql://superset:superset@db/superset"),
		])
	}

	/// Builds a descriptor for `kind` using fixture credentials and the kind's static endpoints.
	///
	/// Kobocat descriptors are rooted at `https://kc.example.org`.
	pub fn fixture_descriptor(kind: ProviderKind) -> ProviderDescriptor {
		let id = ProviderId::new(kind.name()).expect("Provider fixture name should be valid.");
		let builder = ProviderDescriptor::builder(id, kind)
			.client_id(format!("{}-client", kind.name()))
			.client_secret(format!("{}-secret", kind.name()));
		let builder = match kind {
			ProviderKind::Kobocat => builder
				.base_url(Url::parse("https://kc.example.org").expect("Fixture URL should parse.")),
			_ => builder,
		};

		builder.build().expect("Provider fixture should build successfully.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
