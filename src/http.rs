//! User-info transport for federated logins.
//!
//! [`UserInfoClient`] performs the single authenticated `GET` that turns an access token into
//! a [`RawIdentityResponse`]. Redirects are not followed for provider API calls; configure
//! any custom [`ReqwestClient`] the same way before handing it to
//! [`UserInfoClient::with_client`].

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	header::{ACCEPT, HeaderValue},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::TransportError,
	obs::{LoginSpan, LoginStage},
	provider::{ProviderDescriptor, RawIdentityResponse},
};

/// Thin wrapper around [`ReqwestClient`] that fetches provider user-info documents.
#[derive(Clone, Debug)]
pub struct UserInfoClient(pub ReqwestClient);
impl UserInfoClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Fetches the user-info document for `descriptor` with `access_token` as a bearer token.
	pub async fn fetch(
		&self,
		descriptor: &ProviderDescriptor,
		access_token: &Secret,
	) -> Result<RawIdentityResponse> {
		let url = descriptor.user_info_url()?;
		let span = LoginSpan::new(descriptor.name(), LoginStage::UserInfo);

		span.instrument(async move {
			#[cfg(feature = "tracing")]
			tracing::debug!(url = %url, "fetching oauth user info");

			let response = self
				.0
				.get(url)
				.bearer_auth(access_token.expose())
				.header(ACCEPT, HeaderValue::from_static("application/json"))
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status();

			if !status.is_success() {
				return Err(TransportError::Status { status: status.as_u16() }.into());
			}

			let bytes = response.bytes().await.map_err(TransportError::from)?;

			RawIdentityResponse::from_slice(&bytes)
				.map_err(|source| TransportError::Decode { source }.into())
		})
		.await
	}
}
impl Default for UserInfoClient {
	fn default() -> Self {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.unwrap_or_else(|_| ReqwestClient::new());

		Self(client)
	}
}
impl AsRef<ReqwestClient> for UserInfoClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for UserInfoClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
