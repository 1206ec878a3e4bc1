//! Federated login lifecycle.
//!
//! A [`LoginAttempt`] walks `Unauthenticated → ProviderRedirected → TokenExchanged →
//! IdentityExtracted → Authorized`; any step may instead land in `Rejected`. `Authorized` and
//! `Rejected` are terminal. The HTTP legs (redirect handling, token exchange, user-info fetch)
//! belong to the caller; the attempt only validates what comes back.

// self
use crate::{
	_prelude::*,
	auth::id::random_token,
	obs::{self, LoginOutcomeKind, LoginSpan, LoginStage},
	provider::{
		self, IdentityExtractionError, NormalizedIdentity, ProviderDescriptor, RawIdentityResponse,
	},
};

const STATE_LEN: usize = 32;

/// Errors raised when a login attempt is driven out of order.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LoginError {
	/// The requested step is not valid from the current state.
	#[error("Login cannot move from {from} to {to}.")]
	InvalidTransition {
		/// State the attempt was in.
		from: &'static str,
		/// State the caller tried to reach.
		to: &'static str,
	},
	/// The provider signs in through a request-token handshake, not an authorization code.
	#[error("Provider `{provider}` does not support the authorization-code redirect.")]
	CodeFlowUnsupported {
		/// Provider name.
		provider: String,
	},
}

/// Why a login was refused.
#[derive(Debug, ThisError)]
pub enum RejectReason {
	/// The callback carried a different `state` than the redirect.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The provider payload could not be normalized.
	#[error(transparent)]
	Extraction(IdentityExtractionError),
	/// The e-mail domain is not on the provider's allow-list.
	#[error("E-mail `{email}` is not in an allowed domain.")]
	DomainNotAllowed {
		/// Rejected address.
		email: String,
	},
}

/// Current position of a [`LoginAttempt`].
#[derive(Debug)]
pub enum LoginState {
	/// Nothing has happened yet.
	Unauthenticated,
	/// The user was sent to the provider.
	ProviderRedirected {
		/// Opaque value the callback must echo.
		state: String,
		/// URL the user was sent to.
		authorize_url: Url,
	},
	/// The provider returned and the token exchange completed.
	TokenExchanged,
	/// The provider payload was normalized.
	IdentityExtracted(NormalizedIdentity),
	/// Terminal: the user may sign in.
	Authorized(NormalizedIdentity),
	/// Terminal: the login was refused.
	Rejected(RejectReason),
}
impl LoginState {
	/// Stable label used in errors and logs.
	pub const fn label(&self) -> &'static str {
		match self {
			LoginState::Unauthenticated => "unauthenticated",
			LoginState::ProviderRedirected { .. } => "provider_redirected",
			LoginState::TokenExchanged => "token_exchanged",
			LoginState::IdentityExtracted(_) => "identity_extracted",
			LoginState::Authorized(_) => "authorized",
			LoginState::Rejected(_) => "rejected",
		}
	}

	/// Returns true for `Authorized` and `Rejected`.
	pub const fn is_terminal(&self) -> bool {
		matches!(self, LoginState::Authorized(_) | LoginState::Rejected(_))
	}
}

/// Final result of a login attempt.
#[derive(Debug)]
pub enum LoginOutcome {
	/// Identity to bind to the session.
	Authorized(NormalizedIdentity),
	/// Reason the login was refused.
	Rejected(RejectReason),
}

/// One user's login through one provider.
#[derive(Debug)]
pub struct LoginAttempt<'a> {
	descriptor: &'a ProviderDescriptor,
	state: LoginState,
}
impl<'a> LoginAttempt<'a> {
	/// Starts an attempt against `descriptor`.
	pub fn new(descriptor: &'a ProviderDescriptor) -> Self {
		obs::record_login_outcome(descriptor.name(), LoginOutcomeKind::Attempt);

		Self { descriptor, state: LoginState::Unauthenticated }
	}

	/// Resumes an attempt whose redirect and token exchange were validated elsewhere.
	pub fn after_token_exchange(descriptor: &'a ProviderDescriptor) -> Self {
		obs::record_login_outcome(descriptor.name(), LoginOutcomeKind::Attempt);

		Self { descriptor, state: LoginState::TokenExchanged }
	}

	/// Provider this attempt runs against.
	pub fn descriptor(&self) -> &'a ProviderDescriptor {
		self.descriptor
	}

	/// Current state.
	pub fn state(&self) -> &LoginState {
		&self.state
	}

	/// Builds the provider authorize URL carrying a fresh `state`.
	pub fn redirect(&mut self, redirect_uri: &Url) -> Result<Url, LoginError> {
		let _guard = LoginSpan::new(self.descriptor.name(), LoginStage::Redirect).entered();

		self.expect_state("provider_redirected", |s| matches!(s, LoginState::Unauthenticated))?;

		if !self.descriptor.is_oauth2() {
			return Err(LoginError::CodeFlowUnsupported { provider: self.descriptor.name().into() });
		}

		let state = random_token(STATE_LEN);
		let mut authorize_url = self.descriptor.endpoints.authorization.clone();

		{
			let mut pairs = authorize_url.query_pairs_mut();

			pairs.append_pair("response_type", "code");
			pairs.append_pair("client_id", &self.descriptor.client_id);
			pairs.append_pair("redirect_uri", redirect_uri.as_str());

			if let Some(scope) = &self.descriptor.request_scope {
				pairs.append_pair("scope", scope);
			}

			pairs.append_pair("state", &state);
		}

		self.state =
			LoginState::ProviderRedirected { state, authorize_url: authorize_url.clone() };

		Ok(authorize_url)
	}

	/// Validates the `state` echoed by the provider callback.
	pub fn token_exchanged(&mut self, returned_state: &str) -> Result<&LoginState, LoginError> {
		let _guard = LoginSpan::new(self.descriptor.name(), LoginStage::TokenExchange).entered();
		let LoginState::ProviderRedirected { state, .. } = &self.state else {
			return Err(self.invalid("token_exchanged"));
		};

		if state == returned_state {
			self.state = LoginState::TokenExchanged;
		} else {
			self.reject(RejectReason::StateMismatch);
		}

		Ok(&self.state)
	}

	/// Normalizes the provider payload.
	pub fn extract_identity(
		&mut self,
		raw: &RawIdentityResponse,
	) -> Result<&LoginState, LoginError> {
		let _guard = LoginSpan::new(self.descriptor.name(), LoginStage::Extraction).entered();

		self.expect_state("identity_extracted", |s| matches!(s, LoginState::TokenExchanged))?;

		match provider::extract(self.descriptor, raw) {
			Ok(identity) => self.state = LoginState::IdentityExtracted(identity),
			Err(e) => self.reject(RejectReason::Extraction(e)),
		}

		Ok(&self.state)
	}

	/// Applies the provider's e-mail domain allow-list.
	pub fn authorize(&mut self) -> Result<&LoginState, LoginError> {
		let _guard = LoginSpan::new(self.descriptor.name(), LoginStage::Authorization).entered();

		let identity = match std::mem::replace(&mut self.state, LoginState::Unauthenticated) {
			LoginState::IdentityExtracted(identity) => identity,
			other => {
				self.state = other;

				return Err(self.invalid("authorized"));
			},
		};
		let permitted = self
			.descriptor
			.email_allow_list
			.as_ref()
			.is_none_or(|list| list.permits(&identity.email));

		if permitted {
			#[cfg(feature = "tracing")]
			tracing::debug!(provider = self.descriptor.name(), "login authorized");

			obs::record_login_outcome(self.descriptor.name(), LoginOutcomeKind::Authorized);

			self.state = LoginState::Authorized(identity);
		} else {
			self.reject(RejectReason::DomainNotAllowed { email: identity.email });
		}

		Ok(&self.state)
	}

	/// Consumes a terminal attempt.
	pub fn into_outcome(self) -> Result<LoginOutcome, LoginError> {
		match self.state {
			LoginState::Authorized(identity) => Ok(LoginOutcome::Authorized(identity)),
			LoginState::Rejected(reason) => Ok(LoginOutcome::Rejected(reason)),
			other => Err(LoginError::InvalidTransition { from: other.label(), to: "outcome" }),
		}
	}

	fn expect_state(
		&self,
		to: &'static str,
		allowed: impl FnOnce(&LoginState) -> bool,
	) -> Result<(), LoginError> {
		if allowed(&self.state) { Ok(()) } else { Err(self.invalid(to)) }
	}

	fn invalid(&self, to: &'static str) -> LoginError {
		LoginError::InvalidTransition { from: self.state.label(), to }
	}

	fn reject(&mut self, reason: RejectReason) {
		#[cfg(feature = "tracing")]
		tracing::warn!(provider = self.descriptor.name(), reason = %reason, "login rejected");

		obs::record_login_outcome(self.descriptor.name(), LoginOutcomeKind::Rejected);

		self.state = LoginState::Rejected(reason);
	}
}
