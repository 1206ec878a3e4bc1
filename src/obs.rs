//! Optional observability helpers for federated logins.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `superset_config.login` with the `provider`
//!   and `stage` fields.
//! - Enable `metrics` to increment the `superset_config_login_total` counter for every
//!   attempt/authorization/rejection, labeled by `provider` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Login lifecycle stage a span covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginStage {
	/// Building the provider redirect.
	Redirect,
	/// Validating the callback after the token exchange.
	TokenExchange,
	/// Fetching the user-info document.
	UserInfo,
	/// Normalizing the identity payload.
	Extraction,
	/// Applying the domain allow-list.
	Authorization,
}
impl LoginStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginStage::Redirect => "redirect",
			LoginStage::TokenExchange => "token_exchange",
			LoginStage::UserInfo => "user_info",
			LoginStage::Extraction => "extraction",
			LoginStage::Authorization => "authorization",
		}
	}
}
impl Display for LoginStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoginOutcomeKind {
	/// A login started.
	Attempt,
	/// The user was authorized.
	Authorized,
	/// The login terminated in rejection.
	Rejected,
}
impl LoginOutcomeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoginOutcomeKind::Attempt => "attempt",
			LoginOutcomeKind::Authorized => "authorized",
			LoginOutcomeKind::Rejected => "rejected",
		}
	}
}
impl Display for LoginOutcomeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
