//! Redacting wrapper for client secrets, the session key, and connection strings.
//!
//! `Debug`, `Display`, and `Serialize` all emit [`REDACTED`], so descriptors and settings can be
//! logged or dumped without leaking credentials. Deserialization reads the plain string.

// crates.io
use serde::Serializer;
// self
use crate::_prelude::*;

/// Placeholder written wherever a secret would otherwise appear.
pub const REDACTED: &str = "<redacted>";

/// Credential string that is only readable through [`Secret::expose`].
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Plain value, for handing to a client library.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Serialize for Secret {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Secret({REDACTED})")
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
