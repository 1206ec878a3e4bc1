//! Injected key/value sources for startup credentials and settings.

// std
use std::env;
// self
use crate::_prelude::*;

/// Read-only key/value view over startup configuration.
pub trait CredentialSource
where
	Self: Send + Sync,
{
	/// Returns the raw value for `key`, if present.
	fn get(&self, key: &str) -> Option<String>;

	/// Returns the value for `key` only when it contains non-whitespace characters.
	fn non_empty(&self, key: &str) -> Option<String> {
		self.get(key).filter(|value| !value.trim().is_empty())
	}
}

/// Snapshot of the process environment taken once at construction.
#[derive(Clone, Debug, Default)]
pub struct EnvCredentialSource(BTreeMap<String, String>);
impl EnvCredentialSource {
	/// Captures every UTF-8 environment variable of the current process.
	pub fn capture() -> Self {
		Self(env::vars().collect())
	}
}
impl CredentialSource for EnvCredentialSource {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}

/// In-memory source used by tests and embedders that assemble settings themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapCredentialSource(BTreeMap<String, String>);
impl MapCredentialSource {
	/// Returns a copy of the source with `key` set to `value`.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Returns a copy of the source without `key`.
	pub fn without(mut self, key: &str) -> Self {
		self.0.remove(key);

		self
	}
}
impl<K, V> FromIterator<(K, V)> for MapCredentialSource
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
impl CredentialSource for MapCredentialSource {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn non_empty_filters_blank_values() {
		let source = MapCredentialSource::from_iter([("A", "1"), ("B", " ")]);

		assert_eq!(source.non_empty("A").as_deref(), Some("1"));
		assert_eq!(source.get("B").as_deref(), Some(" "));
		assert_eq!(source.non_empty("B"), None);
		assert_eq!(source.non_empty("C"), None);
	}

	#[test]
	fn builder_helpers_add_and_remove_keys() {
		let source = MapCredentialSource::default().with("A", "1").with("B", "2").without("A");

		assert_eq!(source.get("A"), None);
		assert_eq!(source.get("B").as_deref(), Some("2"));
	}
}
