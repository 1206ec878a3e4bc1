//! Credential-driven provider registry.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	config::CredentialSource,
	error::ConfigError,
	provider::{EmailAllowList, ProviderDescriptor, ProviderKind},
};

/// Set of configured providers, unique by name and iterated in name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderRegistry(BTreeMap<ProviderId, ProviderDescriptor>);
impl ProviderRegistry {
	/// Resolves every known provider kind against `source`.
	///
	/// A kind is registered iff its `<PREFIX>_OAUTH_CONSUMER_KEY` is present and non-empty. Once
	/// registered, missing required fields fail the whole resolution instead of dropping the
	/// provider.
	pub fn resolve(source: &dyn CredentialSource) -> Result<Self, ConfigError> {
		let mut registry = Self::default();

		for kind in ProviderKind::ALL {
			if let Some(descriptor) = resolve_kind(source, kind)? {
				#[cfg(feature = "tracing")]
				tracing::debug!(provider = kind.name(), "registered federation provider");

				registry.insert(descriptor)?;
			}
		}

		Ok(registry)
	}

	/// Adds a descriptor, rejecting duplicate names.
	pub fn insert(&mut self, descriptor: ProviderDescriptor) -> Result<(), ConfigError> {
		if self.0.contains_key(&descriptor.id) {
			return Err(ConfigError::DuplicateProvider { name: descriptor.id.to_string() });
		}

		self.0.insert(descriptor.id.clone(), descriptor);

		Ok(())
	}

	/// Looks up a provider by name.
	pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
		self.0.get(name)
	}

	/// Iterates descriptors in name order.
	pub fn iter(&self) -> impl Iterator<Item = &ProviderDescriptor> {
		self.0.values()
	}

	/// Provider names in order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(|id| id.as_ref())
	}

	/// Number of configured providers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no provider is configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

fn resolve_kind(
	source: &dyn CredentialSource,
	kind: ProviderKind,
) -> Result<Option<ProviderDescriptor>, ConfigError> {
	let prefix = kind.env_prefix();
	let Some(client_id) = source.non_empty(&format!("{prefix}_OAUTH_CONSUMER_KEY")) else {
		return Ok(None);
	};
	let secret_key = format!("{prefix}_OAUTH_CONSUMER_SECRET");
	let client_secret = source.non_empty(&secret_key).ok_or(ConfigError::IncompleteProvider {
		provider: kind.name(),
		key: secret_key,
	})?;
	let mut builder = ProviderDescriptor::builder(ProviderId::new(kind.name())?, kind)
		.client_id(client_id)
		.client_secret(client_secret);

	if kind.requires_base_url() {
		let key = format!("{prefix}_BASE_URL");
		let raw = source
			.non_empty(&key)
			.ok_or_else(|| ConfigError::IncompleteProvider { provider: kind.name(), key: key.clone() })?;
		let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })?;

		builder = builder.base_url(url);
	}
	if let Some(raw) = source.non_empty(&format!("{prefix}_OAUTH_EMAIL_DOMAINS")) {
		builder = builder.email_allow_list(EmailAllowList::parse(&raw));
	}

	Ok(Some(builder.build()?))
}
