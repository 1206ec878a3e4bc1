//! Results cache contract and built-in backends for finished query results.
//!
//! A worker writes a result once under a [`ResultKey`] the caller already knows; the caller polls
//! [`ResultsCache::get`] until a value appears or its own deadline passes. A missing value is
//! not an error: the result is either not ready yet or has been evicted.

pub mod file;
pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use file::FileCache;
pub use memory::MemoryCache;
#[cfg(feature = "redis")] pub use redis::RedisCache;

// self
use crate::{
	_prelude::*,
	auth::ResultKey,
	config::{CredentialSource, parse_number},
	error::ConfigError,
};

/// Boxed future returned by [`ResultsCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Addressable key-value store for finished query results.
///
/// Writes are last-writer-wins per key.
pub trait ResultsCache
where
	Self: Send + Sync,
{
	/// Key namespace and default expiry applied by this backend.
	fn namespace(&self) -> &CacheNamespace;

	/// Stores `value` under `key`. `None` uses the namespace default expiry.
	fn put<'a>(
		&'a self,
		key: &'a ResultKey,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> CacheFuture<'a, ()>;

	/// Fetches the value stored under `key`, if it is present and unexpired.
	fn get<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, Option<Vec<u8>>>;

	/// Removes `key`, returning whether a live value was removed.
	fn delete<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, bool>;
}

/// Error type produced by [`ResultsCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Encoding or decoding of stored data failed.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Key prefix and default expiry shared by every key of one cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNamespace {
	/// Prefix prepended to every key.
	pub key_prefix: String,
	/// Expiry applied when a write does not name one. Zero or negative disables expiry.
	pub default_timeout: Duration,
}
impl CacheNamespace {
	/// Default expiry of every cache: one day.
	pub const DEFAULT_TIMEOUT: Duration = Duration::DAY;

	/// Creates a namespace with the default one-day expiry.
	pub fn new(key_prefix: impl Into<String>) -> Self {
		Self { key_prefix: key_prefix.into(), default_timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Overrides the default expiry.
	pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
		self.default_timeout = timeout;

		self
	}

	/// Backend key for `key`.
	pub fn qualify(&self, key: &ResultKey) -> String {
		format!("{}{key}", self.key_prefix)
	}

	/// Effective expiry for a write; `None` means the entry never expires.
	pub fn expiry(&self, ttl: Option<Duration>) -> Option<Duration> {
		let ttl = ttl.unwrap_or(self.default_timeout);

		if ttl.is_positive() { Some(ttl) } else { None }
	}
}

/// Connection coordinates of a redis-compatible cache server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisLocation {
	/// Host name.
	pub host: String,
	/// TCP port.
	pub port: u16,
	/// Logical database index.
	pub db: u32,
}
impl RedisLocation {
	/// Default redis port.
	pub const DEFAULT_PORT: u16 = 6379;

	/// Reads `<PREFIX>_HOST`, `<PREFIX>_PORT`, and `<PREFIX>_DB`, falling back to the given
	/// defaults.
	pub fn from_source(
		source: &dyn CredentialSource,
		prefix: &str,
		default_host: &str,
		default_db: u32,
	) -> Result<Self, ConfigError> {
		let host = source.non_empty(&format!("{prefix}_HOST")).unwrap_or_else(|| default_host.into());
		let port = parse_number(source, &format!("{prefix}_PORT"), Self::DEFAULT_PORT)?;
		let db = parse_number(source, &format!("{prefix}_DB"), default_db)?;

		Ok(Self { host: host.trim().to_owned(), port, db })
	}

	/// `redis://host:port/db` URL for client libraries.
	pub fn url(&self) -> Result<Url, ConfigError> {
		let raw = format!("redis://{}:{}/{}", self.host, self.port, self.db);

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { key: raw, source })
	}
}

/// Settings of one redis-backed cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
	/// Server coordinates.
	pub location: RedisLocation,
	/// Key prefix and expiry.
	pub namespace: CacheNamespace,
}

/// Stored value plus its absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CacheEntry {
	pub(crate) value: Vec<u8>,
	pub(crate) expires_at: Option<OffsetDateTime>,
}
impl CacheEntry {
	pub(crate) fn new(
		namespace: &CacheNamespace,
		value: Vec<u8>,
		ttl: Option<Duration>,
		now: OffsetDateTime,
	) -> Self {
		Self { value, expires_at: namespace.expiry(ttl).map(|ttl| now + ttl) }
	}

	pub(crate) fn is_live_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|at| now < at)
	}
}
