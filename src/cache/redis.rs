//! Redis-backed [`ResultsCache`] that shares results across worker and web processes.

// crates.io
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
// self
use crate::{
	_prelude::*,
	auth::ResultKey,
	cache::{CacheError, CacheFuture, CacheNamespace, CacheSettings, ResultsCache},
};

/// Stores results with `SET`/`SETEX` under the namespace prefix.
#[derive(Clone, Debug)]
pub struct RedisCache {
	client: Client,
	namespace: CacheNamespace,
}
impl RedisCache {
	/// Creates a client for `url`; no connection is made until the first operation.
	pub fn open(url: &Url, namespace: CacheNamespace) -> Result<Self, CacheError> {
		let client = Client::open(url.as_str()).map_err(backend_error)?;

		Ok(Self { client, namespace })
	}

	/// Creates a client from resolved cache settings.
	pub fn from_settings(settings: &CacheSettings) -> Result<Self, CacheError> {
		let url = settings
			.location
			.url()
			.map_err(|e| CacheError::Backend { message: e.to_string() })?;

		Self::open(&url, settings.namespace.clone())
	}

	async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
		self.client.get_multiplexed_async_connection().await.map_err(backend_error)
	}
}
impl ResultsCache for RedisCache {
	fn namespace(&self) -> &CacheNamespace {
		&self.namespace
	}

	fn put<'a>(
		&'a self,
		key: &'a ResultKey,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let mut conn = self.connection().await?;
			let qualified = self.namespace.qualify(key);

			match self.namespace.expiry(ttl) {
				Some(ttl) => {
					let seconds = u64::try_from(ttl.whole_seconds()).unwrap_or(1).max(1);

					conn.set_ex::<_, _, ()>(qualified, value, seconds).await.map_err(backend_error)
				},
				None => conn.set::<_, _, ()>(qualified, value).await.map_err(backend_error),
			}
		})
	}

	fn get<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move {
			let mut conn = self.connection().await?;

			conn.get::<_, Option<Vec<u8>>>(self.namespace.qualify(key)).await.map_err(backend_error)
		})
	}

	fn delete<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, bool> {
		Box::pin(async move {
			let mut conn = self.connection().await?;
			let removed: u64 =
				conn.del(self.namespace.qualify(key)).await.map_err(backend_error)?;

			Ok(removed > 0)
		})
	}
}

fn backend_error(e: redis::RedisError) -> CacheError {
	CacheError::Backend { message: e.to_string() }
}
