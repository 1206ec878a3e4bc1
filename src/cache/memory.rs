//! Thread-safe in-memory [`ResultsCache`] for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	auth::ResultKey,
	cache::{CacheEntry, CacheFuture, CacheNamespace, ResultsCache},
};

type EntryMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Keeps results in-process; expired entries are dropped on write and when read.
#[derive(Clone, Debug)]
pub struct MemoryCache {
	namespace: CacheNamespace,
	entries: EntryMap,
}
impl MemoryCache {
	/// Creates an empty cache for `namespace`.
	pub fn new(namespace: CacheNamespace) -> Self {
		Self { namespace, entries: Default::default() }
	}

	/// Number of stored entries, expired ones included.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns true when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	fn put_at(&self, key: &ResultKey, value: Vec<u8>, ttl: Option<Duration>, now: OffsetDateTime) {
		let entry = CacheEntry::new(&self.namespace, value, ttl, now);
		let mut guard = self.entries.write();

		guard.retain(|_, existing| existing.is_live_at(now));
		guard.insert(self.namespace.qualify(key), entry);
	}

	fn get_at(&self, key: &ResultKey, now: OffsetDateTime) -> Option<Vec<u8>> {
		let qualified = self.namespace.qualify(key);

		{
			let guard = self.entries.read();

			match guard.get(&qualified) {
				Some(entry) if entry.is_live_at(now) => return Some(entry.value.clone()),
				Some(_) => {},
				None => return None,
			}
		}

		let mut guard = self.entries.write();

		if guard.get(&qualified).is_some_and(|entry| !entry.is_live_at(now)) {
			guard.remove(&qualified);
		}

		None
	}

	fn delete_at(&self, key: &ResultKey, now: OffsetDateTime) -> bool {
		self.entries
			.write()
			.remove(&self.namespace.qualify(key))
			.is_some_and(|entry| entry.is_live_at(now))
	}
}
impl Default for MemoryCache {
	fn default() -> Self {
		Self::new(CacheNamespace::new("superset_results"))
	}
}
impl ResultsCache for MemoryCache {
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
			self.put_at(key, value, ttl, OffsetDateTime::now_utc());

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move { Ok(self.get_at(key, OffsetDateTime::now_utc())) })
	}

	fn delete<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, bool> {
		Box::pin(async move { Ok(self.delete_at(key, OffsetDateTime::now_utc())) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn key(value: &str) -> ResultKey {
		ResultKey::new(value).expect("Result key fixture should be valid.")
	}

	#[test]
	fn expired_entries_read_as_absent_and_are_evicted() {
		let cache = MemoryCache::default();
		let now = OffsetDateTime::now_utc();
		let k = key("expiring");

		cache.put_at(&k, b"rows".to_vec(), Some(Duration::minutes(1)), now);

		assert_eq!(cache.get_at(&k, now + Duration::seconds(59)), Some(b"rows".to_vec()));
		assert_eq!(cache.get_at(&k, now + Duration::minutes(1)), None);
		assert!(cache.is_empty());
	}

	#[test]
	fn writes_sweep_results_nobody_polled() {
		let cache = MemoryCache::default();
		let now = OffsetDateTime::now_utc();

		cache.put_at(&key("abandoned-1"), b"rows".to_vec(), Some(Duration::seconds(5)), now);
		cache.put_at(&key("abandoned-2"), b"rows".to_vec(), Some(Duration::seconds(5)), now);
		cache.put_at(&key("kept"), b"rows".to_vec(), None, now);
		cache.put_at(&key("fresh"), b"rows".to_vec(), None, now + Duration::seconds(10));

		assert_eq!(cache.len(), 2);
		assert!(cache.get_at(&key("kept"), now + Duration::seconds(10)).is_some());
	}

	#[test]
	fn default_expiry_is_one_day() {
		let cache = MemoryCache::default();
		let now = OffsetDateTime::now_utc();
		let k = key("daily");

		cache.put_at(&k, b"rows".to_vec(), None, now);

		assert!(cache.get_at(&k, now + Duration::hours(23)).is_some());
		assert!(cache.get_at(&k, now + Duration::days(1)).is_none());
	}

	#[tokio::test]
	async fn later_write_wins() {
		let cache = MemoryCache::default();
		let k = key("overwrite");

		cache.put(&k, b"first".to_vec(), None).await.expect("First write should succeed.");
		cache.put(&k, b"second".to_vec(), None).await.expect("Second write should succeed.");

		assert_eq!(
			cache.get(&k).await.expect("Read should succeed."),
			Some(b"second".to_vec())
		);
		assert!(cache.delete(&k).await.expect("Delete should succeed."));
		assert!(!cache.delete(&k).await.expect("Second delete should succeed."));
		assert_eq!(cache.len(), 0);
	}
}
