//! File-backed [`ResultsCache`] for single-host deployments without a cache server.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::ResultKey,
	cache::{CacheEntry, CacheError, CacheFuture, CacheNamespace, ResultsCache},
};

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
	key: String,
	value: String,
	expires_at: Option<OffsetDateTime>,
}

/// Persists results to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	namespace: CacheNamespace,
	inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
}
impl FileCache {
	/// Opens (or creates) a cache at the provided path, eagerly loading live entries.
	pub fn open(path: impl Into<PathBuf>, namespace: CacheNamespace) -> Result<Self, CacheError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let mut snapshot = Self::load_snapshot(&path)?;
		let now = OffsetDateTime::now_utc();

		snapshot.retain(|_, entry| entry.is_live_at(now));

		Ok(Self { path, namespace, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, CacheEntry>, CacheError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| CacheError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		let entries: Vec<SnapshotEntry> =
			serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		entries
			.into_iter()
			.map(|entry| {
				let value = STANDARD.decode(&entry.value).map_err(|e| CacheError::Serialization {
					message: format!("Entry {} holds invalid base64: {e}", entry.key),
				})?;

				Ok((entry.key, CacheEntry { value, expires_at: entry.expires_at }))
			})
			.collect()
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, CacheEntry>) -> Result<(), CacheError> {
		let snapshot: Vec<_> = contents
			.iter()
			.map(|(key, entry)| SnapshotEntry {
				key: key.clone(),
				value: STANDARD.encode(&entry.value),
				expires_at: entry.expires_at,
			})
			.collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| CacheError::Serialization {
				message: format!("Failed to serialize cache snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl ResultsCache for FileCache {
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
			let now = OffsetDateTime::now_utc();
			let entry = CacheEntry::new(&self.namespace, value, ttl, now);
			let qualified = self.namespace.qualify(key);
			let mut guard = self.inner.write();

			guard.retain(|_, existing| existing.is_live_at(now));

			let previous = guard.insert(qualified.clone(), entry);

			if let Err(e) = self.persist_locked(&guard) {
				match previous {
					Some(previous) => guard.insert(qualified, previous),
					None => guard.remove(&qualified),
				};

				return Err(e);
			}

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, Option<Vec<u8>>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let guard = self.inner.read();

			Ok(guard
				.get(&self.namespace.qualify(key))
				.filter(|entry| entry.is_live_at(now))
				.map(|entry| entry.value.clone()))
		})
	}

	fn delete<'a>(&'a self, key: &'a ResultKey) -> CacheFuture<'a, bool> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let mut guard = self.inner.write();
			let qualified = self.namespace.qualify(key);
			let Some(removed) = guard.remove(&qualified) else {
				return Ok(false);
			};

			if let Err(e) = self.persist_locked(&guard) {
				guard.insert(qualified, removed);

				return Err(e);
			}

			Ok(removed.is_live_at(now))
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"superset_config_file_cache_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[tokio::test]
	async fn failed_persist_leaves_previous_value_visible() {
		let dir = temp_path().with_extension("d");
		let cache =
			FileCache::open(dir.join("results.json"), CacheNamespace::new("superset_results"))
				.expect("Failed to open file cache snapshot.");
		let stored = ResultKey::new("stored").expect("Result key fixture should be valid.");
		let fresh = ResultKey::new("fresh").expect("Result key fixture should be valid.");

		cache.put(&stored, b"v1".to_vec(), None).await.expect("Failed to write cache entry.");
		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache directory {}: {e}", dir.display())
		});

		assert!(matches!(
			cache.put(&stored, b"v2".to_vec(), None).await,
			Err(CacheError::Backend { .. })
		));
		assert!(cache.put(&fresh, b"v1".to_vec(), None).await.is_err());
		assert!(cache.delete(&stored).await.is_err());
		assert_eq!(
			cache.get(&stored).await.expect("Failed to read cache entry."),
			Some(b"v1".to_vec())
		);
		assert_eq!(cache.get(&fresh).await.expect("Failed to read cache entry."), None);
	}

	#[tokio::test]
	async fn results_survive_reopen() {
		let path = temp_path();
		let namespace = CacheNamespace::new("superset_results");
		let cache = FileCache::open(&path, namespace.clone())
			.expect("Failed to open file cache snapshot.");
		let key = ResultKey::new("query-1").expect("Result key fixture should be valid.");
		let payload = vec![0_u8, 159, 146, 150];

		cache.put(&key, payload.clone(), None).await.expect("Failed to write cache entry.");
		drop(cache);

		let reopened =
			FileCache::open(&path, namespace).expect("Failed to reopen file cache snapshot.");

		assert_eq!(
			reopened.get(&key).await.expect("Failed to read cache entry."),
			Some(payload)
		);
		assert!(reopened.delete(&key).await.expect("Failed to delete cache entry."));
		assert_eq!(reopened.get(&key).await.expect("Failed to read cache entry."), None);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache snapshot {}: {e}", path.display())
		});
	}
}
