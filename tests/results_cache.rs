// self
use superset_config::{
	_preludet::*,
	auth::ResultKey,
	cache::{CacheNamespace, MemoryCache, ResultsCache},
	config::Settings,
};

fn results_cache() -> MemoryCache {
	let settings =
		Settings::from_source(&base_credentials()).expect("Base credentials should resolve.");

	MemoryCache::new(settings.results_backend.namespace)
}

#[tokio::test]
async fn unknown_key_reads_as_absent() {
	let cache = results_cache();
	let key = ResultKey::generate();

	assert_eq!(cache.get(&key).await.expect("Absent keys are not errors."), None);
	assert!(!cache.delete(&key).await.expect("Deleting absent keys is not an error."));
}

#[tokio::test]
async fn stored_result_is_readable_before_expiry() {
	let cache = results_cache();
	let key = ResultKey::generate();
	let payload = br#"{"status":"success","data":[[1]]}"#.to_vec();

	cache
		.put(&key, payload.clone(), Some(Duration::minutes(5)))
		.await
		.expect("Write should succeed.");

	assert_eq!(cache.get(&key).await.expect("Read should succeed."), Some(payload));
}

#[tokio::test]
async fn expired_result_reads_as_absent() {
	let cache = MemoryCache::new(CacheNamespace::new("superset_results"));
	let key = ResultKey::generate();

	cache
		.put(&key, b"stale".to_vec(), Some(Duration::milliseconds(20)))
		.await
		.expect("Write should succeed.");
	tokio::time::sleep(std::time::Duration::from_millis(50)).await;

	assert_eq!(cache.get(&key).await.expect("Read should succeed."), None);
}

#[tokio::test]
async fn trait_objects_share_one_namespace() {
	let cache: Arc<dyn ResultsCache> = Arc::new(results_cache());
	let key = ResultKey::new("abc").expect("Result key fixture should be valid.");

	assert_eq!(cache.namespace().qualify(&key), "superset_resultsabc");
}
