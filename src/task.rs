//! Queue topology and serializer contract for asynchronous query execution.
//!
//! Every task this application dispatches lands on one dedicated queue/routing-key pair so the
//! broker can be shared with unrelated applications. Workers for this application must subscribe
//! to that queue.

pub mod envelope;
pub mod rate_limit;
pub mod route;

pub use envelope::*;
pub use rate_limit::*;
pub use route::*;

// self
use crate::{
	_prelude::*,
	auth::{QueueName, ResultKey, TaskName, id::random_token},
	config::CredentialSource,
	error::ConfigError,
};

const MESSAGE_ID_LEN: usize = 32;
const DEFAULT_REDIS_URL: &str = "redis://redis:6379";
const DEFAULT_REDIS_DB: &str = "1";

/// Errors that refuse a task before it reaches a worker.
#[derive(Debug, ThisError)]
pub enum TaskRejectedError {
	/// Body carries a content type outside the accepted set.
	#[error("Content type `{content_type}` is not accepted; tasks must be JSON.")]
	UnsupportedContentType {
		/// Offending content type.
		content_type: String,
	},
	/// Body is not a valid JSON task message.
	#[error("Task body is not a valid JSON task message: {source}.")]
	Decode {
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Arguments or message could not be encoded as JSON.
	#[error("Task payload cannot be encoded as JSON.")]
	Encode {
		/// Underlying encoding failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Message ready to publish, with the key its result will be cached under.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchedTask {
	/// Decoded message.
	pub message: TaskMessage,
	/// Content type to publish with.
	pub content_type: &'static str,
	/// Encoded body.
	pub body: Vec<u8>,
}
impl DispatchedTask {
	/// Key the caller polls the results cache with.
	pub fn result_key(&self) -> &ResultKey {
		&self.message.result_key
	}
}

/// Static task-queue description handed to the broker and workers at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRoutingConfig {
	/// Route every task uses.
	pub default_route: QueueRoute,
	/// Serializer contract.
	pub envelope: TaskEnvelope,
	/// Per-task annotations.
	pub annotations: BTreeMap<TaskName, TaskAnnotation>,
	/// Broker connection URL.
	pub broker_url: Url,
	/// Task state/result backend URL.
	pub result_backend_url: Url,
	/// Modules workers import to register tasks.
	pub imports: Vec<String>,
}
impl TaskRoutingConfig {
	/// Builds the default topology against the given broker and result backend.
	pub fn new(broker_url: Url, result_backend_url: Url) -> Result<Self, ConfigError> {
		let route = QueueRoute::dedicated(QueueName::new(QueueRoute::DEFAULT_NAME)?);
		let annotations = BTreeMap::from([(
			TaskName::new("tasks.add")?,
			TaskAnnotation { rate_limit: Some("10/s".parse()?) },
		)]);

		Ok(Self {
			default_route: route,
			envelope: TaskEnvelope::json(),
			annotations,
			broker_url,
			result_backend_url,
			imports: vec!["superset.sql_lab".into()],
		})
	}

	/// Reads `REDIS_URL`, `CELERY_BROKER_REDIS_DB`, and `CELERY_RESULT_REDIS_DB`.
	pub fn from_source(source: &dyn CredentialSource) -> Result<Self, ConfigError> {
		let redis_url = source.non_empty("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.into());
		let broker_url = redis_db_url(source, &redis_url, "CELERY_BROKER_REDIS_DB")?;
		let result_backend_url = redis_db_url(source, &redis_url, "CELERY_RESULT_REDIS_DB")?;

		Self::new(broker_url, result_backend_url)
	}

	/// Replaces the annotation for `task`.
	pub fn with_annotation(mut self, task: TaskName, annotation: TaskAnnotation) -> Self {
		self.annotations.insert(task, annotation);

		self
	}

	/// Every queue workers must subscribe to.
	pub fn queues(&self) -> impl Iterator<Item = &QueueRoute> {
		std::iter::once(&self.default_route)
	}

	/// Route for `task`; all tasks share the dedicated route.
	pub fn route_for(&self, _task: &TaskName) -> &QueueRoute {
		&self.default_route
	}

	/// Rate ceiling annotated for `task`.
	pub fn rate_limit_for(&self, task: &str) -> Option<RateLimit> {
		self.annotations.get(task).and_then(|annotation| annotation.rate_limit)
	}

	/// Worker command-line arguments that subscribe to this application's queue.
	pub fn worker_arguments(&self, hostname: &str) -> Vec<String> {
		vec![
			format!("--app={}", QueueRoute::DEFAULT_NAME),
			format!("--queues={}", self.default_route.queue),
			format!("--hostname={hostname}"),
			"-Ofair".into(),
			"-l".into(),
			"INFO".into(),
		]
	}

	/// Wraps a query submission into a routed, encoded task with a fresh result key.
	pub fn prepare<T>(&self, task: TaskName, args: &T) -> Result<DispatchedTask, TaskRejectedError>
	where
		T: ?Sized + Serialize,
	{
		let args =
			serde_json::to_value(args).map_err(|source| TaskRejectedError::Encode { source })?;
		let route = self.route_for(&task).clone();
		let message = TaskMessage {
			id: random_token(MESSAGE_ID_LEN),
			task,
			queue: route.queue,
			routing_key: route.routing_key,
			result_key: ResultKey::generate(),
			args,
		};
		let body = self.envelope.encode(&message)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(
			task = %message.task,
			queue = %message.queue,
			result_key = %message.result_key,
			"prepared query task"
		);

		Ok(DispatchedTask { message, content_type: self.envelope.content_type(), body })
	}

	/// Worker-side admission: decodes a received body under the envelope contract.
	pub fn accept(&self, content_type: &str, body: &[u8]) -> Result<TaskMessage, TaskRejectedError> {
		self.envelope.accept(content_type, body)
	}
}

fn redis_db_url(
	source: &dyn CredentialSource,
	redis_url: &str,
	db_key: &str,
) -> Result<Url, ConfigError> {
	let db = source.non_empty(db_key).unwrap_or_else(|| DEFAULT_REDIS_DB.into());
	let db = db.trim();

	db.parse::<u32>()
		.map_err(|_| ConfigError::InvalidNumber { key: db_key.into(), value: db.into() })?;

	let raw = format!("{}/{db}", redis_url.trim().trim_end_matches('/'));

	Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { key: "REDIS_URL".into(), source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::MapCredentialSource;

	#[test]
	fn defaults_point_at_shared_redis() {
		let config = TaskRoutingConfig::from_source(&MapCredentialSource::default())
			.expect("Defaults should resolve.");

		assert_eq!(config.broker_url.as_str(), "redis://redis:6379/1");
		assert_eq!(config.result_backend_url.as_str(), "redis://redis:6379/1");
		assert_eq!(config.rate_limit_for("tasks.add"), Some(RateLimit::per_second(10)));
		assert_eq!(config.rate_limit_for("superset.sql_lab.get_sql_results"), None);
		assert_eq!(config.imports, vec!["superset.sql_lab".to_owned()]);
	}

	#[test]
	fn redis_location_and_databases_are_configurable() {
		let source = MapCredentialSource::from_iter([
			("REDIS_URL", "redis://cache.internal:6380/"),
			("CELERY_BROKER_REDIS_DB", "3"),
			("CELERY_RESULT_REDIS_DB", "4"),
		]);
		let config = TaskRoutingConfig::from_source(&source).expect("Overrides should resolve.");

		assert_eq!(config.broker_url.as_str(), "redis://cache.internal:6380/3");
		assert_eq!(config.result_backend_url.as_str(), "redis://cache.internal:6380/4");
	}

	#[test]
	fn non_numeric_database_index_is_rejected() {
		let source = MapCredentialSource::from_iter([("CELERY_BROKER_REDIS_DB", "one")]);
		let err = TaskRoutingConfig::from_source(&source).expect_err("Index must be numeric.");

		assert!(matches!(err, ConfigError::InvalidNumber { ref key, .. } if key == "CELERY_BROKER_REDIS_DB"));
	}

	#[test]
	fn worker_arguments_subscribe_to_dedicated_queue() {
		let config = TaskRoutingConfig::from_source(&MapCredentialSource::default())
			.expect("Defaults should resolve.");
		let args = config.worker_arguments("superset.demo@%n");

		assert!(args.contains(&"--queues=superset".to_owned()));
		assert!(args.contains(&"--hostname=superset.demo@%n".to_owned()));
		assert_eq!(config.queues().count(), 1);
	}
}
