//! Wire contract for dispatched query tasks.

// self
use crate::{
	_prelude::*,
	auth::{QueueName, ResultKey, TaskName},
	error::ConfigError,
	task::TaskRejectedError,
};

/// MIME type of JSON-encoded task bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serializer names recognized in task settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Serializer {
	/// JSON; the only serializer this crate encodes.
	Json,
	/// Python pickle.
	Pickle,
	/// YAML.
	Yaml,
	/// MessagePack.
	Msgpack,
}
impl Serializer {
	/// Name used in task settings.
	pub const fn as_str(self) -> &'static str {
		match self {
			Serializer::Json => "json",
			Serializer::Pickle => "pickle",
			Serializer::Yaml => "yaml",
			Serializer::Msgpack => "msgpack",
		}
	}

	/// MIME type the serializer produces.
	pub const fn content_type(self) -> &'static str {
		match self {
			Serializer::Json => JSON_CONTENT_TYPE,
			Serializer::Pickle => "application/x-python-serialize",
			Serializer::Yaml => "application/x-yaml",
			Serializer::Msgpack => "application/x-msgpack",
		}
	}
}
impl Display for Serializer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Routed task as it travels over the broker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
	/// Unique message identifier.
	pub id: String,
	/// Registered task name.
	pub task: TaskName,
	/// Queue the message is published to.
	pub queue: QueueName,
	/// Routing key used for publication.
	pub routing_key: String,
	/// Key the worker stores the finished result under.
	pub result_key: ResultKey,
	/// Task arguments.
	pub args: JsonValue,
}

/// Serializer contract shared by submitters and workers.
///
/// Task serializer, result serializer, and accepted content types always agree; the only
/// accepted combination is JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTaskEnvelope")]
pub struct TaskEnvelope {
	accept_content: Vec<String>,
	task_serializer: Serializer,
	result_serializer: Serializer,
}
impl TaskEnvelope {
	/// JSON-only envelope.
	pub fn json() -> Self {
		Self {
			accept_content: vec![JSON_CONTENT_TYPE.to_owned()],
			task_serializer: Serializer::Json,
			result_serializer: Serializer::Json,
		}
	}

	/// Validates an explicit serializer combination.
	pub fn new<I, S>(
		task_serializer: Serializer,
		result_serializer: Serializer,
		accept_content: I,
	) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let accept_content: Vec<String> = accept_content.into_iter().map(Into::into).collect();
		let consistent = task_serializer == Serializer::Json
			&& result_serializer == Serializer::Json
			&& !accept_content.is_empty()
			&& accept_content.iter().all(|c| is_json(c));

		if !consistent {
			return Err(ConfigError::SerializerMismatch {
				task: task_serializer.to_string(),
				result: result_serializer.to_string(),
				accept: accept_content,
			});
		}

		Ok(Self { accept_content, task_serializer, result_serializer })
	}

	/// Accepted content types.
	pub fn accept_content(&self) -> &[String] {
		&self.accept_content
	}

	/// Serializer for outgoing task bodies.
	pub fn task_serializer(&self) -> Serializer {
		self.task_serializer
	}

	/// Serializer for stored results.
	pub fn result_serializer(&self) -> Serializer {
		self.result_serializer
	}

	/// Content type stamped on outgoing messages.
	pub fn content_type(&self) -> &'static str {
		self.task_serializer.content_type()
	}

	/// Encodes a message body.
	pub fn encode(&self, message: &TaskMessage) -> Result<Vec<u8>, TaskRejectedError> {
		serde_json::to_vec(message).map_err(|source| TaskRejectedError::Encode { source })
	}

	/// Decodes a received body, refusing anything outside the accepted content types.
	pub fn accept(&self, content_type: &str, body: &[u8]) -> Result<TaskMessage, TaskRejectedError> {
		if !self.accepts(content_type) {
			return Err(TaskRejectedError::UnsupportedContentType {
				content_type: content_type.to_owned(),
			});
		}

		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| TaskRejectedError::Decode { source })
	}

	/// Returns true when `content_type` (parameters ignored) is accepted.
	pub fn accepts(&self, content_type: &str) -> bool {
		let essence = mime_essence(content_type);

		self.accept_content.iter().any(|accepted| accepted.eq_ignore_ascii_case(essence))
	}
}
impl TryFrom<RawTaskEnvelope> for TaskEnvelope {
	type Error = ConfigError;

	fn try_from(raw: RawTaskEnvelope) -> Result<Self, Self::Error> {
		Self::new(raw.task_serializer, raw.result_serializer, raw.accept_content)
	}
}
impl Default for TaskEnvelope {
	fn default() -> Self {
		Self::json()
	}
}

#[derive(Deserialize)]
struct RawTaskEnvelope {
	accept_content: Vec<String>,
	task_serializer: Serializer,
	result_serializer: Serializer,
}

fn mime_essence(content_type: &str) -> &str {
	content_type.split(';').next().unwrap_or_default().trim()
}

fn is_json(content_type: &str) -> bool {
	mime_essence(content_type).eq_ignore_ascii_case(JSON_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn non_json_serializers_are_inconsistent() {
		let err = TaskEnvelope::new(Serializer::Json, Serializer::Pickle, [JSON_CONTENT_TYPE])
			.expect_err("Result serializer must match.");

		assert!(matches!(err, ConfigError::SerializerMismatch { .. }));
		assert!(
			TaskEnvelope::new(Serializer::Json, Serializer::Json, ["application/x-yaml"]).is_err()
		);
		assert!(TaskEnvelope::new(Serializer::Json, Serializer::Json, Vec::<String>::new()).is_err());
	}

	#[test]
	fn content_type_parameters_are_ignored() {
		let envelope = TaskEnvelope::json();

		assert!(envelope.accepts("Application/JSON; charset=utf-8"));
		assert!(!envelope.accepts(Serializer::Pickle.content_type()));
		assert_eq!(envelope.content_type(), JSON_CONTENT_TYPE);
	}

	#[test]
	fn deserialization_enforces_json_only_contract() {
		let envelope: TaskEnvelope = serde_json::from_value(
			serde_json::to_value(TaskEnvelope::json()).expect("Envelope should serialize."),
		)
		.expect("JSON envelope should deserialize.");

		assert_eq!(envelope, TaskEnvelope::json());

		let err = serde_json::from_str::<TaskEnvelope>(
			r#"{"accept_content":["application/x-python-serialize"],"task_serializer":"pickle","result_serializer":"json"}"#,
		)
		.expect_err("Pickle envelope must be refused.");

		assert!(err.to_string().contains("pickle"));
	}
}
