//! Dedicated queue route shared by every dispatched task.

// self
use crate::{_prelude::*, auth::QueueName};

/// Queue plus the routing key that delivers tasks to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueRoute {
	/// Broker queue name.
	pub queue: QueueName,
	/// Routing key bound to the queue.
	pub routing_key: String,
}
impl QueueRoute {
	/// Name used for both the queue and its routing key unless overridden.
	pub const DEFAULT_NAME: &'static str = "superset";

	/// Creates a route whose routing key equals the queue name.
	pub fn dedicated(queue: QueueName) -> Self {
		let routing_key = queue.to_string();

		Self { queue, routing_key }
	}
}
impl Display for QueueRoute {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}({})", self.queue, self.routing_key)
	}
}
