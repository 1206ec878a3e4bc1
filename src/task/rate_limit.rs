//! Per-task rate-limit annotations consumed by the worker runtime.

// self
use crate::_prelude::*;

/// Time window of a [`RateLimit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateUnit {
	/// Per second (`/s`).
	Second,
	/// Per minute (`/m`).
	Minute,
	/// Per hour (`/h`).
	Hour,
}
impl RateUnit {
	/// Returns the suffix used in the textual form.
	pub const fn as_str(self) -> &'static str {
		match self {
			RateUnit::Second => "s",
			RateUnit::Minute => "m",
			RateUnit::Hour => "h",
		}
	}

	/// Length of the window.
	pub const fn window(self) -> Duration {
		match self {
			RateUnit::Second => Duration::SECOND,
			RateUnit::Minute => Duration::MINUTE,
			RateUnit::Hour => Duration::HOUR,
		}
	}
}

/// Error returned when a rate-limit string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Rate limit `{raw}` must look like `10/s`, `100/m`, or `5/h`.")]
pub struct RateLimitParseError {
	/// Offending input.
	pub raw: String,
}

/// Ceiling on how many tasks of one type a worker may start per window (e.g. `10/s`).
///
/// The limit is advisory metadata; enforcement belongs to the worker runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RateLimit {
	/// Tasks admitted per window; always positive.
	pub count: u32,
	/// Window length.
	pub unit: RateUnit,
}
impl RateLimit {
	/// Creates a per-second limit.
	pub const fn per_second(count: u32) -> Self {
		Self { count, unit: RateUnit::Second }
	}

	/// Minimum spacing between two task starts under this limit.
	pub fn min_interval(self) -> Duration {
		self.unit.window() / self.count
	}
}
impl FromStr for RateLimit {
	type Err = RateLimitParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || RateLimitParseError { raw: s.to_owned() };
		let (count, unit) = match s.trim().split_once('/') {
			Some((count, unit)) => (count.trim(), unit.trim()),
			None => (s.trim(), "s"),
		};
		let unit = match unit {
			"s" => RateUnit::Second,
			"m" => RateUnit::Minute,
			"h" => RateUnit::Hour,
			_ => return Err(err()),
		};
		let count = count.parse::<u32>().ok().filter(|c| *c > 0).ok_or_else(err)?;

		Ok(Self { count, unit })
	}
}
impl TryFrom<String> for RateLimit {
	type Error = RateLimitParseError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
impl From<RateLimit> for String {
	fn from(value: RateLimit) -> Self {
		value.to_string()
	}
}
impl Display for RateLimit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}", self.count, self.unit.as_str())
	}
}

/// Worker-side annotations attached to a task type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAnnotation {
	/// Rate ceiling, if any.
	pub rate_limit: Option<RateLimit>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_units_and_bare_counts() {
		assert_eq!("10/s".parse::<RateLimit>(), Ok(RateLimit::per_second(10)));
		assert_eq!(
			"100/m".parse::<RateLimit>(),
			Ok(RateLimit { count: 100, unit: RateUnit::Minute })
		);
		assert_eq!(" 5 / h ".parse::<RateLimit>().map(|r| r.to_string()), Ok("5/h".into()));
		assert_eq!("3".parse::<RateLimit>(), Ok(RateLimit::per_second(3)));
	}

	#[test]
	fn rejects_zero_and_unknown_units() {
		assert!("0/s".parse::<RateLimit>().is_err());
		assert!("10/d".parse::<RateLimit>().is_err());
		assert!("ten/s".parse::<RateLimit>().is_err());
	}

	#[test]
	fn min_interval_spreads_window() {
		assert_eq!(RateLimit::per_second(10).min_interval(), Duration::milliseconds(100));
	}

	#[test]
	fn serializes_as_text() {
		let annotation = TaskAnnotation { rate_limit: Some(RateLimit::per_second(10)) };
		let payload =
			serde_json::to_string(&annotation).expect("Annotation should serialize to JSON.");

		assert_eq!(payload, "{\"rate_limit\":\"10/s\"}");
	}
}
