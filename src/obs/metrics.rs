// self
use crate::obs::LoginOutcomeKind;

/// Records a login outcome via the global metrics recorder (when enabled).
pub fn record_login_outcome(provider: &str, outcome: LoginOutcomeKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"superset_config_login_total",
			"provider" => provider.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_login_outcome_noop_without_metrics() {
		record_login_outcome("google", LoginOutcomeKind::Rejected);
	}
}
