// self
use crate::{_prelude::*, obs::LoginStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedLogin<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedLogin<F> = F;

/// Span covering one stage of a federated login.
#[derive(Clone, Debug)]
pub struct LoginSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl LoginSpan {
	/// Creates a new span tagged with the provider name + stage.
	pub fn new(provider: &str, stage: LoginStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"superset_config.login",
				provider,
				stage = stage.as_str()
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> LoginSpanGuard {
		#[cfg(feature = "tracing")]
		{
			LoginSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			LoginSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedLogin<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`LoginSpan::entered`].
pub struct LoginSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for LoginSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("LoginSpanGuard(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn login_span_enters_regardless_of_features() {
		let _guard = LoginSpan::new("google", LoginStage::Redirect).entered();
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = LoginSpan::new("kobocat", LoginStage::UserInfo);
		let value = span.instrument(async { 7 }).await;

		assert_eq!(value, 7);
	}
}
