//! Federation providers: descriptors (data), the credential-driven registry, and per-provider
//! identity normalization (behavior).
//!
//! `descriptor` holds the immutable metadata of a single provider, including its endpoints,
//! credentials, and optional e-mail allow-list. `registry` resolves the active provider set from
//! a [`CredentialSource`](crate::config::CredentialSource). `identity` maps a provider's raw
//! user payload into a [`NormalizedIdentity`].

pub mod descriptor;
pub mod identity;
pub mod registry;

pub use descriptor::*;
pub use identity::*;
pub use registry::*;

pub use crate::auth::ProviderId;
