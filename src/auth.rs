//! Authentication mode selection, login attempts, identifiers, and redacted secrets.

pub mod id;
pub mod login;
pub mod mode;
pub mod secret;

pub use id::*;
pub use login::*;
pub use mode::*;
pub use secret::*;
