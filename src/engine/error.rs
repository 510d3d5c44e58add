// Error taxonomy for the simulation core
//
// Every failure here is local to the offending call: the frame pipeline keeps
// running after any of them.

use crate::engine::physics::BodyHandle;
use crate::engine::registry::BindingId;

/// Misuse of the registry or the physics world configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Body {0:?} is already bound")]
    DuplicateBinding(BodyHandle),

    #[error("Unknown binding: {0}")]
    UnknownBinding(BindingId),

    #[error("Unknown body: {0:?}")]
    UnknownBody(BodyHandle),

    #[error("Contact rule for ({a}, {b}) registered twice; the last registration wins")]
    DuplicateContactRule { a: String, b: String },
}

/// A frame delta that cannot be fed to the fixed-step driver as-is
///
/// The driver treats the delta as zero and reports this instead of stepping
/// backwards.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TimingAnomaly {
    #[error("Negative frame delta: {0}s")]
    Negative(f64),

    #[error("Frame delta is not a number")]
    NotANumber,
}
