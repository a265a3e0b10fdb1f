//! Shared user interface components.

pub mod typewriter;

pub use typewriter::TypewriterAnimation;
