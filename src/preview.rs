//! Wall-clock preview: renders the overlay once per display refresh for interactive feedback.
//!
//! Preview frames are not deterministic (their times come from the system clock); exports
//! never go through this module.

pub(crate) mod driver;
#[cfg(feature = "preview")]
pub(crate) mod window;
