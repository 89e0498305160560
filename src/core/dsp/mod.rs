//! Digital Signal Processing utilities

pub mod filters;
pub mod power;
pub mod stats;
pub mod windows;

pub use filters::{equalizer_mask, polyphase_fold};
pub use power::SpecPowerMeter;
pub use stats::{accumulate, arg_max, mean, rms};
pub use windows::sinc_hann;
