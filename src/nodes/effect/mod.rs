//! Audio effect nodes (processors with audio inputs and outputs)

mod gain;
mod panner;

pub use gain::Gain;
pub use panner::StereoPanner;
