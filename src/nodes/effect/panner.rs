//! Equal-power stereo panner

use core::f32::consts::FRAC_PI_2;

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};

/// Places a mono input in the stereo field at a fixed position.
///
/// -1.0 = hard left, 0.0 = center, 1.0 = hard right.
/// Uses the equal-power law: at the extremes one side gets the full signal
/// and the other gets nothing.
pub struct StereoPanner {
    pan: f32,
}

impl StereoPanner {
    pub fn new(pan: f32) -> Self {
        Self { pan: pan.clamp(-1.0, 1.0) }
    }

    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// (left, right) gains for the current pan position
    pub fn gains(&self) -> (f32, f32) {
        // Exact at the hard extremes, cos(pi/2) is not quite zero in f32
        if self.pan <= -1.0 {
            return (1.0, 0.0);
        }
        if self.pan >= 1.0 {
            return (0.0, 1.0);
        }
        let x = (self.pan + 1.0) * 0.5 * FRAC_PI_2;
        (x.cos(), x.sin())
    }
}

impl AudioNode for StereoPanner {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        let source = inputs.first().and_then(|input| input.buffers().first());
        let source = match source {
            Some(buffer) => buffer,
            None => {
                for buffer in outputs.iter_mut() {
                    buffer.iter_mut().for_each(|s| *s = 0.0);
                }
                return;
            }
        };

        let (left, right) = self.gains();
        for (ch, out_buffer) in outputs.iter_mut().enumerate() {
            let g = if ch == 0 { left } else { right };
            for (out_sample, in_sample) in out_buffer.iter_mut().zip(source.iter()) {
                *out_sample = in_sample * g;
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_extremes_are_exclusive() {
        assert_eq!(StereoPanner::new(-1.0).gains(), (1.0, 0.0));
        assert_eq!(StereoPanner::new(1.0).gains(), (0.0, 1.0));
    }

    #[test]
    fn center_is_equal_power() {
        let (l, r) = StereoPanner::new(0.0).gains();
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pan_is_clamped() {
        assert_eq!(StereoPanner::new(-4.0).pan(), -1.0);
        assert_eq!(StereoPanner::new(9.0).pan(), 1.0);
    }
}
