//! The live set of binaural tone pairs.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::backend::{AudioBackend, Pan, Voice};
use crate::context::AudioDeviceContext;

/// One base frequency rendered in stereo: the base tone in the left ear, the
/// base tone plus the beat offset in the right ear.
pub struct TonePair<V> {
    base_frequency: f32,
    left: V,
    right: V,
}

impl<V: Voice> TonePair<V> {
    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn left_frequency(&self) -> f32 {
        self.left.frequency()
    }

    /// Target frequency of the right voice (the ramp may still be running)
    pub fn right_frequency(&self) -> f32 {
        self.right.frequency()
    }

    pub fn left(&self) -> &V {
        &self.left
    }

    pub fn right(&self) -> &V {
        &self.right
    }
}

/// Owns every voice of the current session.
///
/// Idle until [`start`](Self::start), active until [`stop`](Self::stop) or
/// the next `start`. All three operations are total: they are safe to call
/// in any state, in any order, any number of times.
pub struct ToneSession<V> {
    pairs: Vec<TonePair<V>>,
    beat_offset: i32,
    ramp_time_constant: Duration,
}

impl<V: Voice> ToneSession<V> {
    pub fn new(beat_offset: i32, ramp_time_constant: Duration) -> Self {
        Self {
            pairs: Vec::new(),
            beat_offset,
            ramp_time_constant,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.pairs.is_empty()
    }

    /// Pairs in creation order
    pub fn pairs(&self) -> &[TonePair<V>] {
        &self.pairs
    }

    pub fn beat_offset(&self) -> i32 {
        self.beat_offset
    }

    /// `(left, right)` frequencies of every pair, in creation order
    pub fn frequencies(&self) -> Vec<(f32, f32)> {
        self.pairs
            .iter()
            .map(|pair| (pair.left_frequency(), pair.right_frequency()))
            .collect()
    }

    /// Replace the current session with one pair per usable base frequency.
    ///
    /// The previous session is torn down completely before the first new
    /// voice exists. NaN, infinite and non-positive entries are skipped.
    /// Without a ready device this only does the teardown.
    pub fn start<B>(&mut self, ctx: &mut AudioDeviceContext<B>, base_frequencies: &[f32], beat_offset: i32)
    where
        B: AudioBackend<Voice = V>,
    {
        self.stop(ctx);

        if !ctx.is_ready() {
            return;
        }
        ctx.resume_if_suspended();
        let backend = match ctx.backend_mut() {
            Some(backend) => backend,
            None => return,
        };

        self.beat_offset = beat_offset;
        for &base in base_frequencies {
            if !base.is_finite() || base <= 0.0 {
                debug!(base, "skipping unusable base frequency");
                continue;
            }
            match spawn_pair(backend, base, beat_offset) {
                Some(pair) => self.pairs.push(pair),
                None => warn!(base, "could not start tone pair, skipping"),
            }
        }

        debug!(pairs = self.pairs.len(), beat_offset, "session started");
    }

    /// Glide every right voice to `base + beat_offset`. Left voices are left
    /// alone. No-op when idle.
    pub fn retune(&mut self, beat_offset: i32) {
        if !self.is_active() {
            return;
        }
        self.beat_offset = beat_offset;

        let time_constant = self.ramp_time_constant;
        for pair in &mut self.pairs {
            let target = pair.base_frequency + beat_offset as f32;
            if let Err(e) = pair.right.ramp_frequency(target, time_constant) {
                trace!(base = pair.base_frequency, "retune not applied: {}", e);
            }
        }
    }

    /// Halt and disconnect every voice, then forget the pairs.
    ///
    /// Voices the device already finished on its own are expected here and
    /// not treated as errors.
    pub fn stop<B>(&mut self, ctx: &mut AudioDeviceContext<B>)
    where
        B: AudioBackend<Voice = V>,
    {
        if self.pairs.is_empty() {
            return;
        }

        let pairs = std::mem::take(&mut self.pairs);
        let backend = match ctx.backend_mut() {
            Some(backend) => backend,
            None => return,
        };
        for pair in pairs {
            release(backend, pair.left);
            release(backend, pair.right);
        }
        debug!("session stopped");
    }
}

fn spawn_pair<B: AudioBackend>(backend: &mut B, base: f32, beat_offset: i32) -> Option<TonePair<B::Voice>> {
    let left = match backend.spawn_voice(base, Pan::Left) {
        Ok(voice) => voice,
        Err(e) => {
            debug!(base, "left voice failed: {}", e);
            return None;
        }
    };
    let right = match backend.spawn_voice(base + beat_offset as f32, Pan::Right) {
        Ok(voice) => voice,
        Err(e) => {
            debug!(base, "right voice failed: {}", e);
            release(backend, left);
            return None;
        }
    };
    Some(TonePair {
        base_frequency: base,
        left,
        right,
    })
}

fn release<B: AudioBackend>(backend: &mut B, voice: B::Voice) {
    if let Err(e) = backend.release_voice(voice) {
        trace!("voice release: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{FakeBackend, FakeVoice, Recorder};
    use crate::backend::DeviceState;
    use crate::error::EngineError;

    const RAMP: Duration = Duration::from_millis(15);

    fn ready_context() -> (AudioDeviceContext<FakeBackend>, Recorder) {
        let backend = FakeBackend::new();
        let recorder = backend.recorder();
        let mut slot = Some(backend);
        let mut ctx = AudioDeviceContext::new(move || slot.take().ok_or(EngineError::DeviceBusy));
        ctx.ensure_ready();
        (ctx, recorder)
    }

    fn session() -> ToneSession<FakeVoice> {
        ToneSession::new(5, RAMP)
    }

    #[test]
    fn start_creates_one_pair_per_frequency() {
        let (mut ctx, recorder) = ready_context();
        let mut session = session();

        session.start(&mut ctx, &[432.0, 963.0], 5);

        assert_eq!(session.frequencies(), vec![(432.0, 437.0), (963.0, 968.0)]);
        assert_eq!(recorder.borrow().live.len(), 4);
        let left_on_device = recorder.borrow().live.values().filter(|v| v.pan == Pan::Left).count();
        assert_eq!(left_on_device, 2);
        for pair in session.pairs() {
            assert_eq!(pair.left().pan(), Pan::Left);
            assert_eq!(pair.right().pan(), Pan::Right);
        }
    }

    #[test]
    fn retune_moves_only_right_voices() {
        let (mut ctx, recorder) = ready_context();
        let mut session = session();
        session.start(&mut ctx, &[432.0, 963.0], 5);

        session.retune(8);

        assert_eq!(session.frequencies(), vec![(432.0, 440.0), (963.0, 971.0)]);
        assert_eq!(session.beat_offset(), 8);
        let device = recorder.borrow();
        // Nothing was recreated
        assert_eq!(device.spawned, 4);
        let right_ids: Vec<u32> = session.pairs().iter().map(|p| p.right().id()).collect();
        assert_eq!(device.ramps.len(), 2);
        for (id, _, time_constant) in &device.ramps {
            assert!(right_ids.contains(id));
            assert_eq!(*time_constant, RAMP);
        }
    }

    #[test]
    fn retune_when_idle_is_a_no_op() {
        let (_ctx, recorder) = ready_context();
        let mut session = session();
        session.retune(9);
        assert_eq!(session.beat_offset(), 5);
        assert!(recorder.borrow().ramps.is_empty());
    }

    #[test]
    fn stop_twice_is_the_same_as_once() {
        let (mut ctx, recorder) = ready_context();
        let mut session = session();
        session.start(&mut ctx, &[432.0, 963.0], 5);

        session.stop(&mut ctx);
        assert!(!session.is_active());
        assert!(recorder.borrow().live.is_empty());
        assert_eq!(recorder.borrow().released.len(), 4);

        session.stop(&mut ctx);
        assert!(!session.is_active());
        assert_eq!(recorder.borrow().released.len(), 4);
    }

    #[test]
    fn restart_tears_down_before_creating() {
        let (mut ctx, recorder) = ready_context();
        let mut session = session();
        session.start(&mut ctx, &[432.0, 963.0], 5);
        session.start(&mut ctx, &[528.0, 888.0], 3);

        let device = recorder.borrow();
        // Two sessions of four voices never overlapped
        assert_eq!(device.peak_live, 4);
        assert_eq!(device.live.len(), 4);
        assert_eq!(device.released, vec![0, 1, 2, 3]);
        assert_eq!(session.frequencies(), vec![(528.0, 531.0), (888.0, 891.0)]);
    }

    #[test]
    fn unusable_frequencies_are_skipped() {
        let (mut ctx, _recorder) = ready_context();
        let mut session = session();
        session.start(&mut ctx, &[f32::NAN, 528.0, f32::INFINITY, -3.0, 0.0], 5);
        assert_eq!(session.frequencies(), vec![(528.0, 533.0)]);
    }

    #[test]
    fn self_finalized_voices_release_quietly() {
        let (mut ctx, recorder) = ready_context();
        let mut session = session();
        session.start(&mut ctx, &[432.0], 5);
        for voice in recorder.borrow_mut().live.values_mut() {
            voice.finalized = true;
        }

        session.stop(&mut ctx);
        assert!(!session.is_active());
        assert!(recorder.borrow().live.is_empty());
    }

    #[test]
    fn start_without_device_is_a_no_op() {
        let mut ctx = AudioDeviceContext::<FakeBackend>::new(|| Err(EngineError::unavailable("denied")));
        ctx.ensure_ready();
        let mut session = session();
        session.start(&mut ctx, &[432.0], 5);
        assert!(!session.is_active());
        session.retune(7);
        session.stop(&mut ctx);
    }

    #[test]
    fn start_resumes_a_suspended_device() {
        let (mut ctx, recorder) = ready_context();
        ctx.backend_mut().unwrap().suspend().unwrap();
        let mut session = session();
        session.start(&mut ctx, &[432.0], 5);
        assert_eq!(recorder.borrow().state, DeviceState::Running);
    }

    #[test]
    fn half_built_pairs_are_released() {
        let (mut ctx, recorder) = ready_context();
        // Fourth spawn fails: the second pair gets its left voice only
        recorder.borrow_mut().spawn_limit = Some(3);
        let mut session = session();
        session.start(&mut ctx, &[432.0, 963.0], 5);

        assert_eq!(session.frequencies(), vec![(432.0, 437.0)]);
        assert_eq!(recorder.borrow().live.len(), 2);
        assert_eq!(recorder.borrow().released, vec![2]);
    }

    #[test]
    fn documented_scenario() {
        let (mut ctx, recorder) = ready_context();
        let mut session = session();

        session.start(&mut ctx, &[432.0, 963.0], 5);
        assert_eq!(session.frequencies(), vec![(432.0, 437.0), (963.0, 968.0)]);

        session.retune(8);
        assert_eq!(session.frequencies(), vec![(432.0, 440.0), (963.0, 971.0)]);

        session.stop(&mut ctx);
        assert!(session.frequencies().is_empty());
        assert!(recorder.borrow().live.is_empty());

        session.start(&mut ctx, &[f32::NAN, 528.0], 5);
        assert_eq!(session.frequencies(), vec![(528.0, 533.0)]);
        assert_eq!(recorder.borrow().live.len(), 2);
    }
}
