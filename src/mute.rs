//! Mute state, applied to the master volume node.

use crate::backend::AudioBackend;
use crate::context::AudioDeviceContext;

/// Which icon the mute button shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuteIcon {
    Muted,
    Unmuted,
}

/// Boolean mute flag that outlives sessions.
///
/// Muted means master gain 0, unmuted means the nominal gain. The control is
/// disabled when the device failed to open; toggling then does nothing.
#[derive(Clone, Debug)]
pub struct MuteControl {
    muted: bool,
    nominal_gain: f32,
    enabled: bool,
}

impl MuteControl {
    pub fn new(nominal_gain: f32) -> Self {
        Self {
            muted: false,
            nominal_gain: nominal_gain.clamp(0.0, 1.0),
            enabled: true,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn nominal_gain(&self) -> f32 {
        self.nominal_gain
    }

    /// The master gain this state asks for
    pub fn effective_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.nominal_gain
        }
    }

    pub fn icon(&self) -> MuteIcon {
        if self.muted {
            MuteIcon::Muted
        } else {
            MuteIcon::Unmuted
        }
    }

    /// Flip the state and push the new gain to the device, if there is one.
    ///
    /// Returns the new state. A disabled control stays as it is.
    pub fn toggle<B: AudioBackend>(&mut self, ctx: &mut AudioDeviceContext<B>) -> bool {
        if !self.enabled {
            return self.muted;
        }
        self.muted = !self.muted;
        self.apply(ctx);
        self.muted
    }

    /// Push the current gain to the device, if there is one
    pub fn apply<B: AudioBackend>(&self, ctx: &mut AudioDeviceContext<B>) {
        ctx.set_volume(self.effective_gain());
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::error::EngineError;

    #[test]
    fn toggle_drives_master_gain() {
        let mut ctx = AudioDeviceContext::new(|| Ok(FakeBackend::new()));
        ctx.ensure_ready();
        let mut mute = MuteControl::new(0.05);

        assert!(mute.toggle(&mut ctx));
        assert_eq!(ctx.volume(), Some(0.0));
        assert_eq!(mute.icon(), MuteIcon::Muted);

        assert!(!mute.toggle(&mut ctx));
        assert_eq!(ctx.volume(), Some(0.05));
        assert_eq!(mute.icon(), MuteIcon::Unmuted);
    }

    #[test]
    fn toggle_before_device_only_flips_state() {
        let mut ctx = AudioDeviceContext::new(|| Ok(FakeBackend::new()));
        let mut mute = MuteControl::new(0.05);
        assert!(mute.toggle(&mut ctx));
        assert_eq!(ctx.volume(), None);

        ctx.ensure_ready();
        mute.apply(&mut ctx);
        assert_eq!(ctx.volume(), Some(0.0));
    }

    #[test]
    fn disabled_control_does_not_toggle() {
        let mut ctx = AudioDeviceContext::<FakeBackend>::new(|| Err(EngineError::unavailable("denied")));
        ctx.ensure_ready();
        let mut mute = MuteControl::new(0.05);
        mute.disable();

        assert!(!mute.toggle(&mut ctx));
        assert!(!mute.is_muted());
        assert!(!mute.is_enabled());
    }
}
