//! In-memory device for exercising session logic without audio hardware.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use super::{AudioBackend, DeviceState, Pan, Voice};
use crate::error::{EngineError, Result};

#[derive(Debug)]
pub(crate) struct FakeVoiceState {
    pub frequency: f32,
    pub pan: Pan,
    /// Set to simulate the device finishing the voice by itself
    pub finalized: bool,
}

/// Everything the fake device has been asked to do.
#[derive(Debug)]
pub(crate) struct FakeDevice {
    pub state: DeviceState,
    pub master_gain: f32,
    pub live: BTreeMap<u32, FakeVoiceState>,
    pub spawned: u32,
    pub released: Vec<u32>,
    pub resumes: usize,
    /// Ramps issued as (voice id, target, time constant)
    pub ramps: Vec<(u32, f32, Duration)>,
    /// Voice spawns fail once this many voices have been spawned
    pub spawn_limit: Option<u32>,
    /// Largest number of voices alive at once
    pub peak_live: usize,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            state: DeviceState::Running,
            master_gain: 1.0,
            live: BTreeMap::new(),
            spawned: 0,
            released: Vec::new(),
            resumes: 0,
            ramps: Vec::new(),
            spawn_limit: None,
            peak_live: 0,
        }
    }
}

pub(crate) type Recorder = Rc<RefCell<FakeDevice>>;

pub(crate) struct FakeBackend {
    device: Recorder,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            device: Rc::new(RefCell::new(FakeDevice::default())),
        }
    }

    /// Shared view of the device, still valid after the backend moves
    pub fn recorder(&self) -> Recorder {
        self.device.clone()
    }
}

pub(crate) struct FakeVoice {
    id: u32,
    frequency: f32,
    pan: Pan,
    device: Recorder,
}

impl FakeVoice {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Voice for FakeVoice {
    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn pan(&self) -> Pan {
        self.pan
    }

    fn ramp_frequency(&mut self, target: f32, time_constant: Duration) -> Result<()> {
        let mut device = self.device.borrow_mut();
        let voice = device
            .live
            .get_mut(&self.id)
            .ok_or(EngineError::VoiceFinalized)?;
        voice.frequency = target;
        device.ramps.push((self.id, target, time_constant));
        self.frequency = target;
        Ok(())
    }
}

impl AudioBackend for FakeBackend {
    type Voice = FakeVoice;

    fn state(&self) -> DeviceState {
        self.device.borrow().state
    }

    fn resume(&mut self) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.state = DeviceState::Running;
        device.resumes += 1;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.device.borrow_mut().state = DeviceState::Suspended;
        Ok(())
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.device.borrow_mut().master_gain = gain;
    }

    fn master_gain(&self) -> f32 {
        self.device.borrow().master_gain
    }

    fn spawn_voice(&mut self, frequency: f32, pan: Pan) -> Result<FakeVoice> {
        let mut device = self.device.borrow_mut();
        if device.spawn_limit.map_or(false, |limit| device.spawned >= limit) {
            return Err(EngineError::unavailable("fake spawn limit reached"));
        }
        let id = device.spawned;
        device.spawned += 1;
        device.live.insert(
            id,
            FakeVoiceState {
                frequency,
                pan,
                finalized: false,
            },
        );
        device.peak_live = device.peak_live.max(device.live.len());

        Ok(FakeVoice {
            id,
            frequency,
            pan,
            device: self.device.clone(),
        })
    }

    fn release_voice(&mut self, voice: FakeVoice) -> Result<()> {
        let mut device = self.device.borrow_mut();
        device.released.push(voice.id);
        match device.live.remove(&voice.id) {
            Some(state) if state.finalized => Err(EngineError::VoiceFinalized),
            Some(_) => Ok(()),
            None => Err(EngineError::VoiceFinalized),
        }
    }

    fn live_voices(&self) -> usize {
        self.device.borrow().live.len()
    }
}
