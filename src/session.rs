//! Playback session
//!
//! Owns the start/stop state and the status text shown to the user. The
//! first press of the start button initialises the session; after that the
//! button toggles between playing and paused. The mapper only ever sees the
//! resulting `is_playing` flag.

use tracing::{debug, info, warn};

use crate::mapping::{Frame, MotionMapper};
use crate::motion::MotionSample;

pub const STATUS_READY: &str = "Press start, then move your device";
pub const STATUS_LISTENING: &str = "Move your device to create sound";
pub const STATUS_PAUSED: &str = "Paused";
pub const STATUS_IDLE: &str = "Move device to create sound";
pub const STATUS_DENIED: &str = "Motion permission denied";
pub const STATUS_INIT_ERROR: &str = "Error initializing motion sensors";

/// Whether samples are turned into sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Active,
}

/// Why a session could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFailure {
    /// The sensor refused access
    Denied,
    /// Anything else went wrong while opening the sensor or audio
    Error,
}

impl StartFailure {
    /// Classify a start error by the io error underneath it, if any
    pub fn from_error(err: &anyhow::Error) -> Self {
        let denied = err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
            .any(|io| io.kind() == std::io::ErrorKind::PermissionDenied);
        if denied {
            StartFailure::Denied
        } else {
            StartFailure::Error
        }
    }
}

/// Play/pause state plus what the status line should say
pub struct Session {
    mapper: MotionMapper,
    initialized: bool,
    state: PlaybackState,
    status: String,
}

impl Session {
    pub fn new(mapper: MotionMapper) -> Self {
        Self {
            mapper,
            initialized: false,
            state: PlaybackState::Idle,
            status: STATUS_READY.to_string(),
        }
    }

    pub fn mapper(&self) -> &MotionMapper {
        &self.mapper
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Active
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Label for the start/stop button
    pub fn button_label(&self) -> &'static str {
        if self.is_playing() {
            "Stop"
        } else {
            "Start moving!"
        }
    }

    /// Press the start/stop button
    ///
    /// The first press initialises and starts playing; later presses toggle.
    pub fn press(&mut self) -> PlaybackState {
        if !self.initialized {
            self.initialized = true;
            self.set_state(PlaybackState::Active);
            info!("session initialized");
        } else {
            let next = match self.state {
                PlaybackState::Active => PlaybackState::Idle,
                PlaybackState::Idle => PlaybackState::Active,
            };
            self.set_state(next);
        }
        self.state
    }

    /// Explicit start; no-op when already playing
    pub fn start(&mut self) {
        if self.initialized && self.is_playing() {
            return;
        }
        if !self.initialized {
            self.initialized = true;
            info!("session initialized");
        }
        self.set_state(PlaybackState::Active);
    }

    /// Explicit stop; no-op when already paused
    pub fn stop(&mut self) {
        if self.initialized {
            self.set_state(PlaybackState::Idle);
        }
    }

    /// Record that the sensor or audio could not be opened
    pub fn fail_initialization(&mut self, failure: StartFailure) {
        warn!(?failure, "session failed to start");
        self.initialized = false;
        self.state = PlaybackState::Idle;
        self.status = match failure {
            StartFailure::Denied => STATUS_DENIED,
            StartFailure::Error => STATUS_INIT_ERROR,
        }
        .to_string();
    }

    /// Map one sample and update the status line
    pub fn on_motion_sample(&mut self, sample: MotionSample) -> Frame {
        let frame = self.mapper.on_motion_sample(sample, self.is_playing());

        match &frame {
            Frame::Render(command) => {
                self.status = format!("Playing note: {}", command.params.note);
            }
            Frame::Idle { display: Some(_) } => {
                self.status = STATUS_IDLE.to_string();
            }
            Frame::Idle { display: None } => {}
        }

        frame
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "playback state change");
        }
        self.state = state;
        self.status = match state {
            PlaybackState::Active => STATUS_LISTENING,
            PlaybackState::Idle => STATUS_PAUSED,
        }
        .to_string();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MotionMapper::default())
    }
}
