//! MIDI output for Sway.
//!
//! Sends each triggered note to a MIDI port, with brightness and reverb as
//! control changes. Note-offs are scheduled on the output thread.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use midir::MidiOutput;
use tracing::{debug, info, warn};

use super::SoundRenderer;
use crate::config::SwayConfig;
use crate::mapping::{linear_rescale, EffectParams, SynthParams, FM_DECAY_RANGE_SECS};

/// How long the output thread sleeps when no note-off is due
const IDLE_POLL: Duration = Duration::from_millis(100);

/// "All notes off" channel mode message
const ALL_NOTES_OFF_CC: u8 = 123;

/// MIDI message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on: channel (0-15), note (0-127), velocity (0-127)
    NoteOn(u8, u8, u8),
    /// Note off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff(u8, u8, u8),
    /// Control change: channel (0-15), controller (0-127), value (0-127)
    ControlChange(u8, u8, u8),
}

impl MidiMessage {
    /// Convert to raw MIDI bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOn(ch, note, vel) => vec![0x90 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::NoteOff(ch, note, vel) => {
                vec![0x80 | (ch & 0x0F), note & 0x7F, vel & 0x7F]
            }
            MidiMessage::ControlChange(ch, ctrl, val) => {
                vec![0xB0 | (ch & 0x0F), ctrl & 0x7F, val & 0x7F]
            }
        }
    }
}

/// How synthesis parameters turn into controller values.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiScaling {
    pub channel: u8,
    pub brightness_cc: u8,
    pub reverb_cc: u8,
    pub filter_min_hz: f64,
    pub filter_max_hz: f64,
    pub reverb_max: f64,
}

impl MidiScaling {
    pub fn from_config(config: &SwayConfig) -> Self {
        Self {
            channel: config.midi.channel,
            brightness_cc: config.midi.brightness_cc,
            reverb_cc: config.midi.reverb_cc,
            filter_min_hz: config.mapping.filter_min_hz,
            filter_max_hz: config.mapping.filter_max_hz,
            reverb_max: config.mapping.reverb_max,
        }
    }
}

impl Default for MidiScaling {
    fn default() -> Self {
        Self::from_config(&SwayConfig::default())
    }
}

fn to_7bit(normalized: f64) -> u8 {
    (normalized.clamp(0.0, 1.0) * 127.0).round() as u8
}

/// Messages for one note trigger: both controllers, then the note-on.
pub fn midi_messages(params: &SynthParams, scaling: &MidiScaling) -> Vec<MidiMessage> {
    let brightness = linear_rescale(
        params.filter_hz,
        scaling.filter_min_hz,
        scaling.filter_max_hz,
        0.0,
        1.0,
    );
    let reverb = match params.effects {
        EffectParams::Reverb { amount } if scaling.reverb_max > 0.0 => amount / scaling.reverb_max,
        EffectParams::Reverb { .. } => 0.0,
        EffectParams::Spatial {
            reverb_decay_secs, ..
        } => linear_rescale(
            reverb_decay_secs,
            FM_DECAY_RANGE_SECS.0,
            FM_DECAY_RANGE_SECS.1,
            0.0,
            1.0,
        ),
    };
    // Velocity 0 would read as a note-off
    let velocity = to_7bit(params.velocity()).max(1);

    vec![
        MidiMessage::ControlChange(scaling.channel, scaling.brightness_cc, to_7bit(brightness)),
        MidiMessage::ControlChange(scaling.channel, scaling.reverb_cc, to_7bit(reverb)),
        MidiMessage::NoteOn(scaling.channel, params.note.midi_note(), velocity),
    ]
}

enum MidiCommand {
    Note {
        messages: Vec<MidiMessage>,
        note: u8,
        hold: Duration,
    },
    AllOff,
    Stop,
}

/// MIDI output renderer.
pub struct MidiRenderer {
    sender: Sender<MidiCommand>,
    scaling: MidiScaling,
    note_length: Duration,
    port_name: String,
}

impl MidiRenderer {
    /// Connect to the first port whose name contains `port_name`, or the
    /// first port available.
    pub fn new(port_name: Option<&str>, scaling: MidiScaling, note_length_secs: f64) -> Result<Self> {
        let midi_out = MidiOutput::new("Sway MIDI Output")?;
        let ports = midi_out.ports();

        if ports.is_empty() {
            return Err(anyhow!("No MIDI output ports available"));
        }

        let port = if let Some(name) = port_name {
            ports
                .iter()
                .find(|p| {
                    midi_out
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| anyhow!("MIDI port '{}' not found", name))?
                .clone()
        } else {
            ports[0].clone()
        };

        let port_name_actual = midi_out.port_name(&port)?;
        let conn = midi_out
            .connect(&port, "sway-output")
            .map_err(|e| anyhow!("failed to connect to MIDI port: {}", e))?;

        let (sender, receiver) = mpsc::channel::<MidiCommand>();
        let channel = scaling.channel;

        thread::spawn(move || {
            let mut conn = conn;
            let mut send = |msg: MidiMessage| {
                if let Err(e) = conn.send(&msg.to_bytes()) {
                    warn!(error = %e, "MIDI send failed");
                }
            };
            // (due, note) pairs waiting for their note-off
            let mut pending: Vec<(Instant, u8)> = Vec::new();

            loop {
                let now = Instant::now();
                let timeout = pending
                    .iter()
                    .map(|(due, _)| due.saturating_duration_since(now))
                    .min()
                    .unwrap_or(IDLE_POLL);

                match receiver.recv_timeout(timeout) {
                    Ok(MidiCommand::Note {
                        messages,
                        note,
                        hold,
                    }) => {
                        for msg in messages {
                            send(msg);
                        }
                        pending.push((Instant::now() + hold, note));
                    }
                    Ok(MidiCommand::AllOff) => {
                        for (_, note) in pending.drain(..) {
                            send(MidiMessage::NoteOff(channel, note, 0));
                        }
                        send(MidiMessage::ControlChange(channel, ALL_NOTES_OFF_CC, 0));
                    }
                    Ok(MidiCommand::Stop) | Err(RecvTimeoutError::Disconnected) => {
                        for (_, note) in pending.drain(..) {
                            send(MidiMessage::NoteOff(channel, note, 0));
                        }
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let now = Instant::now();
                pending.retain(|&(due, note)| {
                    if due <= now {
                        send(MidiMessage::NoteOff(channel, note, 0));
                        false
                    } else {
                        true
                    }
                });
            }
            debug!("MIDI output thread finished");
        });

        info!(port = %port_name_actual, "MIDI output connected");

        Ok(Self {
            sender,
            scaling,
            note_length: Duration::from_secs_f64(note_length_secs.max(0.0)),
            port_name: port_name_actual,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn scaling(&self) -> &MidiScaling {
        &self.scaling
    }

    pub fn stop(&self) {
        let _ = self.sender.send(MidiCommand::Stop);
    }
}

impl SoundRenderer for MidiRenderer {
    fn name(&self) -> &str {
        "midi"
    }

    fn render(&mut self, params: &SynthParams) -> Result<()> {
        self.sender
            .send(MidiCommand::Note {
                messages: midi_messages(params, &self.scaling),
                note: params.note.midi_note(),
                hold: self.note_length,
            })
            .map_err(|_| anyhow!("MIDI output thread has stopped"))
    }

    fn silence(&mut self) -> Result<()> {
        self.sender
            .send(MidiCommand::AllOff)
            .map_err(|_| anyhow!("MIDI output thread has stopped"))
    }
}

impl Drop for MidiRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// List available MIDI output ports.
pub fn list_midi_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("Sway MIDI List")?;
    let ports = midi_out.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok(names)
}
