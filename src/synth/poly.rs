//! Polyphonic synth with timed notes
//!
//! Every trigger is an attack plus a scheduled release after a fixed note
//! length. When all voices are busy the oldest note is stolen.

use super::{FmVoice, SimpleVoice, Voice};

struct Slot {
    voice: Box<dyn Voice>,
    /// Samples left before the release starts; `None` once released
    hold: Option<u64>,
    /// Trigger order, for stealing
    started: u64,
}

pub struct PolySynth {
    slots: Vec<Slot>,
    sample_rate: f64,
    triggers: u64,
}

impl PolySynth {
    /// Build a synth from a voice factory
    pub fn new<F>(sample_rate: f64, max_voices: usize, mut make_voice: F) -> Self
    where
        F: FnMut() -> Box<dyn Voice>,
    {
        let slots = (0..max_voices.max(1))
            .map(|_| Slot {
                voice: make_voice(),
                hold: None,
                started: 0,
            })
            .collect();

        Self {
            slots,
            sample_rate,
            triggers: 0,
        }
    }

    /// Triangle voices
    pub fn simple(sample_rate: f64, max_voices: usize) -> Self {
        Self::new(sample_rate, max_voices, || Box::new(SimpleVoice::new(sample_rate)))
    }

    /// FM voices
    pub fn fm(sample_rate: f64, max_voices: usize, harmonicity: f64, modulation_index: f64) -> Self {
        Self::new(sample_rate, max_voices, || {
            Box::new(FmVoice::new(sample_rate, harmonicity, modulation_index))
        })
    }

    pub fn max_voices(&self) -> usize {
        self.slots.len()
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.slots.iter().filter(|s| s.voice.is_active()).count()
    }

    /// Play a note for `duration_secs`, then let it release
    pub fn trigger_attack_release(&mut self, frequency: f64, velocity: f64, duration_secs: f64) {
        let index = self
            .slots
            .iter()
            .position(|s| !s.voice.is_active())
            .unwrap_or_else(|| self.oldest_slot());

        self.triggers += 1;
        let hold = (duration_secs.max(0.0) * self.sample_rate).round() as u64;
        let slot = &mut self.slots[index];
        slot.voice.note_on(frequency, velocity);
        slot.hold = Some(hold);
        slot.started = self.triggers;
    }

    /// Release every sounding note now
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            if slot.voice.is_active() {
                slot.voice.note_off();
            }
            slot.hold = None;
        }
    }

    /// Generate the next sample (sum of all voices)
    pub fn process(&mut self) -> f64 {
        let mut output = 0.0;
        for slot in &mut self.slots {
            if let Some(hold) = slot.hold {
                if hold == 0 {
                    slot.voice.note_off();
                    slot.hold = None;
                } else {
                    slot.hold = Some(hold - 1);
                }
            }
            if slot.voice.is_active() {
                output += slot.voice.process();
            }
        }
        output
    }

    fn oldest_slot(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.started)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
