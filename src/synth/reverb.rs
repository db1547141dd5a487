//! Schroeder reverb
//!
//! Four damped feedback combs in parallel, then two all-passes in series.
//! Comb feedback is derived from the requested decay time (RT60), so the
//! tail length can follow the motion without retuning delay lengths.

/// Comb lengths in samples at 44.1 kHz (Freeverb tuning)
const COMB_TUNING: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNING: [usize; 2] = [556, 441];
const ALLPASS_FEEDBACK: f64 = 0.5;
const DAMPING: f64 = 0.2;

struct Comb {
    buffer: Vec<f64>,
    pos: usize,
    feedback: f64,
    store: f64,
}

impl Comb {
    fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            pos: 0,
            feedback: 0.0,
            store: 0.0,
        }
    }

    fn delay_secs(&self, sample_rate: f64) -> f64 {
        self.buffer.len() as f64 / sample_rate
    }

    fn process(&mut self, input: f64) -> f64 {
        let output = self.buffer[self.pos];
        self.store = output * (1.0 - DAMPING) + self.store * DAMPING;
        self.buffer[self.pos] = input + self.store * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }
}

struct AllPass {
    buffer: Vec<f64>,
    pos: usize,
}

impl AllPass {
    fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            pos: 0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let delayed = self.buffer[self.pos];
        self.buffer[self.pos] = input + delayed * ALLPASS_FEEDBACK;
        self.pos = (self.pos + 1) % self.buffer.len();
        delayed - input
    }
}

pub struct Reverb {
    sample_rate: f64,
    combs: Vec<Comb>,
    allpasses: Vec<AllPass>,
    decay_secs: f64,
    wet: f64,
}

impl Reverb {
    pub fn new(sample_rate: f64, decay_secs: f64) -> Self {
        let scale = sample_rate / 44100.0;
        let mut reverb = Self {
            sample_rate,
            combs: COMB_TUNING
                .iter()
                .map(|&n| Comb::new((n as f64 * scale) as usize))
                .collect(),
            allpasses: ALLPASS_TUNING
                .iter()
                .map(|&n| AllPass::new((n as f64 * scale) as usize))
                .collect(),
            decay_secs: 0.0,
            wet: 0.0,
        };
        reverb.set_decay(decay_secs);
        reverb
    }

    /// Time for the tail to fall by 60 dB
    pub fn set_decay(&mut self, decay_secs: f64) {
        let decay_secs = decay_secs.max(0.01);
        if decay_secs == self.decay_secs {
            return;
        }
        self.decay_secs = decay_secs;
        for comb in &mut self.combs {
            // g = 10^(-3·τ/T60)
            comb.feedback = 10f64.powf(-3.0 * comb.delay_secs(self.sample_rate) / decay_secs);
        }
    }

    pub fn decay(&self) -> f64 {
        self.decay_secs
    }

    /// Wet/dry balance: 0 is fully dry, 1 fully wet
    pub fn set_wet(&mut self, wet: f64) {
        self.wet = wet.clamp(0.0, 1.0);
    }

    pub fn wet(&self) -> f64 {
        self.wet
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let mut tail = 0.0;
        for comb in &mut self.combs {
            tail += comb.process(input);
        }
        tail /= self.combs.len() as f64;
        for allpass in &mut self.allpasses {
            tail = allpass.process(tail);
        }
        input * (1.0 - self.wet) + tail * self.wet
    }
}
