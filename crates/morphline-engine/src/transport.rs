//! Lock-free transport bridge. The host layer refreshes these scalars
//! once per block; the evaluator and the editor grid read them without
//! taking any lock.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

#[derive(Debug)]
pub struct Transport {
    pub playing: AtomicBool,
    pub sample_pos: AtomicU64,
    pub sr: AtomicU32,
    tempo_bits: AtomicU64,
    sig_numerator: AtomicU32,
    sig_denominator: AtomicU32,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_rate(sr: u32) -> Self {
        Self {
            playing: AtomicBool::new(false),
            sample_pos: AtomicU64::new(0),
            sr: AtomicU32::new(sr),
            tempo_bits: AtomicU64::new(120.0f64.to_bits()),
            sig_numerator: AtomicU32::new(4),
            sig_denominator: AtomicU32::new(4),
        }
    }

    pub fn pos(&self) -> u64 {
        self.sample_pos.load(Ordering::Relaxed)
    }

    pub fn seconds(&self) -> f64 {
        let sp = self.sample_pos.load(Ordering::Relaxed) as f64;
        let sr = self.sr.load(Ordering::Relaxed).max(1) as f64;
        sp / sr
    }

    pub fn advance(&self, frames: u32) {
        self.sample_pos
            .fetch_add(u64::from(frames), Ordering::Relaxed);
    }

    pub fn seek(&self, sample: u64) {
        self.sample_pos.store(sample, Ordering::Relaxed);
    }

    pub fn set_sample_rate(&self, sr: u32) {
        self.sr.store(sr, Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sr.load(Ordering::Relaxed)
    }

    pub fn tempo(&self) -> f64 {
        f64::from_bits(self.tempo_bits.load(Ordering::Relaxed))
    }

    pub fn set_tempo(&self, bpm: f64) {
        self.tempo_bits.store(bpm.max(1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn time_signature(&self) -> (u32, u32) {
        (
            self.sig_numerator.load(Ordering::Relaxed),
            self.sig_denominator.load(Ordering::Relaxed),
        )
    }

    pub fn set_time_signature(&self, numerator: u32, denominator: u32) {
        self.sig_numerator
            .store(numerator.max(1), Ordering::Relaxed);
        self.sig_denominator
            .store(denominator.max(1), Ordering::Relaxed);
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::with_sample_rate(48_000)
    }
}

impl Clone for Transport {
    fn clone(&self) -> Self {
        Self {
            playing: AtomicBool::new(self.playing.load(Ordering::Relaxed)),
            sample_pos: AtomicU64::new(self.sample_pos.load(Ordering::Relaxed)),
            sr: AtomicU32::new(self.sr.load(Ordering::Relaxed)),
            tempo_bits: AtomicU64::new(self.tempo_bits.load(Ordering::Relaxed)),
            sig_numerator: AtomicU32::new(self.sig_numerator.load(Ordering::Relaxed)),
            sig_denominator: AtomicU32::new(self.sig_denominator.load(Ordering::Relaxed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_follow_sample_position() {
        let transport = Transport::with_sample_rate(48_000);
        transport.advance(24_000);
        assert!((transport.seconds() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn tempo_round_trips_through_bits() {
        let transport = Transport::new();
        transport.set_tempo(133.7);
        assert_eq!(transport.tempo(), 133.7);
    }

    #[test]
    fn degenerate_signature_is_clamped() {
        let transport = Transport::new();
        transport.set_time_signature(0, 0);
        assert_eq!(transport.time_signature(), (1, 1));
    }
}
