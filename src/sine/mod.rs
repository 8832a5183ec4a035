use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use crate::settings::{PhaseWrap, ToneSpec};

/// Counters updated by the audio callback and read from the control thread.
#[derive(Debug, Default)]
pub struct ToneStats {
    invocations: AtomicU64,
    samples: AtomicU64,
    peak: AtomicU32,
}

impl ToneStats {
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Largest absolute sample value written so far.
    pub fn peak(&self) -> u16 {
        self.peak.load(Ordering::Relaxed) as u16
    }

    fn record(&self, written: usize, peak: u16) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        self.samples.fetch_add(written as u64, Ordering::Relaxed);
        self.peak.fetch_max(peak as u32, Ordering::Relaxed);
    }
}

#[derive(Debug)]
enum Phase {
    // Index of the next sample, kept below `period`
    Rounded { period: u64, position: u64 },
    // Fraction of a cycle in [0, 1)
    Exact { cycle: f64, increment: f64 },
}

/// Fills output buffers with a sine tone whose phase carries over from one
/// buffer to the next.
///
/// The generator owns all of its state and is meant to be moved into the
/// output callback; nothing in `fill` blocks, allocates or locks.
#[derive(Debug)]
pub struct ToneGenerator {
    frequency: f64,
    amplitude: f64,
    time_lag: f64,
    phase: Phase,
    stats: Arc<ToneStats>,
}

impl ToneGenerator {
    pub fn new(spec: ToneSpec) -> Self {
        let phase = match spec.phase_wrap {
            PhaseWrap::Rounded => Phase::Rounded {
                period: spec.wrap_period(),
                position: 0,
            },
            PhaseWrap::Exact => Phase::Exact {
                cycle: 0.0,
                increment: spec.frequency * spec.time_lag(),
            },
        };

        Self {
            frequency: spec.frequency,
            amplitude: spec.amplitude as f64,
            time_lag: spec.time_lag(),
            phase,
            stats: Arc::new(ToneStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<ToneStats> {
        Arc::clone(&self.stats)
    }

    /// Number of buffers filled so far.
    pub fn callback_index(&self) -> u64 {
        self.stats.invocations()
    }

    /// Length of the index wrap window, `None` in exact mode.
    pub fn wrap_period(&self) -> Option<u64> {
        match self.phase {
            Phase::Rounded { period, .. } => Some(period),
            Phase::Exact { .. } => None,
        }
    }

    /// Phase advance between two consecutive samples, in radians.
    pub fn phase_step(&self) -> f64 {
        TAU * self.frequency * self.time_lag
    }

    /// Phase of the first sample the next `fill` will write.
    pub fn next_phase(&self) -> f64 {
        match self.phase {
            Phase::Rounded { position, .. } => self.phase_step() * position as f64,
            Phase::Exact { cycle, .. } => TAU * cycle,
        }
    }

    /// Jump to the state reached after `invocation` buffers of
    /// `samples_per_invocation` samples.
    pub fn seek(&mut self, invocation: u64, samples_per_invocation: usize) {
        match &mut self.phase {
            Phase::Rounded { period, position } => {
                let period = *period as u128;
                let start = (invocation as u128 % period) * (samples_per_invocation as u128 % period);
                *position = (start % period) as u64;
            }
            Phase::Exact { cycle, increment } => {
                let per_invocation = (samples_per_invocation as f64 * *increment).fract();
                *cycle = cycles_after(invocation, per_invocation);
            }
        }
        self.stats.invocations.store(invocation, Ordering::Relaxed);
    }

    /// Overwrite `buffer` with the next stretch of the tone.
    pub fn fill(&mut self, buffer: &mut [i16]) {
        let step = self.phase_step();
        let amplitude = self.amplitude;
        let mut peak = 0u16;

        match &mut self.phase {
            Phase::Rounded { period, position } => {
                let start_index = *position;
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let r = step * (start_index + i as u64) as f64;
                    *sample = quantize(r.sin(), amplitude);
                    peak = peak.max(sample.unsigned_abs());
                }
                *position = (start_index + buffer.len() as u64 % *period) % *period;
            }
            Phase::Exact { cycle, increment } => {
                for sample in buffer.iter_mut() {
                    *sample = quantize((TAU * *cycle).sin(), amplitude);
                    peak = peak.max(sample.unsigned_abs());
                    *cycle += *increment;
                    if *cycle >= 1.0 {
                        *cycle -= 1.0;
                    }
                }
            }
        }

        self.stats.record(buffer.len(), peak);
    }
}

// fract(count * step) without forming the product, which would lose every
// fractional bit once it passes 2^53.
fn cycles_after(count: u64, step: f64) -> f64 {
    let mut total = 0.0;
    let mut doubled = step.fract();
    let mut rest = count;
    while rest > 0 && doubled != 0.0 {
        if rest & 1 == 1 {
            total = (total + doubled).fract();
        }
        doubled = (doubled * 2.0).fract();
        rest >>= 1;
    }
    total
}

fn quantize(value: f64, amplitude: f64) -> i16 {
    (value * amplitude)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rand::Rng;
    use std::f64::consts::PI;

    const BUFFER: usize = 2048;

    fn generator(phase_wrap: PhaseWrap) -> ToneGenerator {
        let settings = Settings::get_default_settings().with_phase_wrap(phase_wrap);
        ToneGenerator::new(settings.get_tone_spec())
    }

    // Distance between the phase step actually taken across a buffer
    // boundary and one sample's worth of phase.
    fn boundary_deviation(tone: &mut ToneGenerator, len: usize) -> f64 {
        let step = tone.phase_step();
        let mut buffer = vec![0i16; len];
        let first = tone.next_phase();
        tone.fill(&mut buffer);
        let last = first + step * (len - 1) as f64;
        let mut delta = (tone.next_phase() - last).rem_euclid(TAU);
        if delta > PI {
            delta -= TAU;
        }
        (delta - step).abs()
    }

    #[test]
    fn first_buffer_starts_at_zero_phase() {
        let mut tone = generator(PhaseWrap::Rounded);
        let mut buffer = vec![1i16; BUFFER];
        tone.fill(&mut buffer);
        assert_eq!(buffer[0], 0);
        // A quarter period is ~42.14 samples
        assert!(buffer[42] > 32700);
        assert_eq!(tone.callback_index(), 1);
    }

    // Phase of the first sample of buffer `k`, from exact rationals:
    // 261.63 Hz / 44100 Hz = 26163 / 4410000 cycles per sample.
    fn reference_phase(phase_wrap: PhaseWrap, k: u64) -> f64 {
        let index = k as u128 * BUFFER as u128;
        match phase_wrap {
            PhaseWrap::Rounded => {
                let tone = generator(PhaseWrap::Rounded);
                tone.phase_step() * (index % 1686) as f64
            }
            PhaseWrap::Exact => TAU * ((index * 26163) % 4_410_000) as f64 / 4_410_000.0,
        }
    }

    fn circular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn seek_lands_on_the_phase_of_any_invocation() {
        let mut rng = rand::thread_rng();
        for phase_wrap in [PhaseWrap::Rounded, PhaseWrap::Exact] {
            for _ in 0..200 {
                let k = rng.gen_range(0..1u64 << 32);
                let mut tone = generator(phase_wrap);
                tone.seek(k, BUFFER);
                let expected = reference_phase(phase_wrap, k);
                let distance = circular_distance(tone.next_phase(), expected);
                assert!(distance < 1e-4 * TAU, "k = {k}, {phase_wrap:?} off by {distance} rad");
                assert_eq!(tone.callback_index(), k);
            }
        }
    }

    #[test]
    fn exact_seek_keeps_resolution_past_f64_integers() {
        // k * 2048 * increment is far beyond 2^53 here
        let mut previous = None;
        for k in [1u64 << 44, (1u64 << 44) + 1, u64::MAX / 3] {
            let mut tone = generator(PhaseWrap::Exact);
            tone.seek(k, BUFFER);
            let phase = tone.next_phase();
            assert!(phase > 0.0 && phase < TAU);
            assert_ne!(Some(phase), previous);
            previous = Some(phase);
        }

        // Neighbouring invocations are one buffer of phase apart
        let mut a = generator(PhaseWrap::Exact);
        let mut b = generator(PhaseWrap::Exact);
        a.seek(1 << 44, BUFFER);
        b.seek((1 << 44) + 1, BUFFER);
        let buffer_phase = (a.phase_step() * BUFFER as f64).rem_euclid(TAU);
        let stepped = (a.next_phase() + buffer_phase).rem_euclid(TAU);
        assert!(circular_distance(stepped, b.next_phase()) < 1e-6);
    }

    #[test]
    fn samples_stay_in_range_for_any_invocation() {
        let mut rng = rand::thread_rng();
        for phase_wrap in [PhaseWrap::Rounded, PhaseWrap::Exact] {
            let mut phases = Vec::new();
            for _ in 0..50 {
                let mut tone = generator(phase_wrap);
                tone.seek(rng.gen(), BUFFER);
                phases.push(tone.next_phase());
                let mut buffer = vec![0i16; BUFFER];
                tone.fill(&mut buffer);
                assert!(buffer.iter().all(|s| *s >= -i16::MAX));
                assert!(tone.stats().peak() <= i16::MAX as u16);
            }
            // Random invocations start at different points of the wave
            assert!(phases.iter().any(|p| *p != phases[0]));
        }
    }

    #[test]
    fn rounded_wrap_keeps_buffers_continuous() {
        let mut tone = generator(PhaseWrap::Rounded);
        let step = tone.phase_step();
        for _ in 0..1000 {
            let deviation = boundary_deviation(&mut tone, BUFFER);
            assert!(deviation < step, "phase jumped by {deviation} rad");
        }
    }

    #[test]
    fn exact_wrap_has_no_boundary_error() {
        let mut tone = generator(PhaseWrap::Exact);
        for _ in 0..1000 {
            assert!(boundary_deviation(&mut tone, BUFFER) < 1e-6);
        }
    }

    #[test]
    fn uneven_buffers_stay_continuous() {
        let mut tone = generator(PhaseWrap::Rounded);
        let step = tone.phase_step();
        for len in [2048, 512, 1, 3000, 1686, 7, 2048] {
            assert!(boundary_deviation(&mut tone, len) < step);
        }
    }

    #[test]
    fn start_index_follows_invocation_count() {
        let mut tone = generator(PhaseWrap::Rounded);
        let period = tone.wrap_period().unwrap();
        let mut buffer = vec![0i16; BUFFER];
        for k in 0..10u64 {
            let expected = (k * BUFFER as u64) % period;
            assert_eq!(tone.next_phase(), tone.phase_step() * expected as f64);
            tone.fill(&mut buffer);
        }

        let mut seeked = generator(PhaseWrap::Rounded);
        seeked.seek(10, BUFFER);
        assert_eq!(seeked.next_phase(), tone.next_phase());
    }

    #[test]
    fn one_period_is_one_sine_cycle() {
        let mut tone = generator(PhaseWrap::Rounded);
        let settings = Settings::get_default_settings();
        let period = settings.get_tone_spec().period_samples();
        let mut buffer = vec![0i16; period.ceil() as usize];
        tone.fill(&mut buffer);

        for (i, sample) in buffer.iter().enumerate() {
            let expected = (TAU * i as f64 / period).sin() * i16::MAX as f64;
            assert!((*sample as f64 - expected).abs() <= 1.0, "sample {i}");
        }
        assert!(*buffer.iter().max().unwrap() >= 32760);
        assert!(*buffer.iter().min().unwrap() <= -32760);
    }

    #[test]
    fn ten_seconds_need_216_callbacks() {
        let mut tone = generator(PhaseWrap::Rounded);
        let stats = tone.stats();
        let mut buffer = vec![0i16; BUFFER];
        while stats.samples() < 441_000 {
            tone.fill(&mut buffer);
        }
        assert_eq!(stats.invocations(), 216);
        assert_eq!(tone.callback_index(), 216);
        assert!(stats.peak() >= 32760);
    }
}
