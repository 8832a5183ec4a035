// Output stream
pub const SAMPLE_RATE: u32 = 44100;
pub const CHANNELS: u16 = 1;
pub const BUFFER_SIZE: u32 = 2048;
pub const SILENCE: i16 = 0;
//TEST TONE
pub const FREQUENCY: f64 = 261.63;
pub const AMPLITUDE: i16 = i16::MAX;
// Periods of the tone covered by one wrap of the sample index
pub const WRAP_PERIODS: f64 = 10.0;
// Runtime: 10_000 ticks of 1ms
pub const RUNTIME_TICKS: u32 = 10_000;
pub const TICK_MS: u64 = 1;
