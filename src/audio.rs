//! Procedural audio: PCM synthesis for sound effects and the looping theme
//!
//! No audio files anywhere - every clip is generated from a closed-form
//! waveform at 44100 Hz mono 16-bit. Playback devices are an external
//! collaborator behind [`AudioSink`]; the [`AudioDirector`] owns the
//! synthesized bank and guarantees at most one theme instance plays at a
//! time, regenerating it at a faster tempo each loop.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::sim::GameEvent;

/// Base synthesis sample rate
pub const SAMPLE_RATE: u32 = 44_100;

/// Theme parameters: an 8-beat phrase at 105 BPM
const THEME_BPM: f64 = 105.0;
const THEME_BEATS: u32 = 8;
/// Note frequency per beat, 0 = rest
const THEME_MELODY: [f32; THEME_BEATS as usize] = [196.0, 0.0, 233.0, 261.0, 196.0, 0.0, 311.0, 293.0];

/// Tempo scale for a given loop count: 8% faster per loop, capped at 1.8x
pub fn theme_tempo_scale(loop_count: u32) -> f32 {
    (1.0 + loop_count as f32 * 0.08).min(1.8)
}

/// Sound effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfxKind {
    /// Projectile spawned overhead
    Whoosh,
    /// Projectile struck the player
    Hit,
    /// Fell out of the world
    Pitfall,
    /// Artifact collected
    Pickup,
    Jump,
    /// UI button press
    Click,
    GameOver,
    /// Run beat the leaderboard's best
    HighScore,
    /// Low-hp warning pulse
    Heartbeat,
}

impl SfxKind {
    pub const ALL: [SfxKind; 9] = [
        SfxKind::Whoosh,
        SfxKind::Hit,
        SfxKind::Pitfall,
        SfxKind::Pickup,
        SfxKind::Jump,
        SfxKind::Click,
        SfxKind::GameOver,
        SfxKind::HighScore,
        SfxKind::Heartbeat,
    ];

    /// Fixed (duration seconds, peak volume) per kind
    pub fn params(self) -> (f32, f32) {
        match self {
            SfxKind::Whoosh => (0.2, 0.05),
            SfxKind::Hit => (0.2, 0.4),
            SfxKind::Pitfall => (0.4, 0.6),
            SfxKind::Pickup => (0.1, 0.2),
            SfxKind::Jump => (0.08, 0.15),
            SfxKind::Click => (0.05, 0.15),
            SfxKind::GameOver => (1.5, 0.4),
            SfxKind::HighScore => (1.0, 0.5),
            SfxKind::Heartbeat => (0.3, 0.3),
        }
    }
}

/// A mono 16-bit PCM clip
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl PcmBuffer {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Clip to [-1, 1] and quantize to the signed 16-bit range
#[inline]
fn quantize(v: f32) -> i16 {
    (v.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Synthesize one sound effect.
///
/// The noise terms draw from the caller's RNG so a seeded run produces a
/// bit-identical bank.
pub fn synthesize(kind: SfxKind, rng: &mut impl Rng) -> PcmBuffer {
    use std::f32::consts::PI;

    let (duration, vol) = kind.params();
    let n_samples = (SAMPLE_RATE as f32 * duration) as usize;
    let mut samples = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let t = i as f32 / SAMPLE_RATE as f32;
        let val = match kind {
            SfxKind::GameOver => {
                // Decaying low rumble, no envelope window
                (2.0 * PI * 100.0 * t).sin() * (1.0 - t / duration) + rng.random_range(-0.1..0.1)
            }
            SfxKind::HighScore => {
                // 880 Hz carrier with 5 Hz tremolo
                (2.0 * PI * 880.0 * t).sin() * (2.0 * PI * 5.0 * t).sin()
            }
            SfxKind::Heartbeat => {
                // Repeating thump: exponential decay restarted every 0.15 s
                (2.0 * PI * 60.0 * t).sin() * (-20.0 * (t % 0.15)).exp()
            }
            _ => {
                let env = (PI * t / duration).sin();
                ((2.0 * PI * 440.0 * t).sin() + rng.random_range(-0.3..0.3)) * env
            }
        };
        samples.push(quantize(val * vol));
    }
    PcmBuffer { sample_rate: SAMPLE_RATE, samples }
}

/// Synthesize the looping theme at a tempo scale.
///
/// The scale multiplies the sample rate, so playback compresses in time while
/// the note/beat sequence is unchanged. The buffer covers exactly the full
/// 8-beat phrase so looping it is seamless.
pub fn synthesize_theme(tempo_scale: f32) -> PcmBuffer {
    use std::f64::consts::PI;

    let sample_rate = (SAMPLE_RATE as f64 * tempo_scale as f64) as u32;
    let beat_len = 60.0 / THEME_BPM;
    let n_samples = (sample_rate as f64 * beat_len * THEME_BEATS as f64) as usize;

    let mut samples = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let t = i as f64 / sample_rate as f64;
        let beat_idx = ((t / beat_len) as usize) % THEME_BEATS as usize;
        let t_in_beat = t % beat_len;

        // Percussive 60 Hz thump on every beat, accented every 4th
        let accent = if beat_idx % 4 == 0 { 0.5 } else { 0.2 };
        let drum = (2.0 * PI * 60.0 * t).sin() * (-12.0 * t_in_beat).exp() * accent;

        // Melody note windowed over its beat; 0 Hz is a rest
        let freq = THEME_MELODY[beat_idx] as f64;
        let flute = if freq > 0.0 {
            (2.0 * PI * freq * t).sin() * (PI * t_in_beat / beat_len).sin() * 0.25
        } else {
            0.0
        };

        samples.push(quantize(((drum + flute) * 0.6) as f32));
    }
    PcmBuffer { sample_rate, samples }
}

/// Opaque handle to a playing sound, issued by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundHandle(pub u64);

/// Playback boundary. Starting and stopping are fire-and-forget; the sink
/// owns devices and mixing threads.
pub trait AudioSink {
    fn play(&mut self, buffer: &PcmBuffer, looping: bool) -> SoundHandle;
    fn stop(&mut self, handle: SoundHandle);
}

/// Sink that discards everything (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullSink {
    next_handle: u64,
}

impl AudioSink for NullSink {
    fn play(&mut self, _buffer: &PcmBuffer, _looping: bool) -> SoundHandle {
        self.next_handle += 1;
        SoundHandle(self.next_handle)
    }

    fn stop(&mut self, _handle: SoundHandle) {}
}

/// Owns the synthesized bank and routes game events into the sink.
///
/// Invariant: at most one theme instance is playing; restarting stops the
/// previous handle before issuing the replacement.
pub struct AudioDirector<S: AudioSink> {
    sink: S,
    bank: Vec<(SfxKind, PcmBuffer)>,
    theme: PcmBuffer,
    theme_handle: Option<SoundHandle>,
    music_enabled: bool,
}

impl<S: AudioSink> AudioDirector<S> {
    /// Synthesize the full effect bank and the base-tempo theme
    pub fn new(sink: S, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let bank = SfxKind::ALL
            .iter()
            .map(|&kind| (kind, synthesize(kind, &mut rng)))
            .collect();
        Self {
            sink,
            bank,
            theme: synthesize_theme(1.0),
            theme_handle: None,
            music_enabled: true,
        }
    }

    pub fn play_sfx(&mut self, kind: SfxKind) {
        if let Some((_, buf)) = self.bank.iter().find(|(k, _)| *k == kind) {
            self.sink.play(buf, false);
        }
    }

    /// Regenerate the theme for `loop_count` and replace the playing instance
    pub fn restart_theme(&mut self, loop_count: u32) {
        self.stop_theme();
        self.theme = synthesize_theme(theme_tempo_scale(loop_count));
        if self.music_enabled {
            self.theme_handle = Some(self.sink.play(&self.theme, true));
        }
    }

    pub fn stop_theme(&mut self) {
        if let Some(handle) = self.theme_handle.take() {
            self.sink.stop(handle);
        }
    }

    /// Menu music toggle: stops immediately, or restarts the current theme
    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        if enabled {
            if self.theme_handle.is_none() {
                self.theme_handle = Some(self.sink.play(&self.theme, true));
            }
        } else {
            self.stop_theme();
        }
    }

    pub fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    /// Apply one frame's worth of simulation events
    pub fn apply(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::Sfx(kind) => self.play_sfx(kind),
                GameEvent::ThemeRestart { loop_count } => self.restart_theme(loop_count),
                GameEvent::ThemeStop => self.stop_theme(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Sink that records play/stop calls for assertions
    #[derive(Default)]
    struct RecordingSink {
        next: u64,
        playing_loops: Vec<u64>,
        plays: usize,
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, _buffer: &PcmBuffer, looping: bool) -> SoundHandle {
            self.next += 1;
            self.plays += 1;
            if looping {
                self.playing_loops.push(self.next);
            }
            SoundHandle(self.next)
        }

        fn stop(&mut self, handle: SoundHandle) {
            self.playing_loops.retain(|&h| h != handle.0);
        }
    }

    #[test]
    fn test_sfx_duration_matches_params() {
        let mut rng = Pcg32::seed_from_u64(7);
        for kind in SfxKind::ALL {
            let buf = synthesize(kind, &mut rng);
            let (duration, _) = kind.params();
            assert_eq!(buf.samples.len(), (SAMPLE_RATE as f32 * duration) as usize);
            assert_eq!(buf.sample_rate, SAMPLE_RATE);
        }
    }

    #[test]
    fn test_sfx_deterministic_from_seed() {
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        assert_eq!(synthesize(SfxKind::Hit, &mut a).samples, synthesize(SfxKind::Hit, &mut b).samples);
    }

    #[test]
    fn test_theme_length_base_tempo() {
        // 44100 * (60/105) * 8 = 201600 samples exactly
        let theme = synthesize_theme(1.0);
        assert_eq!(theme.samples.len(), 201_600);
        assert_eq!(theme.sample_rate, SAMPLE_RATE);
    }

    #[test]
    fn test_theme_sample_rate_scales_with_tempo() {
        let theme = synthesize_theme(1.5);
        assert_eq!(theme.sample_rate, (SAMPLE_RATE as f64 * 1.5) as u32);
        // Same beat count: samples/rate ratio is the unscaled phrase duration
        let phrase_secs = theme.samples.len() as f64 / theme.sample_rate as f64;
        assert!((phrase_secs - 60.0 / 105.0 * 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_theme_tempo_scale_law() {
        assert_eq!(theme_tempo_scale(0), 1.0);
        assert!((theme_tempo_scale(1) - 1.08).abs() < 1e-6);
        assert_eq!(theme_tempo_scale(100), 1.8);
    }

    #[test]
    fn test_heartbeat_repeats_thump() {
        let mut rng = Pcg32::seed_from_u64(1);
        let buf = synthesize(SfxKind::Heartbeat, &mut rng);
        // The decay restarts at t=0.15: amplitude right after the restart is
        // much larger than right before it
        let sr = SAMPLE_RATE as f32;
        let before: i32 = (0..200)
            .map(|i| buf.samples[(0.149 * sr) as usize - i].unsigned_abs() as i32)
            .max()
            .unwrap();
        let after: i32 = (0..200)
            .map(|i| buf.samples[(0.151 * sr) as usize + i].unsigned_abs() as i32)
            .max()
            .unwrap();
        assert!(after > before * 4, "after={after} before={before}");
    }

    #[test]
    fn test_director_single_theme_instance() {
        let mut director = AudioDirector::new(RecordingSink::default(), 9);
        director.restart_theme(0);
        director.restart_theme(1);
        director.restart_theme(2);
        assert_eq!(director.sink.playing_loops.len(), 1);
    }

    #[test]
    fn test_director_music_toggle() {
        let mut director = AudioDirector::new(RecordingSink::default(), 9);
        director.restart_theme(0);
        director.set_music_enabled(false);
        assert!(director.sink.playing_loops.is_empty());
        // Restarts while muted do not start playback
        director.restart_theme(1);
        assert!(director.sink.playing_loops.is_empty());
        director.set_music_enabled(true);
        assert_eq!(director.sink.playing_loops.len(), 1);
    }

    #[test]
    fn test_director_applies_events() {
        let mut director = AudioDirector::new(RecordingSink::default(), 9);
        let before = director.sink.plays;
        director.apply(&[
            GameEvent::Sfx(SfxKind::Jump),
            GameEvent::ThemeRestart { loop_count: 1 },
            GameEvent::ThemeStop,
        ]);
        assert_eq!(director.sink.plays, before + 2);
        assert!(director.sink.playing_loops.is_empty());
    }

    proptest! {
        #[test]
        fn prop_samples_always_in_range(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            // GameOver adds noise on top of a full-amplitude tone, so it
            // exercises the clipping path
            let buf = synthesize(SfxKind::GameOver, &mut rng);
            prop_assert!(buf.samples.iter().all(|&s| s > i16::MIN));
        }

        #[test]
        fn prop_theme_phrase_is_beat_exact(scale in 0.5f32..2.0) {
            let theme = synthesize_theme(scale);
            let beat_len = 60.0 / 105.0;
            let expected = (theme.sample_rate as f64 * beat_len * 8.0) as usize;
            prop_assert_eq!(theme.samples.len(), expected);
        }
    }
}
