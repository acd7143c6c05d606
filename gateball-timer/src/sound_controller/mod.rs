use crate::cue_scheduler::Cue;
use derivative::Derivative;
use enum_derive_2018::{EnumDisplay, EnumFromStr};
use log::*;
use macro_attr_2018::macro_attr;
use serde::{Deserialize, Serialize};
use std::{panic, sync::Arc};
use tokio::{
    sync::{
        mpsc::{UnboundedSender, unbounded_channel},
        watch::{self, Sender},
    },
    task::{self, JoinHandle},
    time::{Duration, sleep},
};
use toml::Table;
use web_audio_api::{
    context::{AudioContext, AudioContextOptions, BaseAudioContext},
    node::{AudioNode, AudioScheduledSourceNode, GainNode, OscillatorNode},
};

const FADE_LEN: f64 = 0.05;
const FADE_WAIT: Duration = Duration::from_millis(50); // Same as `FADE_LEN`

mod sounds;
pub use sounds::SAMPLE_RATE;
use sounds::*;

/// Where the match's cues get sent. Playback is fire-and-forget; nothing waits for a cue to
/// finish and a failed playback never affects the match.
pub trait AudioPort {
    /// Platforms only allow sound after a user interaction, so this is called lazily on the
    /// first one
    fn initialize(&mut self);

    fn is_initialized(&self) -> bool;

    fn play(&mut self, cue: Cue);

    fn update_settings(&mut self, _settings: &SoundSettings) {}
}

impl<A: AudioPort + ?Sized> AudioPort for Box<A> {
    fn initialize(&mut self) {
        (**self).initialize()
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn play(&mut self, cue: Cue) {
        (**self).play(cue)
    }

    fn update_settings(&mut self, settings: &SoundSettings) {
        (**self).update_settings(settings)
    }
}

/// Used when sound is turned off. Cues are only logged.
#[derive(Debug, Default)]
pub struct SilentAudio {
    initialized: bool,
}

impl AudioPort for SilentAudio {
    fn initialize(&mut self) {
        self.initialized = true;
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn play(&mut self, cue: Cue) {
        debug!("Sound is off, not playing {cue}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
pub struct SoundSettings {
    #[derivative(Default(value = "true"))]
    pub sound_enabled: bool,
    pub volume: Volume,
}

impl SoundSettings {
    /// Whether to open an audio device at all. When this is false, `SilentAudio` is used.
    pub fn use_device(&self, no_sound_flag: bool) -> bool {
        self.sound_enabled && !no_sound_flag
    }

    pub fn migrate(old: &Table) -> Self {
        let Self {
            mut sound_enabled,
            mut volume,
        } = Default::default();

        if let Some(old_sound_enabled) = old.get("sound_enabled") {
            if let Some(old_sound_enabled) = old_sound_enabled.as_bool() {
                sound_enabled = old_sound_enabled;
            }
        }
        if let Some(old_volume) = old.get("volume") {
            if let Some(old_volume) = old_volume.as_str() {
                if let Ok(vol) = old_volume.parse() {
                    volume = vol;
                }
            }
        }

        Self {
            sound_enabled,
            volume,
        }
    }
}

macro_attr! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Derivative, EnumDisplay!, EnumFromStr!)]
    #[derivative(Default)]
    pub enum Volume {
        Off,
        Low,
        Medium,
        High,
        #[derivative(Default)]
        Max,
    }
}

impl Volume {
    fn as_f32(&self) -> f32 {
        match self {
            Self::Off => 0.0,
            Self::Low => 10f32.powf(-1.2),    // 12dB lower than max
            Self::Medium => 10f32.powf(-0.8), // 8dB lower than max
            Self::High => 10f32.powf(-0.4),   // 4dB lower than max
            Self::Max => 1.0,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Off => Self::Low,
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Max,
            Self::Max => Self::Off,
        }
    }

    pub fn cycle(&mut self) {
        *self = self.next();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SoundMessage {
    Play(Cue),
}

struct Playback {
    _context: Arc<AudioContext>,
    msg_tx: UnboundedSender<SoundMessage>,
    settings_tx: Sender<SoundSettings>,
    stop_tx: Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

/// Plays cues through the default output device. Nothing touches the audio device until
/// `initialize()` is called.
pub struct SoundController {
    settings: SoundSettings,
    playback: Option<Playback>,
    init_failed: bool,
}

impl SoundController {
    pub fn new(settings: SoundSettings) -> Self {
        Self {
            settings,
            playback: None,
            init_failed: false,
        }
    }

    fn start_playback(settings: SoundSettings) -> Option<Playback> {
        let opts = AudioContextOptions {
            sample_rate: Some(SAMPLE_RATE),
            ..AudioContextOptions::default()
        };

        // Opening the output device panics if there isn't a usable one
        let context = match panic::catch_unwind(panic::AssertUnwindSafe(move || {
            AudioContext::new(opts)
        })) {
            Ok(context) => Arc::new(context),
            Err(_) => {
                error!("Could not open an audio output device, cues will be silent");
                return None;
            }
        };

        let (msg_tx, mut msg_rx) = unbounded_channel();

        let (settings_tx, mut settings_rx) = watch::channel(settings.clone());
        settings_rx.borrow_and_update();

        let (stop_tx, mut stop_rx) = watch::channel(false);
        stop_rx.borrow_and_update();

        let mut current = settings;
        let task_context = context.clone();

        let handler = task::spawn(async move {
            let mut queue = CueQueue::default();
            let mut live: Vec<Sound> = Vec::new();

            loop {
                tokio::select! {
                    msg = msg_rx.recv() => {
                        match msg {
                            Some(SoundMessage::Play(cue)) => {
                                let now = task_context.current_time();
                                live.retain(|sound| !sound.is_done(now));

                                if current.sound_enabled {
                                    let start = queue.schedule(now, cue);
                                    if start > now {
                                        debug!("Queueing {cue} {:.2}s behind the previous cue", start - now);
                                    }
                                    info!("Playing {cue}");
                                    live.push(Sound::new(task_context.clone(), current.volume.as_f32(), cue, start));
                                } else {
                                    debug!("Sound disabled, not playing {cue}");
                                }
                            },
                            None => break,
                        }
                    }
                    maybe_err = settings_rx.changed() => {
                        match maybe_err {
                            Ok(()) => {
                                current = settings_rx.borrow().clone();
                            }
                            Err(_) => break,
                        }
                    }
                    _ = stop_rx.changed() => {
                        break;
                    }
                }
            }

            Sound::stop_all(live).await;
        });

        Some(Playback {
            _context: context,
            msg_tx,
            settings_tx,
            stop_tx,
            tasks: vec![handler],
        })
    }

    /// Stops the playback task and waits for it to finish
    pub async fn shutdown(&mut self) {
        if let Some(mut playback) = self.playback.take() {
            if playback.stop_tx.send(true).is_err() {
                return;
            }
            for join_handle in playback.tasks.drain(..) {
                if let Err(e) = join_handle.await {
                    error!("Sound task failed: {e}");
                }
            }
        }
    }
}

impl AudioPort for SoundController {
    fn initialize(&mut self) {
        if self.playback.is_some() || self.init_failed {
            return;
        }
        info!("Initializing audio");
        self.playback = Self::start_playback(self.settings.clone());
        self.init_failed = self.playback.is_none();
    }

    fn is_initialized(&self) -> bool {
        self.playback.is_some() || self.init_failed
    }

    fn play(&mut self, cue: Cue) {
        match &self.playback {
            Some(playback) => {
                if playback.msg_tx.send(SoundMessage::Play(cue)).is_err() {
                    warn!("Sound task is gone, dropping {cue}");
                }
            }
            None if self.init_failed => debug!("No audio device, dropping {cue}"),
            None => warn!("Audio not initialized yet, dropping {cue}"),
        }
    }

    fn update_settings(&mut self, settings: &SoundSettings) {
        self.settings = settings.clone();
        if let Some(playback) = &self.playback {
            playback.settings_tx.send_replace(settings.clone());
        }
    }
}

impl Drop for SoundController {
    fn drop(&mut self) {
        if let Some(playback) = &self.playback {
            let _ = playback.stop_tx.send(true);
        }
    }
}

struct Sound {
    gain: GainNode,
    _oscillators: Vec<OscillatorNode>,
    context: Arc<AudioContext>,
    volume: f32,
    end: f64,
}

impl Sound {
    /// Schedules every tone of `cue`, starting at `start` on the context's clock
    fn new(context: Arc<AudioContext>, volume: f32, cue: Cue, start: f64) -> Self {
        let gain = context.create_gain();
        gain.connect(&context.destination());
        gain.gain().set_value(0.0);

        let oscillators = tones(cue)
            .into_iter()
            .map(|tone| {
                let tone_start = start + tone.start;
                let tone_end = tone_start + tone.len;

                // Short ramps on each edge to avoid clicks
                gain.gain().set_value_at_time(0.0, tone_start);
                gain.gain()
                    .linear_ramp_to_value_at_time(volume, tone_start + FADE_LEN);
                gain.gain().set_value_at_time(volume, tone_end - FADE_LEN);
                gain.gain().linear_ramp_to_value_at_time(0.0, tone_end);

                let mut osc = context.create_oscillator();
                osc.set_type(wave_type(cue));
                osc.frequency().set_value(tone.freq);
                osc.connect(&gain);
                osc.start_at(tone_start);
                osc.stop_at(tone_end);
                osc
            })
            .collect();

        let end = start + cue_len(cue);
        trace!("Scheduled {cue} from {start:.2}s to {end:.2}s");

        Self {
            gain,
            _oscillators: oscillators,
            context,
            volume,
            end,
        }
    }

    fn is_done(&self, now: f64) -> bool {
        now >= self.end
    }

    fn fade_out(&self) {
        let fade_end = self.context.current_time() + FADE_LEN;

        // Set the gain so that the start of the fade is now, not when the sound started
        self.gain.gain().cancel_scheduled_values(0.0);
        self.gain.gain().set_value(self.volume);
        self.gain.gain().linear_ramp_to_value_at_time(0.0, fade_end);
    }

    /// Fades out everything still sounding or queued, then detaches it from the output
    async fn stop_all(sounds: Vec<Sound>) {
        if sounds.is_empty() {
            return;
        }
        for sound in &sounds {
            sound.fade_out();
        }
        sleep(FADE_WAIT).await;
        // The oscillators already have their stop times scheduled, cutting the gain is enough
        for sound in sounds {
            sound.gain.disconnect();
        }
    }
}
