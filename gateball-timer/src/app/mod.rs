use crate::{
    config::Config, match_manager::MatchManagerError, session::GameSession,
    sound_controller::AudioPort,
};
use gateball_common::match_snapshot::MatchSnapshot;
use log::*;
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    time::{Instant, sleep_until},
};

pub mod message;
use message::{HELP, Message};

pub mod view;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Clock error: {0}")]
    Clock(#[from] MatchManagerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug)]
pub struct GateballAppFlags {
    pub config: Config,
    pub output: OutputMode,
    /// App name to save config changes under, `None` to keep them in memory
    pub store_config_as: Option<&'static str>,
}

/// Terminal front end. Owns the session and is the only thing that touches it, so commands
/// and clock ticks are handled strictly one after the other.
pub struct GateballApp<A: AudioPort> {
    config: Config,
    output: OutputMode,
    store_config_as: Option<&'static str>,
    session: GameSession<A>,
}

impl<A: AudioPort> GateballApp<A> {
    pub fn new(flags: GateballAppFlags, audio: A) -> Self {
        let GateballAppFlags {
            config,
            output,
            store_config_as,
        } = flags;

        Self {
            config,
            output,
            store_config_as,
            session: GameSession::new(audio),
        }
    }

    pub fn session(&self) -> &GameSession<A> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession<A> {
        &mut self.session
    }

    /// Applies one command. Returns the snapshot to show, if anything changed.
    pub fn update(&mut self, message: Message, now: Instant) -> Option<MatchSnapshot> {
        trace!("Handling message: {message:?}");

        match message {
            Message::Toggle => Some(self.session.toggle(now)),
            Message::Reset => Some(self.session.reset(now)),
            Message::Score(player) => {
                if self.session.record_score(player) {
                    Some(self.session.snapshot())
                } else {
                    None
                }
            }
            Message::CycleVolume => {
                self.config.sound.volume.cycle();
                info!("Volume set to {}", self.config.sound.volume);
                self.session.audio_mut().update_settings(&self.config.sound);
                if let Some(name) = self.store_config_as {
                    if let Err(e) = confy::store(name, None, &self.config) {
                        error!("Failed to save config: {e}");
                    }
                }
                None
            }
            Message::Help | Message::Quit => None,
        }
    }

    async fn show<W: AsyncWrite + Unpin>(
        &self,
        out: &mut W,
        snapshot: &MatchSnapshot,
    ) -> Result<(), AppError> {
        let mut line = match self.output {
            OutputMode::Text => view::render_text(snapshot, &self.config.teams),
            OutputMode::Json => view::render_json(snapshot)?,
        };
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    async fn show_text<W: AsyncWrite + Unpin>(
        &self,
        out: &mut W,
        text: &str,
    ) -> Result<(), AppError> {
        if self.output == OutputMode::Text {
            out.write_all(text.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
        Ok(())
    }

    /// Reads commands from `input` until it closes or a quit command arrives, ticking the
    /// clock in between
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<(), AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut clock_running_receiver = self.session.get_start_stop_rx();
        let mut clock_running = *clock_running_receiver.borrow_and_update();

        self.show_text(out, HELP).await?;
        self.show(out, &self.session.snapshot()).await?;

        loop {
            let next_time = tick_deadline(clock_running, self.session.next_update_time());

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Input closed");
                        break;
                    };
                    match line.parse::<Message>() {
                        Ok(Message::Quit) => {
                            info!("Quitting");
                            break;
                        }
                        Ok(Message::Help) => self.show_text(out, HELP).await?,
                        Ok(message) => {
                            if let Some(snapshot) = self.update(message, Instant::now()) {
                                self.show(out, &snapshot).await?;
                            }
                        }
                        Err(e) => warn!("{e}"),
                    }
                }
                _ = sleep_until(next_time.unwrap_or_else(Instant::now)), if next_time.is_some() => {
                    if let Some(snapshot) = self.session.update(Instant::now())? {
                        self.show(out, &snapshot).await?;
                    }
                }
                changed = clock_running_receiver.changed() => {
                    match changed {
                        Ok(()) => {
                            clock_running = *clock_running_receiver.borrow_and_update();
                            debug!("Received clock running message: {clock_running}");
                        }
                        Err(_) => break,
                    }
                }
            }
        }

        Ok(())
    }
}

/// The timer is only armed while the match clock reports itself running, so a pause or
/// reset cancels any pending tick
fn tick_deadline(clock_running: bool, next_update: Option<Instant>) -> Option<Instant> {
    if clock_running { next_update } else { None }
}
