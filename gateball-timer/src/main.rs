use clap::Parser;
use gateball_timer::{
    APP_NAME,
    app::{GateballApp, GateballAppFlags, OutputMode},
    config::Config,
    sound_controller::{SilentAudio, SoundController},
};
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::PathBuf;
use tokio::io::{BufReader, stdin, stdout};
use toml::Table;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// Don't open the audio device, cues are only logged
    no_sound: bool,

    #[clap(long)]
    /// Print each update as a JSON snapshot instead of a text line
    json: bool,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match &args.log_location {
        Some(path) => path.clone(),
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("gateball-timer-logs");
            path
        }
    };
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path;
    log_path.push("gateball-timer-log.txt");
    archived_log_path.push("gateball-timer-log-{}.txt.gz");

    #[cfg(debug_assertions)]
    eprintln!("Log path: {}", log_path.display());

    // Only log to the console in debug mode, stdout belongs to the scoreboard
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .as_os_str()
            .to_str()
            .ok_or("Log path is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Setup the logging from all locations to use `LevelFilter::Error`
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    // Setup the top level logging config
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build("gateball_timer", log_level))
        .logger(Logger::builder().build("gateball_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();

    Ok(())
}

fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_path = confy::get_configuration_file_path(APP_NAME, None)?;
    info!("Reading config file from {config_path:?}");

    let config = match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, migrating what can be salvaged. Error: {e}");
            let config = match std::fs::read_to_string(&config_path)
                .ok()
                .and_then(|text| text.parse::<Table>().ok())
            {
                Some(old) => Config::migrate(&old),
                None => Config::default(),
            };
            confy::store(APP_NAME, None, &config)?;
            config
        }
    };

    Ok(config)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    init_logging(&args)?;
    info!("Starting Gateball Timer");

    let config = load_config()?;
    let sound_settings = config.sound.clone();

    let flags = GateballAppFlags {
        config,
        output: if args.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        },
        store_config_as: Some(APP_NAME),
    };

    let input = BufReader::new(stdin());
    let mut output = stdout();

    if !sound_settings.use_device(args.no_sound) {
        info!("Sound disabled, cues will only be logged");
        let mut app = GateballApp::new(flags, SilentAudio::default());
        app.run(input, &mut output).await?;
    } else {
        let mut app = GateballApp::new(flags, SoundController::new(sound_settings));
        app.run(input, &mut output).await?;
        app.session_mut().audio_mut().shutdown().await;
    }

    info!("Exiting");
    Ok(())
}
