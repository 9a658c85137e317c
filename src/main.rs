use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use viralclip::app::{App, AppState, Session, Ticket, View};
use viralclip::config::{API_KEY_VARS, Config, Settings};
use viralclip::gemini::{ClipService, GeminiClient};
use viralclip::playback::{MAX_SPEED, MIN_SPEED, Playback, is_valid_speed, timeline};
use viralclip::{Clip, ClipError, output};

mod cli;

use cli::{Cli, OutputFormat};

const PREVIEW_TICK: Duration = Duration::from_millis(250);

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("viralclip.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("viralclip")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = match API_KEY_VARS.iter().find(|name| std::env::var(name).is_ok()) {
        Some(name) => format!("  \x1b[32m✅\x1b[0m {name}"),
        None => format!("  \x1b[31m❌\x1b[0m {} (not set, required)", API_KEY_VARS.join(" or ")),
    };

    format!(
        "\nCREDENTIALS:\n{key_line}\n\nConfig: {}\nLogs are written to: {}",
        viralclip::config::config_path().display(),
        log_dir().join("viralclip.log").display()
    )
}

fn spinner(url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.magenta} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(format!("Generating clips for {url}..."));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders controller state to the terminal
struct Presenter {
    format: OutputFormat,
    color: bool,
    output: Option<PathBuf>,
    verbose: bool,
}

impl Presenter {
    fn show(&self, state: &AppState) -> Result<()> {
        match state.view() {
            View::Loading => {}
            View::Idle => println!("{}", output::render_empty_state()),
            View::Error => {
                if let Some(ref message) = state.error {
                    self.show_error(message);
                }
                if self.verbose {
                    if let Some(ref cause) = state.cause {
                        eprintln!("Cause: {cause}");
                    }
                }
            }
            View::Results => self.show_clips(&state.clips)?,
        }
        Ok(())
    }

    fn show_error(&self, message: &str) {
        if self.color {
            eprintln!("\x1b[31m{message}\x1b[0m");
        } else {
            eprintln!("{message}");
        }
    }

    fn show_clips(&self, clips: &[Clip]) -> Result<()> {
        if self.verbose {
            for (i, clip) in clips.iter().enumerate() {
                for note in clip.advisories() {
                    eprintln!("Clip #{}: {note}", i + 1);
                }
            }
        }

        let rendered = match self.format {
            OutputFormat::Text => output::render_cards(clips, self.color && self.output.is_none()),
            OutputFormat::Json => output::render_json(clips)?,
        };

        if let Some(ref path) = self.output {
            std::fs::write(path, &rendered)?;
            eprintln!("Output written to: {}", path.display());
        } else {
            println!("{rendered}");
        }
        Ok(())
    }
}

async fn preview(clips: &[Clip], number: usize, speed: f64, color: bool) -> Result<()> {
    if number == 0 || number > clips.len() {
        bail!("--preview {number} is out of range (1-{})", clips.len());
    }
    if !is_valid_speed(speed) {
        bail!("--speed must be between {MIN_SPEED} and {MAX_SPEED}, got {speed}");
    }
    let clip = &clips[number - 1];

    println!(
        "\nPreview #{number}: {} ({:.1}s at {speed}x)",
        clip.title,
        clip.duration()
    );

    if !std::io::stdout().is_terminal() {
        for (position, caption) in timeline(clip, PREVIEW_TICK.as_secs_f64() * speed) {
            println!("{}", output::render_caption_frame(position, caption, false));
        }
        return Ok(());
    }

    let mut playback = Playback::new(clip);
    playback.toggle();
    let mut interval = tokio::time::interval(PREVIEW_TICK);
    let mut shown = None;
    let mut first = true;

    loop {
        interval.tick().await;
        let caption = playback.active_caption(clip);
        if first || caption != shown {
            println!("{}", output::render_caption_frame(playback.position(), caption, color));
            shown = caption;
            first = false;
        }
        if playback.advance(PREVIEW_TICK.as_secs_f64() * speed) {
            break;
        }
    }

    println!("■ end of clip");
    Ok(())
}

/// Read URLs from stdin until EOF. Each submission runs concurrently; only the
/// latest one is applied when responses overlap.
async fn interactive(app: App<GeminiClient>, presenter: &Presenter) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<(Ticket, Result<Vec<Clip>, ClipError>)>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::new(app);

    presenter.show(session.app().state())?;
    eprintln!("Paste a YouTube URL and press Enter (Ctrl-D to quit).");

    while !session.is_finished() {
        tokio::select! {
            line = lines.next_line(), if session.input_open() => {
                match line? {
                    Some(line) => match session.submit_line(&line) {
                        Ok(ticket) => {
                            let service = session.app().service().clone();
                            let url = session.app().state().url.clone();
                            let tx = tx.clone();
                            eprintln!("Generating clips for {url}...");
                            tokio::spawn(async move {
                                let result = service.request_clips(&url).await;
                                let _ = tx.send((ticket, result));
                            });
                        }
                        Err(e) => presenter.show_error(&e.to_string()),
                    },
                    None => session.close_input(),
                }
            }
            Some((ticket, result)) = rx.recv(), if session.in_flight() > 0 => {
                if session.receive(ticket, result) {
                    presenter.show(session.app().state())?;
                }
            }
            else => break,
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {e}");
        Config::default()
    });

    // Credential check happens before any request can be made
    let settings = Settings::resolve(&config, cli.model.as_deref())?;

    let format = cli
        .format
        .or_else(|| {
            config
                .format
                .as_deref()
                .and_then(|f| <OutputFormat as clap::ValueEnum>::from_str(f, true).ok())
        })
        .unwrap_or(OutputFormat::Text);

    let color = !cli.no_color && config.color.unwrap_or(true) && std::io::stdout().is_terminal();

    if cli.verbose {
        eprintln!("Model: {}\nEndpoint: {}", settings.model, settings.api_base);
    }

    let client = GeminiClient::new(reqwest::Client::new(), settings.api_key, settings.model)
        .with_api_base(settings.api_base);
    let mut app = App::new(client);

    let presenter = Presenter {
        format,
        color,
        output: cli.output.clone(),
        verbose: cli.verbose,
    };

    let Some(url) = cli.url else {
        return interactive(app, &presenter).await;
    };

    let pb = spinner(url.trim());
    let result = app.submit(&url).await;
    pb.finish_and_clear();

    presenter.show(app.state())?;

    if result.is_err() {
        std::process::exit(1);
    }

    if let Some(number) = cli.preview {
        preview(&app.state().clips, number, cli.speed, color).await?;
    }

    Ok(())
}
