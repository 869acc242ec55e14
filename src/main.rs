use eframe::egui;
use reef_spotter::app::ReefApp;
use reef_spotter::config::GameConfig;
use reef_spotter::scene::SceneDeck;
use std::path::PathBuf;

const USAGE: &str = "Usage: reef-spotter [deck.json] [--config config.json]";

struct Args {
    deck: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        deck: None,
        config: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if args.deck.is_none() => args.deck = Some(PathBuf::from(arg)),
            _ => return Err(format!("Unexpected argument: {arg}")),
        }
    }
    Ok(args)
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    // Logging is not up yet, so a bad config is reported once it is.
    let (config, config_error) = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => (config, None),
            Err(e) => (GameConfig::default(), Some(e)),
        },
        None => (GameConfig::default(), None),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    if let Some(e) = config_error {
        log::warn!("{}; using default settings", e);
    }

    let deck = match &args.deck {
        Some(path) => match SceneDeck::load(path) {
            Ok(deck) => Some(deck),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let title = match &args.deck {
        Some(path) => format!(
            "Reef Spotter — {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "Reef Spotter".to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title(&title),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(ReefApp::new(config, deck)))),
    ) {
        log::error!("Failed to run eframe: {}", e);
        std::process::exit(1);
    }
}
