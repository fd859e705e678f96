use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use led_training::config::{ContentSettings, PreferenceStore, Settings};
use led_training::content::Curriculum;
use led_training::ffmpeg::probe_size;
use led_training::i18n::{Language, LanguageSession};
use led_training::logging::{self, LogLevel};
use led_training::media::{MediaCatalog, MediaItem};
use led_training::presentation::{Slide, build_deck};
use led_training::texture_loader::read_orientation;

#[derive(Parser)]
#[command(name = "led-training", version, about = "Bilingual LED display screen training")]
struct Cli {
    /// Settings file (window, carousel and content paths)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where the language preference is stored
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the training modules
    Modules,
    /// Print the slide outline of a module
    Deck {
        /// Module id, see `modules`
        module: String,
    },
    /// Print the carousel built for a media base path
    Media {
        /// e.g. "/Indoor screen.mp4"
        base: String,
        /// Inspect each file under the media root
        #[arg(long)]
        probe: bool,
    },
    /// Show the selected language, or select one
    Language {
        /// "en" or "zh"
        language: Option<Language>,
    },
    /// Open the presentation window
    #[cfg(feature = "desktop")]
    Present {
        /// Module id; the module grid when omitted
        module: Option<String>,
    },
}

/// Everything a command may need, loaded once.
struct App {
    settings: Settings,
    language: LanguageSession,
}

impl App {
    fn load(cli: &Cli) -> Result<Self> {
        let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
        let store = match &cli.preferences {
            Some(path) => PreferenceStore::new(path),
            None => PreferenceStore::default_location().context("Failed to locate preferences")?,
        };
        debug!(path = %store.path().display(), "Preference store");
        Ok(Self { settings, language: LanguageSession::load(store) })
    }

    fn curriculum(&self) -> Result<Curriculum> {
        match &self.settings.content.modules {
            Some(path) => Curriculum::load(path).with_context(|| format!("Failed to load modules from {}", path.display())),
            None => Curriculum::builtin().context("Built-in modules are invalid"),
        }
    }

    fn catalog(&self) -> Result<MediaCatalog> {
        match &self.settings.content.catalog {
            Some(path) => MediaCatalog::load(path).with_context(|| format!("Failed to load catalog from {}", path.display())),
            None => MediaCatalog::builtin().context("Built-in catalog is invalid"),
        }
    }
}

fn list_modules(app: &App) -> Result<()> {
    let curriculum = app.curriculum()?;
    let t = app.language.translator();
    println!("{}", t.t("modules.title"));
    println!("{}\n", t.t("modules.subtitle"));
    for (i, module) in curriculum.modules().iter().enumerate() {
        println!("{:>2}. {} [{}]", i + 1, module.title, module.id);
        let (shown, more) = module.preview_topics();
        for topic in shown {
            println!("      • {topic}");
        }
        if more > 0 {
            println!("      +{more} {}", t.t("modules.moreTopics"));
        }
    }
    Ok(())
}

fn print_deck(app: &App, module_id: &str) -> Result<()> {
    let curriculum = app.curriculum()?;
    let catalog = app.catalog()?;
    let module = curriculum.find(module_id)?;
    let deck = build_deck(module, &catalog, app.language.translator());

    for (i, slide) in deck.slides().iter().enumerate() {
        println!("{:>3} / {}  {:<9} {}", i + 1, deck.len(), slide.kind(), slide.title());
        match slide {
            Slide::Image { media, .. } => {
                for item in media.items() {
                    println!("                    {}", item.path());
                }
            }
            Slide::List { items, .. } => println!("                    {} items", items.len()),
            _ => {}
        }
    }
    Ok(())
}

fn describe_file(content: &ContentSettings, item: &MediaItem) -> String {
    let path = content.resolve_media(item.path());
    if item.is_video() {
        return match probe_size(&path) {
            Ok((w, h)) => format!("video {w}x{h}"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Probe failed");
                "video (unreadable)".to_string()
            }
        };
    }
    match fs::read(&path) {
        Ok(bytes) => {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            format!("image, {} bytes, orientation {}", bytes.len(), read_orientation(&bytes, ext))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read image");
            "image (missing)".to_string()
        }
    }
}

fn print_media(app: &App, base: &str, probe: bool) -> Result<()> {
    let catalog = app.catalog()?;
    let sequence = catalog.sequence_for(base);
    for (i, item) in sequence.items().iter().enumerate() {
        if probe {
            let info = describe_file(&app.settings.content, item);
            println!("{:>2}. {}  ({info})", i + 1, item.path());
        } else {
            println!("{:>2}. {}", i + 1, item.path());
        }
    }
    Ok(())
}

fn language(app: &mut App, language: Option<Language>) -> Result<()> {
    match language {
        Some(language) => {
            app.language.set_language(language).context("Failed to save language preference")?;
            println!("{language}");
        }
        None => println!("{}", app.language.language()),
    }
    Ok(())
}

#[cfg(feature = "desktop")]
fn present(app: App, module_id: Option<&str>) -> Result<()> {
    let curriculum = app.curriculum()?;
    let catalog = app.catalog()?;
    let start = match module_id {
        Some(id) => {
            let module = curriculum.find(id)?;
            curriculum.modules().iter().position(|m| m.id == module.id)
        }
        None => None,
    };
    led_training::presenter::run(app.settings, curriculum, catalog, app.language, start)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let mut app = App::load(&cli)?;
    match &cli.command {
        Command::Modules => list_modules(&app),
        Command::Deck { module } => print_deck(&app, module),
        Command::Media { base, probe } => print_media(&app, base, *probe),
        Command::Language { language: choice } => language(&mut app, *choice),
        #[cfg(feature = "desktop")]
        Command::Present { module } => present(app, module.as_deref()),
    }
}
