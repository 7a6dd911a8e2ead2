use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use simplelog::{Config, WriteLogger};

use spreadview::panic_handler::initialize_panic_handler;
use spreadview::settings::{Settings, default_config_path};
use spreadview::spread::{ContainerSize, FileResolver, HeadlessHost, SpreadElement, ThreadedLoader};
use spreadview::{Book, TwoPageView, ZoomDirection};

const LOAD_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Css,
    Json,
}

/// Lay out a two-page spread of a book manifest and show what a viewer would
/// draw and load
#[derive(Debug, Parser)]
#[command(name = "spreadview", version)]
struct Cli {
    /// Book manifest (JSON page data grouped by spread)
    manifest: PathBuf,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "spreadview.log")]
    log_file: PathBuf,

    /// Container width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Container height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Page to open at; clamped to the displayable range
    #[arg(long, allow_negative_numbers = true)]
    index: Option<isize>,

    /// Spreads to advance after opening (negative goes back)
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    flip: isize,

    /// Zoom steps applied in order: in, out or fit
    #[arg(long)]
    zoom: Vec<ZoomDirection>,

    /// Image loader threads
    #[arg(long, default_value_t = 2)]
    workers: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Css)]
    format: OutputFormat,
}

fn load_settings(path: Option<&Path>) -> Settings {
    match path {
        Some(path) => Settings::load_or_default(path),
        None => match default_config_path() {
            Some(path) => Settings::load_or_default(&path),
            None => Settings::default(),
        },
    }
}

/// Apply finished loads until every dispatched request has reported back
fn wait_for_loads(view: &mut TwoPageView<HeadlessHost, ThreadedLoader>) -> usize {
    let started = Instant::now();
    let mut finished = 0;
    while finished < view.loader().dispatched() && started.elapsed() < LOAD_TIMEOUT {
        let drained = view.drain_completions();
        if drained == 0 {
            std::thread::sleep(Duration::from_millis(5));
        }
        finished += drained;
    }
    finished
}

fn print_css(view: &TwoPageView<HeadlessHost, ThreadedLoader>) {
    let state = view.state();
    let displayed = view.displayed_indices().as_array();
    println!("/* spread [{}, {}] */", displayed[0], displayed[1]);
    println!(
        "/* reduce {} ({}) */",
        state.zoom.reduce,
        if state.zoom.is_autofit() { "auto" } else { "fixed" }
    );
    println!("/* classes {} */", view.host().classes().join(" "));
    let prefetched: Vec<String> = view.prefetch_window().indices().map(|i| i.to_string()).collect();
    println!("/* prefetched {} */", prefetched.join(", "));
    let loaded: Vec<String> = view
        .book()
        .pages()
        .iter()
        .filter(|p| p.is_loaded())
        .map(|p| p.index.to_string())
        .collect();
    println!("/* loaded {} */", loaded.join(", "));

    if let Some(styles) = view.styles() {
        for element in SpreadElement::ALL {
            println!(".{} {{ {} }}", element.as_str(), styles.for_element(element).to_css());
        }
    }
}

fn print_json(view: &TwoPageView<HeadlessHost, ThreadedLoader>) -> Result<()> {
    let loaded: Vec<usize> = view
        .book()
        .pages()
        .iter()
        .filter(|p| p.is_loaded())
        .map(|p| p.index)
        .collect();
    let output = serde_json::json!({
        "displayed": view.displayed_indices(),
        "reduce": view.state().zoom.reduce,
        "autofit": view.state().zoom.is_autofit(),
        "classes": view.host().classes(),
        "scroll": view.host().scroll(),
        "prefetched": view.prefetch_window().indices().collect::<Vec<_>>(),
        "loaded": loaded,
        "geometry": view.geometry(),
        "styles": view.styles(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_panic_handler();

    let settings = load_settings(cli.config.as_deref());
    WriteLogger::init(
        settings.level_filter(),
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("creating log file {}", cli.log_file.display()))?,
    )?;
    info!("Starting spreadview for {}", cli.manifest.display());

    let book = Book::load(&cli.manifest)
        .with_context(|| format!("loading manifest {}", cli.manifest.display()))?;
    let root = cli
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let loader = ThreadedLoader::new(cli.workers, FileResolver::new(root).into_resolver());
    let host = HeadlessHost::new(ContainerSize::new(cli.width, cli.height));

    let mut view = TwoPageView::new(book, settings.to_config(), host, loader);
    view.init().context("initialising two-page view")?;

    if let Some(index) = cli.index {
        view.jump_to_index(index);
    }
    for _ in 0..cli.flip.unsigned_abs() {
        if cli.flip > 0 {
            view.next_spread();
        } else {
            view.prev_spread();
        }
    }
    for direction in &cli.zoom {
        view.zoom(*direction);
    }

    let finished = wait_for_loads(&mut view);
    debug!(
        "{finished} of {} image requests finished",
        view.loader().dispatched()
    );

    match cli.format {
        OutputFormat::Css => print_css(&view),
        OutputFormat::Json => print_json(&view)?,
    }
    Ok(())
}
