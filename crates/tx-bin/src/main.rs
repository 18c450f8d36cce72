//! Typix entrypoint: analyze one text and report where its highlights land.
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use core_config::{EffectiveConfig, load_from};
use core_issues::AnalyzerResponse;
use core_layout::{ManualFrameScheduler, PlainTextSurface, Rect};
use core_session::{AnalysisDriver, Completion, HighlightEngine, StaticAnalyzer};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod report;

use report::RunReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "typix", version, about = "Issue positions and highlight rectangles for a text field")]
struct Args {
    /// Text to analyze. Ignored when `--input` is given.
    pub text: Option<String>,
    /// Read the text from a UTF-8 file instead.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Analyzer response: a JSON payload or the plain corrected text.
    #[arg(long)]
    pub response: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `typix.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Field width in px.
    #[arg(long, default_value_t = 480.0)]
    pub width: f64,
    /// Field height in px.
    #[arg(long, default_value_t = 320.0)]
    pub height: f64,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Apply every non-conflicting fix and print the corrected text.
    #[arg(long)]
    pub apply_all: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("typix.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "typix.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn read_text(args: &Args) -> Result<String> {
    if let Some(path) = &args.input {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
        return Ok(content);
    }
    match &args.text {
        Some(text) => Ok(text.clone()),
        None => bail!("nothing to analyze: pass TEXT or --input FILE"),
    }
}

/// JSON when it parses as an analyzer payload, otherwise the file is the
/// corrected text itself (one trailing newline dropped).
fn parse_response(content: &str) -> AnalyzerResponse {
    match serde_json::from_str::<AnalyzerResponse>(content) {
        Ok(response) => response,
        Err(_) => {
            let text = content.strip_suffix('\n').unwrap_or(content);
            AnalyzerResponse::Rewrite(text.strip_suffix('\r').unwrap_or(text).to_string())
        }
    }
}

fn read_response(path: &Path) -> Result<AnalyzerResponse> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading response {}", path.display()))?;
    Ok(parse_response(&content))
}

/// Run one document analysis through the driver and measure the result on a
/// plain multi-line field of `bounding_box`.
async fn analyze(
    text: String,
    response: AnalyzerResponse,
    config: EffectiveConfig,
    bounding_box: Rect,
) -> Result<(HighlightEngine, PlainTextSurface, RunReport)> {
    let mut engine =
        HighlightEngine::new(config, Arc::new(ManualFrameScheduler::new())).with_text(text.clone());
    let (mut driver, mut rx) = AnalysisDriver::new(StaticAnalyzer::new(response), 4);
    driver.submit(engine.request_document());
    let event = rx.recv().await.context("analyzer driver closed")?;
    match engine.handle_event(event) {
        Completion::Applied { issues, dropped } => {
            info!(target: "runtime", issues, dropped, "analysis_applied")
        }
        Completion::Stale => warn!(target: "runtime", "analysis_stale"),
        Completion::Failed => bail!("analysis failed"),
    }

    let surface = PlainTextSurface::multi_line(text, bounding_box);
    let frame = engine.render_now(&surface);
    let report = RunReport::collect(&engine, &frame);
    debug!(target: "runtime.metrics", metrics = ?engine.metrics().snapshot(), "frame_built");
    Ok((engine, surface, report))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let text = read_text(&args)?;
    let response = match &args.response {
        Some(path) => read_response(path)?,
        None => AnalyzerResponse::Rewrite(text.clone()),
    };
    let config = load_from(args.config.clone())?;
    let path_str = config.path.as_ref().map(|p| p.display().to_string());
    info!(
        target: "runtime.startup",
        config = path_str.as_deref(),
        size_bytes = text.len(),
        width = args.width,
        height = args.height,
        "bootstrap_complete"
    );

    let bounding_box = Rect::new(0.0, 0.0, args.width, args.height);
    let (mut engine, mut surface, mut report) =
        analyze(text, response, config.effective(), bounding_box).await?;
    if args.apply_all {
        let bulk = engine.apply_all_to_surface(&mut surface)?;
        report = report.with_applied(engine.text(), &bulk);
    }

    let out = match args.format {
        Format::Text => report.render_text(),
        Format::Json => serde_json::to_string_pretty(&report)?,
    };
    println!("{}", out.trim_end());
    info!(target: "runtime", "shutdown");
    Ok(())
}
