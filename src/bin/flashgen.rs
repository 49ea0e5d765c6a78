//! CLI binary for flashgen.
//!
//! A thin shim over the library crate that resolves credentials from the
//! environment, maps CLI flags to `GenerationConfig`, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use flashgen::{
    generate_from_file, write_csv, GenerationConfig, GenerationProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-chunk log
/// lines using [indicatif]. Works correctly when chunks complete out of
/// order (concurrent mode).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of chunks that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_generation_start` (called before any chunks are processed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_generation_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Generating");
        self.bar.reset_eta();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, total_chunks: usize) {
        // Switch from spinner-only style to full progress bar now that we
        // know the actual chunk count.
        self.activate_bar(total_chunks);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating cards from {total_chunks} chunks…"))
        ));
    }

    fn on_chunk_start(&self, chunk_num: usize, _total: usize) {
        self.bar.set_message(format!("chunk {chunk_num}"));
    }

    fn on_chunk_complete(&self, chunk_num: usize, total: usize, card_count: usize) {
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}",
            green("✓"),
            chunk_num,
            total,
            dim(&format!("{card_count} cards")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = truncate_message(error, 80);

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}",
            red("✗"),
            chunk_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_chunks: usize, card_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} cards generated from {} chunks",
                green("✔"),
                bold(&card_count.to_string()),
                total_chunks,
            );
        } else {
            eprintln!(
                "{} {} cards generated  ({} of {} chunks failed)",
                if failed == total_chunks {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&card_count.to_string()),
                red(&failed.to_string()),
                total_chunks,
            );
        }
    }
}

/// Truncate very long error messages to keep the per-chunk log tidy.
/// Measured in characters, not bytes, so multi-byte error text (backend
/// error bodies are often localised) never splits inside a code point.
fn truncate_message(error: &str, max_chars: usize) -> String {
    if error.chars().count() > max_chars {
        let head: String = error.chars().take(max_chars - 1).collect();
        format!("{head}\u{2026}")
    } else {
        error.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate 10 cards from a text file (writes flashcards.csv)
  flashgen notes.txt

  # A 30-card deck from a PDF, to a named file
  flashgen chapter3.pdf -n 30 -o chapter3.csv

  # Harder cards, in German
  flashgen notes.txt --difficulty Hard --language German

  # JSON output with per-chunk outcomes and stats
  flashgen notes.txt --json > deck.json

  # Offline dry run, no API key needed
  flashgen notes.txt --simulate

  # Point at any OpenAI-compatible endpoint
  OPENAI_BASE_URL=http://localhost:8000/v1 flashgen notes.txt --model llama3

ENVIRONMENT VARIABLES:
  DEEPSEEK_API_KEY   API key (checked first)
  DEEPSEEK_KEY       API key (fallback)
  OPENAI_API_KEY     API key (fallback)
  OPENAI_BASE_URL    Chat endpoint base URL (default: https://api.deepseek.com/v1)

SETUP:
  1. Set API key:  export DEEPSEEK_API_KEY=sk-...
  2. Generate:     flashgen notes.txt -o deck.csv
"#;

/// Generate study flashcards from text and PDF files using chat LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "flashgen",
    version,
    about = "Generate study flashcards from text and PDF files using chat LLMs",
    long_about = "Generate question/answer flashcards from documents. The input is split into \
overlapping chunks, the card budget is spread across them, and each chunk is sent to an \
OpenAI-compatible chat endpoint (DeepSeek by default). Results are exported as CSV or JSON.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input text or PDF file.
    input: PathBuf,

    /// Write the deck to this CSV file.
    #[arg(short, long, env = "FLASHGEN_OUTPUT", default_value = "flashcards.csv")]
    output: PathBuf,

    /// Total number of cards to generate across the whole document.
    #[arg(short = 'n', long, env = "FLASHGEN_CARDS", default_value_t = 10)]
    total_cards: usize,

    /// Difficulty hint passed to the model (e.g. Easy, Mixed, Hard).
    #[arg(long, env = "FLASHGEN_DIFFICULTY", default_value = "Mixed")]
    difficulty: String,

    /// Card type hint passed to the model (e.g. Standard, Cloze).
    #[arg(long, env = "FLASHGEN_CARD_TYPE", default_value = "Standard")]
    card_type: String,

    /// Language the cards should be written in.
    #[arg(long, env = "FLASHGEN_LANGUAGE", default_value = "English")]
    language: String,

    /// Chat model ID.
    #[arg(long, env = "FLASHGEN_MODEL", default_value = "deepseek-chat")]
    model: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "FLASHGEN_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Maximum chunk size in characters.
    #[arg(long, env = "FLASHGEN_CHUNK_SIZE", default_value_t = 2000)]
    chunk_size: usize,

    /// Character overlap between consecutive chunks.
    #[arg(long, env = "FLASHGEN_CHUNK_OVERLAP", default_value_t = 200)]
    chunk_overlap: usize,

    /// Number of concurrent chat calls.
    #[arg(short, long, env = "FLASHGEN_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Retries per chunk on LLM failure.
    #[arg(long, env = "FLASHGEN_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-chunk chat call timeout in seconds.
    #[arg(long, env = "FLASHGEN_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Offline mode: derive placeholder cards from the text, no API calls.
    #[arg(long, env = "FLASHGEN_SIMULATE")]
    simulate: bool,

    /// Output structured JSON (cards, per-chunk outcomes, stats) to stdout.
    #[arg(long, env = "FLASHGEN_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "FLASHGEN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FLASHGEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FLASHGEN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run generation ───────────────────────────────────────────────────
    let output = generate_from_file(&cli.input, &config)
        .await
        .context("Generation failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.write_all(b"\n"))
            .context("Failed to write to stdout")?;
    } else {
        write_csv(&output.cards, &cli.output)
            .await
            .context("Failed to write CSV")?;

        // Summary line (the callback already printed the per-chunk log).
        if !cli.quiet {
            eprintln!(
                "{}  {}/{} cards  {}ms  →  {}",
                if output.stats.failed_chunks == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                output.stats.produced_cards,
                output.stats.requested_cards,
                output.stats.total_duration_ms,
                bold(&cli.output.display().to_string()),
            );
            if output.stats.failed_chunks > 0 {
                eprintln!(
                    "   {}",
                    red(&format!(
                        "{}/{} chunks failed",
                        output.stats.failed_chunks, output.stats.total_chunks
                    )),
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`, resolving credentials from the
/// environment. Env access lives here, not in the library.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .chunk_size(cli.chunk_size)
        .chunk_overlap(cli.chunk_overlap)
        .total_cards(cli.total_cards)
        .difficulty(&cli.difficulty)
        .card_type(&cli.card_type)
        .language(&cli.language)
        .model(&cli.model)
        .temperature(cli.temperature)
        .simulate(cli.simulate)
        .concurrency(cli.concurrency)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);

    if !cli.simulate {
        if let Some(key) = resolve_api_key() {
            builder = builder.api_key(key);
        }
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            builder = builder.base_url(base_url);
        }
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// First non-empty key wins: DEEPSEEK_API_KEY, DEEPSEEK_KEY, OPENAI_API_KEY.
fn resolve_api_key() -> Option<String> {
    ["DEEPSEEK_API_KEY", "DEEPSEEK_KEY", "OPENAI_API_KEY"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}
