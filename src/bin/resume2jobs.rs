//! CLI binary for resume2jobs.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SearchConfig`/`SearchFilters` and prints skills and a job table.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume2jobs::{
    extract_skills, extract_text_from_file, resolve_model_for_search, search, DatePosted,
    ExperienceLevel, JobListing, Notice, ProgressCallback, SearchConfig, SearchFilters,
    SearchOutcome, SearchProgressCallback, Stage,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

/// Spinner that names the running stage and logs each finished one.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SearchProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, summary: &str) {
        let summary = if stage == Stage::BuildQuery {
            "done"
        } else {
            summary
        };
        self.bar
            .println(format!("  {} {:<18} {}", green("✓"), stage.to_string(), dim(summary)));
    }

    fn on_notice(&self, notice: &Notice) {
        self.bar.println(format!("  {} {}", yellow("⚠"), notice));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Skills + matching jobs, any seniority, any date
  resume2jobs resume.pdf

  # Entry-level jobs posted in the last week
  resume2jobs resume.pdf --experience entry-level --date-posted past-week

  # Only print the extracted skills
  resume2jobs --skills-only resume.pdf

  # Machine-readable output
  resume2jobs --json resume.pdf > jobs.json

  # Use a specific model
  resume2jobs --provider anthropic --model claude-haiku-4-20250514 resume.pdf

EXPERIENCE LEVELS:
  internship, entry-level, associate, mid-senior, director, executive

DATE POSTED:
  any-time (default), past-month, past-week, past-24-hours

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium if it is not on the system library path

  Variables may also be set in a .env file in the working directory.
"#;

/// Extract skills from a PDF resume and find matching LinkedIn jobs.
#[derive(Parser, Debug)]
#[command(
    name = "resume2jobs",
    version,
    about = "Extract skills from a PDF resume and find matching LinkedIn jobs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the resume PDF.
    resume: PathBuf,

    /// Experience level filter.
    #[arg(long, env = "RESUME2JOBS_EXPERIENCE", value_enum)]
    experience: Option<ExperienceArg>,

    /// Only show jobs posted within this window.
    #[arg(long, env = "RESUME2JOBS_DATE_POSTED", value_enum)]
    date_posted: Option<DatePostedArg>,

    /// LLM model ID (default: gpt-4.1-nano).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// PDF user password for encrypted resumes.
    #[arg(long, env = "RESUME2JOBS_PASSWORD")]
    password: Option<String>,

    /// LLM call timeout in seconds.
    #[arg(long, env = "RESUME2JOBS_LLM_TIMEOUT", default_value_t = 60)]
    llm_timeout: u64,

    /// Job page fetch timeout in seconds.
    #[arg(long, env = "RESUME2JOBS_SCRAPE_TIMEOUT", default_value_t = 30)]
    scrape_timeout: u64,

    /// Output structured JSON (SearchOutcome) instead of a table.
    #[arg(long, env = "RESUME2JOBS_JSON")]
    json: bool,

    /// Stop after skill extraction; no job search.
    #[arg(long)]
    skills_only: bool,

    /// Also print the extracted resume text.
    #[arg(long)]
    show_text: bool,

    /// Shorten job links through TinyURL (falls back to a truncated link).
    #[arg(long, env = "RESUME2JOBS_SHORTEN_LINKS")]
    shorten_links: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "RESUME2JOBS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME2JOBS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "RESUME2JOBS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ExperienceArg {
    Internship,
    EntryLevel,
    Associate,
    MidSenior,
    Director,
    Executive,
}

impl From<ExperienceArg> for ExperienceLevel {
    fn from(v: ExperienceArg) -> Self {
        match v {
            ExperienceArg::Internship => ExperienceLevel::Internship,
            ExperienceArg::EntryLevel => ExperienceLevel::EntryLevel,
            ExperienceArg::Associate => ExperienceLevel::Associate,
            ExperienceArg::MidSenior => ExperienceLevel::MidSeniorLevel,
            ExperienceArg::Director => ExperienceLevel::Director,
            ExperienceArg::Executive => ExperienceLevel::Executive,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DatePostedArg {
    AnyTime,
    PastMonth,
    PastWeek,
    #[value(name = "past-24-hours", alias = "past-day")]
    Past24Hours,
}

impl From<DatePostedArg> for DatePosted {
    fn from(v: DatePostedArg) -> Self {
        match v {
            DatePostedArg::AnyTime => DatePosted::AnyTime,
            DatePostedArg::PastMonth => DatePosted::PastMonth,
            DatePostedArg::PastWeek => DatePosted::PastWeek,
            DatePostedArg::Past24Hours => DatePosted::Past24Hours,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level library logs when it is active.
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

    let spinner = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(&cli, spinner.clone().map(|cb| cb as ProgressCallback))?;
    let filters = SearchFilters::new(
        cli.experience.map(Into::into),
        cli.date_posted.map(Into::into),
    );

    // ── Skills-only mode ─────────────────────────────────────────────────
    if cli.skills_only {
        let model = resolve_model_for_search(&config).context("No language model available")?;
        let text = extract_text_from_file(&cli.resume, config.password.as_deref())
            .await
            .with_context(|| format!("Failed to read {}", cli.resume.display()))?;
        let extraction = extract_skills(model.as_ref(), &text, &config).await;
        if let Some(ref s) = spinner {
            s.finish();
        }

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&extraction.skills)
                    .context("Failed to serialise skills")?
            );
        } else {
            if cli.show_text {
                print_resume_text(&text);
            }
            print_skills(&extraction.skills);
            if let Some(ref e) = extraction.error {
                if !cli.quiet {
                    eprintln!("{} {}", yellow("⚠"), e);
                }
            }
        }
        return Ok(());
    }

    // ── Full search ──────────────────────────────────────────────────────
    let outcome = search(&cli.resume, &filters, &config)
        .await
        .context("Search failed")?;
    if let Some(ref s) = spinner {
        s.finish();
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if cli.show_text {
        print_resume_text(&outcome.resume_text);
    }
    let links = if cli.shorten_links {
        shortened_links(&outcome.listings, SHORTENER_URL, cli.scrape_timeout).await
    } else {
        outcome.listings.iter().map(|job| display_link(&job.link)).collect()
    };
    print_outcome(&outcome, &links);

    // The spinner already printed notices as they were raised.
    if !cli.quiet && !show_progress {
        for notice in &outcome.notices {
            eprintln!("{} {}", yellow("⚠"), notice);
        }
    }
    if !cli.quiet {
        eprintln!(
            "{}",
            dim(&format!(
                "{} skills, {} jobs in {}ms",
                outcome.skills.len(),
                outcome.listings.len(),
                outcome.stats.total_duration_ms
            ))
        );
    }

    Ok(())
}

/// Map CLI args to `SearchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SearchConfig> {
    let mut builder = SearchConfig::builder()
        .llm_timeout_secs(cli.llm_timeout)
        .scrape_timeout_secs(cli.scrape_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

// ── Rendering ────────────────────────────────────────────────────────────────

const TITLE_WIDTH: usize = 40;
const COMPANY_WIDTH: usize = 20;
const LOCATION_WIDTH: usize = 25;
const LINK_WIDTH: usize = 50;

const SHORTENER_URL: &str = "https://tinyurl.com/api-create.php";

fn print_resume_text(text: &str) {
    println!("{}", bold("Resume text"));
    println!("{text}");
    println!();
}

fn print_skills(skills: &[String]) {
    if skills.is_empty() {
        println!("{}", yellow("Could not extract skills from the resume."));
    } else {
        println!("{} {}", bold("Skills:"), skills.join(", "));
    }
}

fn print_outcome(outcome: &SearchOutcome, links: &[String]) {
    print_skills(&outcome.skills);
    if outcome.skills.is_empty() {
        return;
    }
    println!("{} {}", bold("Search:"), dim(outcome.search_url.as_str()));
    println!();

    if outcome.listings.is_empty() {
        println!("No job listings found.");
        return;
    }

    for line in job_table(&outcome.listings, links) {
        println!("{line}");
    }
}

/// Render listings as fixed-width rows: title, company, location, link.
///
/// `links` holds the display form of each listing's link, in the same order.
fn job_table(listings: &[JobListing], links: &[String]) -> Vec<String> {
    let title_col = TITLE_WIDTH + 3;
    let mut lines = Vec::with_capacity(listings.len() + 2);
    lines.push(format!(
        "{:<title_col$}  {:<COMPANY_WIDTH$}  {:<LOCATION_WIDTH$}  {}",
        "Title", "Company", "Location", "Link"
    ));
    lines.push(cyan(&"─".repeat(title_col + COMPANY_WIDTH + LOCATION_WIDTH + 6 + 4)));

    for (job, link) in listings.iter().zip(links) {
        lines.push(format!(
            "{:<title_col$}  {:<COMPANY_WIDTH$}  {:<LOCATION_WIDTH$}  {}",
            ellipsize(&job.title, TITLE_WIDTH),
            clip(&job.company, COMPANY_WIDTH),
            clip(&job.location, LOCATION_WIDTH),
            link
        ));
    }
    lines
}

/// Link as shown in the table: first 50 chars plus "..." when longer.
fn display_link(link: &str) -> String {
    ellipsize(link, LINK_WIDTH)
}

/// Shorten every link through `endpoint`; a link that cannot be shortened
/// falls back to [`display_link`].
async fn shortened_links(
    listings: &[JobListing],
    endpoint: &str,
    timeout_secs: u64,
) -> Vec<String> {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Link shortener unavailable: {}", e);
            return listings.iter().map(|job| display_link(&job.link)).collect();
        }
    };

    let mut links = Vec::with_capacity(listings.len());
    for job in listings {
        let link = match shorten(&client, endpoint, &job.link).await {
            Ok(short) => short,
            Err(e) => {
                tracing::debug!("Could not shorten {}: {}", job.link, e);
                display_link(&job.link)
            }
        };
        links.push(link);
    }
    links
}

async fn shorten(client: &reqwest::Client, endpoint: &str, link: &str) -> Result<String> {
    let body = client
        .get(endpoint)
        .query(&[("url", link)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let short = body.trim();
    anyhow::ensure!(short.starts_with("http"), "unexpected shortener reply: {short:?}");
    Ok(short.to_string())
}

/// First `max` chars plus "..." when longer than `max`.
fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", clip(s, max))
    } else {
        s.to_string()
    }
}

/// First `max` chars.
fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
