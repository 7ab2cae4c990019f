//! CLI command definitions, routing, and tracing setup.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use roundup_core::{MarkProgress, MarkSummary, RoundupRequest};
use roundup_pinboard::PinboardClient;
use roundup_shared::{
    AppConfig, BookmarkSource, DEFAULT_TAG, RoundupError, expand_home, init_config, load_config,
    load_config_from, resolve_api_token,
};
use tracing::info;

/// How far back `generate` looks when `--from` is omitted.
const DEFAULT_LOOKBACK_DAYS: i64 = 8;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Roundup — turn tagged bookmarks into a weekly markdown digest.
#[derive(Parser)]
#[command(
    name = "roundup",
    version,
    about = "Generate a markdown roundup from Pinboard bookmarks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.roundup/roundup.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a roundup.
    Generate(GenerateArgs),

    /// Start an interactive roundup shell.
    Shell,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `generate`.
#[derive(Args, Clone, Debug)]
pub(crate) struct GenerateArgs {
    /// Which tag would you like to use to seed the entries?
    #[arg(long, default_value = DEFAULT_TAG)]
    pub tag: String,

    /// Include entries from this date (yyyy-MM-dd). Defaults to 8 days ago.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<DateTime<Utc>>,

    /// Include entries up to this date (yyyy-MM-dd). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub to: Option<DateTime<Utc>>,

    /// Tag the configured roundup bookmarks as processed after writing the report.
    #[arg(long)]
    pub mark_as_processed: bool,

    /// File to write the report to. Ignored when --stdout is given.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the report to standard output.
    #[arg(long)]
    pub stdout: bool,
}

/// Config subcommands.
#[derive(Subcommand, Clone, Debug)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Accepts `yyyy-MM-dd` (UTC midnight) or a full RFC 3339 timestamp.
fn parse_date(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let midnight = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0));
    if let Some(midnight) = midnight {
        return Ok(midnight.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("expected a date like 2024-03-01, got '{s}'"))
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so that `--stdout` reports can be piped.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "roundup=info",
        1 => "roundup=debug",
        _ => "roundup=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Generate(args) => cmd_generate(&config, &args).await,
        Command::Shell => crate::shell::run(&config).await,
        Command::Config { action } => cmd_config(&config, &action),
    }
}

/// Load the config from `--config` if given, else from the default location.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

pub(crate) fn cmd_config(config: &AppConfig, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = init_config()?;
            println!("Config initialized at: {}", path.display());
        }
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{toml_str}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

pub(crate) async fn cmd_generate(config: &AppConfig, args: &GenerateArgs) -> Result<()> {
    let token = resolve_api_token(config)?;
    let client = PinboardClient::new(&config.pinboard, token)?;
    write_roundup(&client, config, args).await
}

/// Generate the report, write it out, then mark bookmarks if asked to.
///
/// Nothing is marked unless the report was written first.
async fn write_roundup<S: BookmarkSource>(
    client: &S,
    config: &AppConfig,
    args: &GenerateArgs,
) -> Result<()> {
    let now = Utc::now();
    let from = args
        .from
        .unwrap_or_else(|| now - Duration::days(DEFAULT_LOOKBACK_DAYS));
    let to = args.to.unwrap_or(now);
    if from > to {
        let message = format!("--from ({from}) is after --to ({to})");
        return Err(RoundupError::validation(message).into());
    }

    let destination = ReportDestination::resolve(
        args.stdout,
        args.output.as_deref(),
        &config.roundup.output_file,
    )?;

    info!(tag = %args.tag, %from, %to, "generating roundup");

    let request = RoundupRequest {
        tag: args.tag.clone(),
        from,
        to,
    };
    let report = roundup_core::generate(client, &request, &config.roundup.priority_hrefs)
        .await?
        .join("\n");

    eprintln!(
        "writing the roundup for tag \"{}\" to the {destination}.",
        args.tag
    );
    destination.write(&report)?;

    if args.mark_as_processed {
        let progress = CliProgress::new();
        let summary =
            roundup_core::mark_as_processed(client, &config.roundup.twi_tag, &progress).await?;
        eprintln!(
            "marked {} bookmark(s) tagged \"{}\" as processed ({} already were).",
            summary.marked, config.roundup.twi_tag, summary.skipped
        );
    }

    Ok(())
}

/// Where a generated report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReportDestination {
    Console,
    File(PathBuf),
}

impl ReportDestination {
    /// `--stdout` always wins; otherwise `--output`, otherwise the configured default.
    pub(crate) fn resolve(
        stdout: bool,
        output: Option<&Path>,
        default_output: &str,
    ) -> Result<Self> {
        if stdout {
            return Ok(Self::Console);
        }
        let path = match output {
            Some(p) => p.to_path_buf(),
            None => expand_home(default_output)?,
        };
        Ok(Self::File(path))
    }

    fn write(&self, report: &str) -> Result<()> {
        match self {
            Self::Console => println!("{report}"),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| RoundupError::io(parent, e))?;
                }
                std::fs::write(path, report).map_err(|e| RoundupError::io(path, e))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ReportDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::File(path) => write!(f, "file \"{}\"", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Marking progress shown as an indicatif bar on stderr.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        bar.set_message("Fetching bookmarks to mark");
        Self { bar }
    }
}

impl MarkProgress for CliProgress {
    fn started(&self, pending: usize) {
        self.bar.set_message(format!("Marking {pending} bookmark(s)"));
    }

    fn marked(&self, href: &str, current: usize, total: usize) {
        self.bar.set_message(format!("Marking [{current}/{total}] {href}"));
    }

    fn done(&self, _summary: &MarkSummary) {
        self.bar.finish_and_clear();
    }
}

// A failed pass never reaches `done`; the spinner must not outlive it.
impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use roundup_shared::PinboardConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const TOKEN: &str = "josh:ABC123";

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("roundup-cli-{name}-{}", std::process::id()))
    }

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            pinboard: PinboardConfig {
                base_url: format!("{}/v1", server.uri()),
                timeout_secs: 5,
                ..PinboardConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn client_for(config: &AppConfig) -> PinboardClient {
        PinboardClient::new(&config.pinboard, TOKEN).unwrap()
    }

    fn args_for(output: &Path, mark_as_processed: bool) -> GenerateArgs {
        GenerateArgs {
            tag: "twis".into(),
            from: Some(Utc.with_ymd_and_hms(2024, 2, 24, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()),
            mark_as_processed,
            output: Some(output.to_path_buf()),
            stdout: false,
        }
    }

    fn two_posts() -> serde_json::Value {
        serde_json::json!([
            {
                "href": "https://example.com/older",
                "description": "Older",
                "extended": "",
                "time": "2024-03-01T08:00:00Z",
                "shared": "yes",
                "toread": "no",
                "tags": "twis"
            },
            {
                "href": "https://example.com/newer",
                "description": "Newer",
                "extended": "",
                "time": "2024-03-02T08:00:00Z",
                "shared": "yes",
                "toread": "no",
                "tags": "twis rust"
            }
        ])
    }

    async fn mount_posts(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/posts/all"))
            .and(query_param("tag", "twis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2024-03-01T10:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
        );
        assert!(parse_date("03/01/2024").is_err());
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["roundup", "generate"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.tag, "twis");
        assert!(args.from.is_none() && args.to.is_none());
        assert!(!args.mark_as_processed);
        assert!(!args.stdout);
        assert!(args.output.is_none());
    }

    #[test]
    fn generate_accepts_output_and_stdout_together() {
        let cli = Cli::try_parse_from([
            "roundup",
            "generate",
            "--tag",
            "weekly",
            "--from",
            "2024-02-20",
            "--output",
            "/tmp/report.md",
            "--stdout",
            "--mark-as-processed",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.tag, "weekly");
        assert!(args.stdout && args.mark_as_processed);
        assert_eq!(args.output, Some(PathBuf::from("/tmp/report.md")));
    }

    #[test]
    fn stdout_wins_over_output() {
        let dest =
            ReportDestination::resolve(true, Some(Path::new("/tmp/report.md")), "~/x.md").unwrap();
        assert_eq!(dest, ReportDestination::Console);
        assert_eq!(dest.to_string(), "console");
    }

    #[test]
    fn output_overrides_configured_default() {
        let dest =
            ReportDestination::resolve(false, Some(Path::new("/tmp/report.md")), "~/x.md").unwrap();
        assert_eq!(dest, ReportDestination::File(PathBuf::from("/tmp/report.md")));
        assert_eq!(dest.to_string(), "file \"/tmp/report.md\"");
    }

    #[test]
    fn default_output_expands_home() {
        let dest = ReportDestination::resolve(false, None, "~/Desktop/report.md").unwrap();
        assert_eq!(
            dest,
            ReportDestination::File(expand_home("~/Desktop/report.md").unwrap())
        );
    }

    #[test]
    fn file_destination_writes_report_verbatim() {
        let dir = std::env::temp_dir().join(format!("roundup-cli-test-{}", std::process::id()));
        let path = dir.join("nested").join("report.md");
        let dest = ReportDestination::File(path.clone());

        dest.write("* [A](a.com)\n* [B](b.com)").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "* [A](a.com)\n* [B](b.com)"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn dropped_progress_clears_the_spinner() {
        let progress = CliProgress::new();
        let bar = progress.bar.clone();
        progress.started(2);
        drop(progress);
        assert!(bar.is_finished());
    }

    #[tokio::test]
    async fn generate_writes_report_without_marking() {
        let server = MockServer::start().await;
        mount_posts(&server, two_posts()).await;
        Mock::given(method("GET"))
            .and(path("/v1/posts/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result_code": "done"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let dir = scratch_dir("no-mark");
        let report = dir.join("report.md");
        let config = config_for(&server);

        write_roundup(&client_for(&config), &config, &args_for(&report, false))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&report).unwrap(),
            "* [Newer](https://example.com/newer)\n* [Older](https://example.com/older)"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn marking_happens_only_after_the_report_is_written() {
        let server = MockServer::start().await;
        mount_posts(&server, two_posts()).await;

        let dir = scratch_dir("mark");
        let report = dir.join("report.md");
        let written = report.clone();
        Mock::given(method("GET"))
            .and(path("/v1/posts/add"))
            .and(query_param("replace", "yes"))
            .respond_with(move |_: &Request| {
                if written.exists() {
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({ "result_code": "done" }))
                } else {
                    ResponseTemplate::new(500)
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let config = config_for(&server);
        write_roundup(&client_for(&config), &config, &args_for(&report, true))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
        assert_eq!(
            paths,
            vec!["/v1/posts/all", "/v1/posts/all", "/v1/posts/add", "/v1/posts/add"]
        );
        for add in &requests[2..] {
            let tags = add
                .url
                .query_pairs()
                .find(|(k, _)| k == "tags")
                .map(|(_, v)| v.into_owned());
            assert!(tags.is_some_and(|t| t.starts_with("processed ")));
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn incomplete_bookmark_writes_nothing_and_marks_nothing() {
        let server = MockServer::start().await;
        mount_posts(
            &server,
            serde_json::json!([
                {
                    "href": "https://example.com/ok",
                    "description": "Fine",
                    "extended": "",
                    "time": "2024-03-01T08:00:00Z",
                    "tags": "twis"
                },
                {
                    "href": "https://example.com/broken",
                    "description": "No time",
                    "extended": "",
                    "tags": "twis"
                }
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v1/posts/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result_code": "done"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let dir = scratch_dir("incomplete");
        let report = dir.join("report.md");
        let config = config_for(&server);

        let err = write_roundup(&client_for(&config), &config, &args_for(&report, true))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("time"));
        assert!(!report.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
