use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use hyperdoc::config::{
    default_config_path, find_config_file, get_config, load_config, starter_config, Config,
};
use hyperdoc::controller::{
    BrowserOpener, ClickOutcome, InteractionController, PrintOpener, TabOpener,
};
use hyperdoc::editor::{EditorState, FileStore, KeyValueStore};
use hyperdoc::enhance::{GeminiBackend, QueryEnhancer};
use hyperdoc::export::export_to_file;
use hyperdoc::models::{trim_text, Line};
use hyperdoc::print_status;
use hyperdoc::ui::{self, Spinner, BUSY_LINE_TEXT, EXPORT_BUSY_LABEL, EXPORT_IDLE_LABEL};
use hyperdoc::utils::SearchEngine;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// hyperdoc - Every line is a search
#[derive(Parser, Debug)]
#[command(name = "hyperdoc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive hyperlink document: every line you write becomes a search", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Print URLs instead of opening them in the browser
    #[arg(long, global = true)]
    no_browser: bool,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the live preview of the document
    #[command(alias = "p")]
    Show {
        /// Also print the accessible label of each line
        #[arg(long)]
        labels: bool,
    },

    /// List the document's lines
    #[command(alias = "ls")]
    Lines,

    /// Replace the whole document (reads stdin when no file is given)
    Set {
        /// Read the new content from this file
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Append a line to the document
    #[command(alias = "a")]
    Append {
        /// Line text
        text: String,
    },

    /// Replace one line
    Edit {
        /// Line index (as shown by `show`)
        index: usize,

        /// New line text
        text: String,
    },

    /// Remove one line
    #[command(alias = "rm")]
    Remove {
        /// Line index (as shown by `show`)
        index: usize,
    },

    /// Restore the default document
    Reset,

    /// Turn text into a professional search query without opening anything
    #[command(alias = "e")]
    Enhance {
        /// Text to enhance
        text: String,
    },

    /// Click a line: enhance it and open the search (and top result) tabs
    #[command(alias = "o")]
    Open {
        /// Line index (as shown by `show`)
        index: usize,
    },

    /// Export the document to a Word file
    #[command(alias = "x")]
    Export {
        /// Output directory
        #[arg(long, short)]
        dir: Option<PathBuf>,

        /// Output file name
        #[arg(long)]
        file_name: Option<String>,
    },

    /// Interactive session: type a line number to open it
    #[command(alias = "i")]
    Interactive,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Check configuration and storage
    #[command(alias = "diag")]
    Doctor,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a starter configuration file
    Init {
        /// Where to write it (default: user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

/// A command typed in an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Open(usize),
    Append(String),
    Preview,
    Labels,
    Export,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_session_command(input: &str) -> SessionCommand {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix('+') {
        return SessionCommand::Append(rest.strip_prefix(' ').unwrap_or(rest).to_string());
    }
    match trimmed {
        "" => SessionCommand::Empty,
        "q" | "quit" | "exit" => SessionCommand::Quit,
        "p" | "preview" | "show" => SessionCommand::Preview,
        "l" | "labels" => SessionCommand::Labels,
        "x" | "export" => SessionCommand::Export,
        "h" | "?" | "help" => SessionCommand::Help,
        other => match other.parse::<usize>() {
            Ok(index) => SessionCommand::Open(index),
            Err(_) => SessionCommand::Unknown(other.to_string()),
        },
    }
}

/// Print all available environment variables
fn print_env_vars() {
    println!("hyperdoc - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  GEMINI_API_KEY              API key for the Gemini completion service");
    println!("  API_KEY                     Fallback when GEMINI_API_KEY is not set");
    println!();
    println!("Configuration Overrides:");
    println!("  HYPERDOC_ENHANCEMENT__MODEL      Completion model (default: gemini-2.5-flash)");
    println!("  HYPERDOC_ENHANCEMENT__ENDPOINT   Completion API base URL");
    println!("  HYPERDOC_SEARCH__BASE_URL        Search endpoint (default: https://www.google.com/search)");
    println!("  HYPERDOC_STORAGE__PATH           Document store file");
    println!("  HYPERDOC_EXPORT__OUTPUT_DIR      Export directory (default: .)");
    println!("  HYPERDOC_EXPORT__FILE_NAME       Export file name (default: interactive-document.docx)");
    println!("  HYPERDOC_LOGGING__LEVEL          Default log level (default: warn)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    std::process::exit(0);
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.logging.level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("hyperdoc={}", level)),
    );

    let json = match cli.log_format {
        Some(format) => format == LogFormat::Json,
        None => config.logging.format.as_deref() == Some("json"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
    }

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => get_config()?,
    };

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let engine = SearchEngine::new(&config.search.base_url);
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::new(config.storage.resolved_path()));
    let mut editor = EditorState::load(store.clone(), &config.storage.key);

    match cli.command.unwrap_or(Commands::Show { labels: false }) {
        Commands::Show { labels } => {
            ui::print_preview(&editor.lines(), Default::default());
            if labels {
                ui::print_labels(&editor.lines(), Default::default());
            }
        }

        Commands::Lines => {
            output_lines(&editor.lines(), cli.output);
        }

        Commands::Set { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            editor.set_text(text);
            if !cli.quiet {
                eprintln!("Document updated ({} lines)", editor.lines().len());
            }
        }

        Commands::Append { text } => {
            editor.append_line(&text);
            if !cli.quiet {
                ui::print_preview(&editor.lines(), Default::default());
            }
        }

        Commands::Edit { index, text } => {
            editor.replace_line(index, &text)?;
            if !cli.quiet {
                ui::print_preview(&editor.lines(), Default::default());
            }
        }

        Commands::Remove { index } => {
            editor.remove_line(index)?;
            if !cli.quiet {
                ui::print_preview(&editor.lines(), Default::default());
            }
        }

        Commands::Reset => {
            editor.reset();
            if !cli.quiet {
                ui::print_preview(&editor.lines(), Default::default());
            }
        }

        Commands::Enhance { text } => {
            let text = enhance_input(&text)?;
            let enhancer = build_enhancer(&config)?;
            let spinner = make_spinner(cli.quiet, BUSY_LINE_TEXT);
            let result = enhancer.enhance(text).await;
            spinner.clear();

            match resolve_format(cli.output) {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                _ => {
                    println!("Query: {}", result.professional_query);
                    println!("Search: {}", engine.search_url(&result.professional_query));
                    if let Some(url) = &result.top_result_url {
                        println!("Top result: {}", url);
                    }
                }
            }
        }

        Commands::Open { index } => {
            let line = line_at(&editor, index)?;
            let controller = build_controller(&config, &engine, cli.no_browser)?;
            let spinner = make_spinner(cli.quiet, BUSY_LINE_TEXT);
            let outcome = controller.click(&line).await;
            spinner.clear();
            report_outcome(&line, &outcome, cli.quiet);
            if outcome == ClickOutcome::IgnoredInert {
                anyhow::bail!("Line {} is blank", index);
            }
        }

        Commands::Export { dir, file_name } => {
            let dir = dir.unwrap_or_else(|| config.export.output_dir.clone());
            let file_name = file_name.unwrap_or_else(|| config.export.file_name.clone());
            if run_export(&editor.lines(), &engine, &dir, &file_name, cli.quiet).is_none() {
                anyhow::bail!("Export failed");
            }
        }

        Commands::Interactive => {
            let controller = build_controller(&config, &engine, cli.no_browser)?;
            run_interactive(&mut editor, controller, &engine, &config).await?;
        }

        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => {
                let path = match path.or_else(default_config_path) {
                    Some(path) => path,
                    None => anyhow::bail!("No config directory available; pass --path"),
                };
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, starter_config()?)?;
                print_status!(ui::Status::Success, format!("Wrote {}", path.display()));
            }
            ConfigCommands::Show => {
                let mut shown = config.clone();
                if shown.enhancement.api_key.is_some() {
                    shown.enhancement.api_key = Some("********".to_string());
                }
                print!("{}", toml::to_string_pretty(&shown)?);
            }
        },

        Commands::Doctor => {
            run_doctor(&config, config_path.as_deref(), store.as_ref(), &engine);
        }
    }

    Ok(())
}

fn build_enhancer(config: &Config) -> Result<QueryEnhancer> {
    let backend = GeminiBackend::with_base_url(
        config.enhancement.api_key.clone(),
        &config.enhancement.endpoint,
    )?;
    Ok(QueryEnhancer::with_model(
        Arc::new(backend),
        &config.enhancement.model,
    ))
}

fn build_controller(
    config: &Config,
    engine: &SearchEngine,
    no_browser: bool,
) -> Result<InteractionController> {
    let opener: Arc<dyn TabOpener> = if no_browser {
        Arc::new(PrintOpener)
    } else {
        Arc::new(BrowserOpener)
    };
    Ok(InteractionController::new(
        build_enhancer(config)?,
        opener,
        engine.clone(),
    ))
}

fn make_spinner(quiet: bool, msg: &str) -> Spinner {
    if quiet || !std::io::stderr().is_terminal() {
        Spinner::hidden()
    } else {
        Spinner::new(msg)
    }
}

fn enhance_input(text: &str) -> Result<&str> {
    let trimmed = trim_text(text);
    if trimmed.is_empty() {
        anyhow::bail!("Nothing to enhance: the text is blank");
    }
    Ok(trimmed)
}

fn line_at(editor: &EditorState, index: usize) -> Result<Line> {
    match editor.line(index) {
        Some(line) => Ok(line),
        None => anyhow::bail!(
            "Line {} does not exist (document has {} lines)",
            index,
            editor.lines().len()
        ),
    }
}

fn report_outcome(line: &Line, outcome: &ClickOutcome, quiet: bool) {
    match outcome {
        ClickOutcome::Opened {
            search_url,
            top_result_url,
        } => {
            if quiet {
                return;
            }
            print_status!(ui::Status::Search, format!("[{}] {}", line.index, search_url));
            if let Some(url) = top_result_url {
                print_status!(ui::Status::Success, format!("[{}] {}", line.index, url));
            }
        }
        ClickOutcome::IgnoredBusy(busy) => {
            print_status!(
                ui::Status::Warning,
                format!("Line {} is still being processed; click ignored", busy)
            );
        }
        ClickOutcome::IgnoredInert => {
            print_status!(ui::Status::Info, format!("Line {} is blank", line.index));
        }
    }
}

/// Build and write the Word file. Failures are logged and reported; the
/// indicator is always reset and no file is left behind.
fn run_export(
    lines: &[Line],
    engine: &SearchEngine,
    dir: &std::path::Path,
    file_name: &str,
    quiet: bool,
) -> Option<PathBuf> {
    let spinner = make_spinner(quiet, EXPORT_BUSY_LABEL);
    match export_to_file(lines, engine, dir, file_name) {
        Ok(path) => {
            spinner.finish_with_success(&format!("{}: {}", EXPORT_IDLE_LABEL, path.display()));
            Some(path)
        }
        Err(e) => {
            tracing::error!("Error generating DOCX file: {}", e);
            spinner.finish_with_error(EXPORT_IDLE_LABEL);
            None
        }
    }
}

async fn run_interactive(
    editor: &mut EditorState,
    controller: InteractionController,
    engine: &SearchEngine,
    config: &Config,
) -> Result<()> {
    ui::print_banner();
    ui::print_preview(&editor.lines(), controller.state());

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(raw) = input.next_line().await? {
        match parse_session_command(&raw) {
            SessionCommand::Quit => break,
            SessionCommand::Empty => {}
            SessionCommand::Help => ui::print_banner(),
            SessionCommand::Preview => ui::print_preview(&editor.lines(), controller.state()),
            SessionCommand::Labels => ui::print_labels(&editor.lines(), controller.state()),
            SessionCommand::Append(text) => {
                editor.append_line(&text);
                ui::print_preview(&editor.lines(), controller.state());
            }
            SessionCommand::Export => {
                run_export(
                    &editor.lines(),
                    engine,
                    &config.export.output_dir,
                    &config.export.file_name,
                    false,
                );
            }
            SessionCommand::Open(index) => {
                let Some(line) = editor.line(index) else {
                    print_status!(ui::Status::Warning, format!("No line {}", index));
                    continue;
                };
                match controller.try_begin(&line) {
                    Ok(guard) => {
                        print_status!(
                            ui::Status::Loading,
                            format!("[{}] {}", index, BUSY_LINE_TEXT)
                        );
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            let outcome = controller.settle(guard, &line).await;
                            report_outcome(&line, &outcome, false);
                        });
                    }
                    Err(rejected) => {
                        report_outcome(&line, &ClickOutcome::from(rejected), false);
                    }
                }
            }
            SessionCommand::Unknown(other) => {
                print_status!(ui::Status::Warning, format!("Unknown command: {}", other));
            }
        }
    }

    Ok(())
}

fn run_doctor(
    config: &Config,
    config_path: Option<&std::path::Path>,
    store: &dyn KeyValueStore,
    engine: &SearchEngine,
) {
    println!("hyperdoc - Doctor");
    println!("================================");

    println!("\n[Configuration]");
    match config_path {
        Some(path) => println!("  Config file: {}", path.display()),
        None => println!("  Config file: none (defaults + environment)"),
    }

    println!("\n[Enhancement]");
    if config.enhancement.api_key.is_some() {
        println!("  - API key: Configured");
    } else {
        println!("  - API key: Not configured (lines open plain searches)");
    }
    println!("  - Model: {}", config.enhancement.model);
    println!("  - Endpoint: {}", config.enhancement.endpoint);

    println!("\n[Search]");
    match engine.validate() {
        Ok(()) => println!("  - Endpoint: {} (OK)", engine.base_url()),
        Err(e) => println!("  - Endpoint: {}", e),
    }

    println!("\n[Storage]");
    println!("  - Path: {}", config.storage.resolved_path().display());
    println!("  - Key: {}", config.storage.key);
    match store.get(&config.storage.key) {
        Ok(Some(text)) => println!("  - Saved document: {} lines", text.split('\n').count()),
        Ok(None) => println!("  - Saved document: none (default content in use)"),
        Err(e) => println!("  - Saved document: unreadable ({}), editing stays in memory", e),
    }

    println!("\n[Export]");
    println!(
        "  - Target: {}",
        config.export.output_dir.join(&config.export.file_name).display()
    );
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn output_lines(lines: &[Line], format: OutputFormat) {
    match resolve_format(format) {
        OutputFormat::Json => match serde_json::to_string_pretty(lines) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to serialize lines: {}", e),
        },
        OutputFormat::Plain => {
            for line in lines {
                let kind = if line.actionable { "link" } else { "text" };
                println!("{}\t{}\t{}", line.index, kind, line.raw);
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "Line", "Clickable"]);

            for line in lines {
                let text = ui::truncate_with_ellipsis(&line.raw, 60);
                let text_cell = if line.actionable {
                    Cell::new(text).add_attribute(Attribute::Bold)
                } else {
                    Cell::new(text)
                };
                table.add_row(vec![
                    Cell::new(line.index),
                    text_cell,
                    Cell::new(if line.actionable { "yes" } else { "no" }),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }
}
