// aicmd - your shell broke, ask why
//
// Entry point. Parses CLI args, sets up logging and config, and dispatches to
// handlers. Errors end up as a friendly message and exit status 1.

use aicmd_lib::{
    ai::{provider_from_config, Action, Advice, Assistant},
    config::{Config, Settings},
    core::{
        doctor::{self, DoctorReport},
        mailbox::{hint_line, Mailbox, MailboxPaths},
        Searcher, SystemContext,
    },
    shell::{HookInstaller, InstallReport, Shell, ShellDetector, StartupFile},
    AicmdError, Database, Result,
};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Captures failing shell commands and asks an AI model how to fix them
#[derive(Parser)]
#[command(name = "aicmd", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config.json (default: ~/.aicmd/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose an error; without text, uses the last captured failure
    Fix {
        /// Error text to diagnose
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        error: Vec<String>,
    },
    /// Suggest a command for a task
    Suggest {
        /// What you want to do
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Explain what a command does
    Explain {
        /// The command to explain
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Ask a command-line question
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Install shell hooks
    Setup {
        /// Shell to set up (bash, zsh, fish); detected from $SHELL if omitted
        #[arg(long)]
        shell: Option<String>,

        /// Set up every shell with a startup file in your home directory
        #[arg(long, conflicts_with = "shell")]
        all: bool,
    },
    /// Remove shell hooks
    Uninstall {
        /// Only this shell; all shells if omitted
        #[arg(long)]
        shell: Option<String>,
    },
    /// Show hooks, mailbox and provider status
    Status,
    /// Delete the captured error files
    Cleanup,
    /// Check that error capture works
    Doctor {
        /// Write a fake `lls` failure so `aicmd fix` has something to read
        #[arg(long)]
        simulate: bool,
    },
    /// Show past interactions
    History {
        /// How many to show
        #[arg(default_value_t = 10)]
        limit: usize,

        /// Fuzzy search instead of listing the most recent
        #[arg(short, long)]
        search: Option<String>,

        /// Delete all recorded interactions
        #[arg(long, conflicts_with = "search")]
        clear: bool,
    },
}

/// What every handler needs
struct App {
    settings: Settings,
    config: Config,
    mailbox: Mailbox,
}

impl App {
    fn installer(&self) -> HookInstaller {
        HookInstaller::new(
            self.settings.home_dir.clone(),
            self.settings.config_dir.clone(),
            self.mailbox.paths().clone(),
        )
    }

    /// Build the assistant; fails fast when no provider is configured
    async fn assistant(&self) -> Result<Assistant> {
        let provider = provider_from_config(&self.config)?;
        let context = SystemContext::detect()?;
        let assistant = Assistant::new(provider, context, self.config.clone());

        if !self.config.record_history {
            return Ok(assistant);
        }

        match Database::new(self.settings.history_db_path()).await {
            Ok(db) => Ok(assistant.with_history(Arc::new(db))),
            Err(e) => {
                warn!(error = %e, "history disabled for this run");
                Ok(assistant)
            }
        }
    }

    /// Open the history database only if it already exists
    async fn existing_history(&self) -> Result<Option<Database>> {
        let path = self.settings.history_db_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Database::new(path).await?))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        debug!(error = ?e, "command failed");
        eprintln!("✗ {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli.config.as_deref())?;
    let config = Config::load(&settings.config_path)?;
    init_logging(cli.verbose || config.verbose);
    match &config.loaded_from {
        Some(path) => info!(config_path = %path.display(), "loaded configuration"),
        None => debug!(config_path = %settings.config_path.display(), "config file not found, using defaults"),
    }

    let app = App {
        settings,
        config,
        mailbox: Mailbox::new(MailboxPaths::default()),
    };

    match cli.command {
        Commands::Fix { error } => handle_fix(&app, error).await,
        Commands::Suggest { description } => {
            let advice = app.assistant().await?.suggest(&description.join(" ")).await?;
            print_advice(Action::Suggest, &advice);
            Ok(())
        }
        Commands::Explain { command } => {
            let advice = app.assistant().await?.explain(&command.join(" ")).await?;
            print_advice(Action::Explain, &advice);
            Ok(())
        }
        Commands::Ask { question } => {
            let advice = app.assistant().await?.ask(&question.join(" ")).await?;
            print_advice(Action::Ask, &advice);
            Ok(())
        }
        Commands::Setup { shell, all } => handle_setup(&app, shell.as_deref(), all),
        Commands::Uninstall { shell } => handle_uninstall(&app, shell.as_deref()),
        Commands::Status => handle_status(&app).await,
        Commands::Cleanup => {
            app.mailbox.clear()?;
            println!("✓ Cleared captured errors in {}", app.mailbox.paths().dir().display());
            Ok(())
        }
        Commands::Doctor { simulate } => handle_doctor(&app, simulate),
        Commands::History {
            limit,
            search,
            clear,
        } => handle_history(&app, limit, search.as_deref(), clear).await,
    }
}

/// Default warn, `--verbose` debug, `RUST_LOG` wins over both
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_fix(app: &App, error: Vec<String>) -> Result<()> {
    // Before touching the mailbox, so a missing key doesn't eat the report
    let assistant = app.assistant().await?;

    let advice = if !error.is_empty() {
        assistant.fix(&error.join(" ")).await?
    } else {
        match app.mailbox.read_recent(app.config.mailbox_max_age())? {
            Some(report) => {
                println!("🔍 Last error: {}", report.error_text);
                if let Some(cmd) = &report.command {
                    println!("   Command:    {}", cmd);
                }

                // A report is diagnosed once
                if let Err(e) = app.mailbox.clear() {
                    warn!(error = %e, "could not clear mailbox");
                }

                assistant.fix_report(&report).await?
            }
            None => {
                let text = prompt_for_error()?;
                assistant.fix(&text).await?
            }
        }
    };

    print_advice(Action::Fix, &advice);
    Ok(())
}

/// Ask for error text when nothing was captured
fn prompt_for_error() -> Result<String> {
    if !std::io::stdin().is_terminal() {
        return Err(AicmdError::Generic(
            "No recent error detected. Usage: aicmd fix \"<error message>\"".to_string(),
        ));
    }

    use dialoguer::{theme::ColorfulTheme, Input};

    println!("No recent error detected.");
    let text: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Paste the error message")
        .interact_text()?;

    if text.trim().is_empty() {
        return Err(AicmdError::Generic("No error message provided".to_string()));
    }

    Ok(text)
}

fn print_advice(action: Action, advice: &Advice) {
    if !advice.explanation.is_empty() {
        println!("\n{}", advice.explanation);
    }

    if let Some(command) = &advice.command {
        let heading = match action {
            Action::Fix => "Try this",
            _ => "Command",
        };
        println!("\n💡 {}:\n   {}", heading, command.replace('\n', "\n   "));
    }

    for (label, text) in advice.sections_for(action) {
        println!("\n{}:", label);
        for line in text.lines() {
            println!("   {}", line);
        }
    }
    println!();
}

fn handle_setup(app: &App, shell: Option<&str>, all: bool) -> Result<()> {
    let installer = app.installer();

    let reports = if all {
        println!("Installing hooks for all detected shells...\n");
        installer.install_all()?
    } else {
        if shell.is_none() {
            println!("Detecting your shell...");
        }
        vec![installer.install_auto(shell)?]
    };

    for report in &reports {
        print_install_report(app, report);
    }

    println!("\nTurn on hints after failures with: aicmd_on   (or export AICMD_AUTO_SUGGEST=1)");
    Ok(())
}

fn print_install_report(app: &App, report: &InstallReport) {
    println!("✓ {}: wrote {}", report.shell, report.script_path.display());

    match &report.startup {
        StartupFile::Created => {
            println!("✓ Created {}", report.rc_path.display());
            println!("  Reload with: {}", report.shell.reload_hint(&app.settings.home_dir));
        }
        StartupFile::AlreadyConfigured => {
            println!("⚠ {} already loads aicmd, left unchanged", report.rc_path.display());
        }
        StartupFile::ManualStepRequired { line } => {
            println!("→ Add this line to {}:", report.rc_path.display());
            println!("  {}", line);
            println!("  Then reload with: {}", report.shell.reload_hint(&app.settings.home_dir));
        }
    }
}

fn handle_uninstall(app: &App, shell: Option<&str>) -> Result<()> {
    let installer = app.installer();

    let shells = match shell {
        Some(name) => vec![name.parse::<Shell>()?],
        None => Shell::ALL.to_vec(),
    };

    println!("Uninstalling aicmd hooks...\n");
    for shell in shells {
        match installer.uninstall(shell) {
            Ok(()) => println!("✓ Uninstalled {} hook", shell),
            Err(e) => eprintln!("  (skipped {}: {})", shell, e),
        }
    }

    println!("\nNote: config and history in {} were not removed.", app.settings.config_dir.display());
    Ok(())
}

async fn handle_status(app: &App) -> Result<()> {
    let installer = app.installer();

    println!("\naicmd Status");
    println!("{}", "=".repeat(60));

    println!("\nShell Hooks:");
    for shell in Shell::ALL {
        let status = if installer.is_installed(shell) {
            "✓ Installed"
        } else {
            "✗ Not installed"
        };
        println!("  {:<8} {}", format!("{}:", shell), status);
    }
    match ShellDetector::detect() {
        Ok(shell) => println!("  Current shell: {}", shell),
        Err(_) => println!("  Current shell: unknown"),
    }
    println!(
        "  Auto-suggest hints: {}",
        if app.settings.auto_suggest { "on" } else { "off" }
    );

    println!("\nLast Captured Error:");
    match app.mailbox.read_last_error()? {
        Some(report) => {
            println!("  {}", report.error_text);
            if let Some(at) = report.captured_at {
                println!("  at {}", at.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        None => println!("  No recent errors"),
    }

    println!("\nAI Provider:");
    match provider_from_config(&app.config) {
        Ok(provider) => println!("  ✓ {}", provider.name()),
        Err(AicmdError::NoProvider) => println!("  ✗ Not configured (set OPENAI_API_KEY or ANTHROPIC_API_KEY)"),
        Err(e) => println!("  ✗ {}", e),
    }

    if let Some(db) = app.existing_history().await? {
        let stats = db.history_stats().await?;
        println!("\nHistory:");
        println!(
            "  {} interactions (fix {}, suggest {}, explain {}, ask {})",
            stats.total, stats.fix, stats.suggest, stats.explain, stats.ask
        );
        db.close().await;
    }

    println!("{}", "=".repeat(60));
    Ok(())
}

fn handle_doctor(app: &App, simulate: bool) -> Result<()> {
    if simulate {
        let shell = ShellDetector::detect().unwrap_or(Shell::Bash);
        doctor::simulate_not_found(&app.mailbox, shell)?;
        println!("✓ Simulated: {}", shell.not_found_message(doctor::SIMULATED_COMMAND));
        if app.settings.auto_suggest {
            println!("{}", hint_line());
        }
        println!();
    }

    let report = doctor::diagnose(
        &app.mailbox,
        &app.installer(),
        app.config.mailbox_max_age(),
        app.settings.auto_suggest,
    )?;
    print_doctor_report(&report);

    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    println!("Error Capture Diagnostics");
    println!("{}", "=".repeat(60));

    let writable = if report.mailbox_writable { "✓ writable" } else { "✗ NOT writable" };
    println!("\nMailbox: {} ({})", report.mailbox_dir.display(), writable);

    if report.slots.is_empty() {
        println!("  No error files present");
    }
    for (slot, age) in &report.slots {
        println!("  {:<16} {}", slot.name(), format_age(*age));
    }

    println!("\nLast error:");
    match &report.last_error {
        Some(last) => {
            println!("  {}", last.error_text);
            if report.last_error_fresh {
                println!("  ✓ 'aicmd fix' will pick this up");
            } else {
                println!("  ⚠ Too old; 'aicmd fix' will ignore it");
            }
        }
        None => println!("  No recent errors"),
    }

    println!("\nHooks:");
    for (shell, installed) in &report.hooks {
        println!(
            "  {:<8} {}",
            format!("{}:", shell),
            if *installed { "✓ installed" } else { "✗ not installed" }
        );
    }
    println!(
        "\nAuto-suggest hints: {}",
        if report.auto_suggest { "on" } else { "off (enable with aicmd_on)" }
    );
    println!("{}", "=".repeat(60));
}

fn format_age(age: Option<Duration>) -> String {
    match age.map(|a| a.as_secs()) {
        None => "age unknown".to_string(),
        Some(secs) if secs < 60 => format!("{}s ago", secs),
        Some(secs) if secs < 3600 => format!("{}m ago", secs / 60),
        Some(secs) => format!("{}h ago", secs / 3600),
    }
}

async fn handle_history(app: &App, limit: usize, search: Option<&str>, clear: bool) -> Result<()> {
    let db = match app.existing_history().await? {
        Some(db) => db,
        None => {
            println!("No history yet.");
            return Ok(());
        }
    };

    if clear {
        let removed = db.clear_history().await?;
        println!("✓ Removed {} interaction(s)", removed);
        return Ok(());
    }

    let interactions = match search {
        Some(query) => Searcher::new(Arc::new(db.clone()))
            .search(query, limit)
            .await?
            .into_iter()
            .map(|r| r.interaction)
            .collect(),
        None => db.get_recent_interactions(limit as i64).await?,
    };

    if interactions.is_empty() {
        println!("No interactions found.");
        return Ok(());
    }

    println!("{}", "=".repeat(60));
    for (i, interaction) in interactions.iter().enumerate() {
        println!(
            "{:3}. [{:<7}] {}",
            i + 1,
            interaction.action,
            interaction.summary(48)
        );
        if let Some(cmd) = &interaction.suggested_command {
            println!("     → {}", cmd);
        }
    }
    println!("{}", "=".repeat(60));

    db.close().await;
    Ok(())
}
