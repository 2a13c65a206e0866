use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use diagdrop::account;
use diagdrop::archive::{ScratchGuard, ScratchSpace};
use diagdrop::config::Config;
use diagdrop::gate::{Gatekeeper, KeyringSession, TcpReachability};
use diagdrop::keyring;
use diagdrop::lock::CycleLock;
use diagdrop::logging;
use diagdrop::pipeline::{system_catalog, Pipeline, PipelineSettings, ReportRequest, Screenshot};
use diagdrop::probe::{FileLogStore, LogStore};
use diagdrop::prompt::{AutoPrompter, Prompter, TerminalPrompter, UserChoice};
use diagdrop::stats::LocalPostSubmit;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(
    name = "diagdrop",
    about = "Collect machine diagnostics and send feedback reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write JSON logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Non-interactive: never offer a retry, print notices
    #[arg(short = 'y', long, global = true)]
    yes: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a report to the intake API (with diagnostics by default)
    Report(ReportArgs),
    /// Send feedback through the hosted form
    Form(FormArgs),
    /// Build the diagnostic bundle without sending it
    Collect(CollectArgs),
    /// Store an account token and profile
    Login,
    /// Forget the stored account token
    Logout,
    /// Show config location and effective values
    Config,
}

#[derive(Args, Debug)]
struct ReportArgs {
    text: String,
    #[arg(long, default_value = "")]
    subject: String,
    /// Send the text only, without the diagnostic bundle
    #[arg(long)]
    no_diagnostics: bool,
    /// Attach an existing image as the screenshot
    #[arg(long, conflicts_with_all = ["capture_screenshot", "no_diagnostics"])]
    screenshot: Option<PathBuf>,
    /// Run the configured screenshot tool before collecting
    #[arg(long, conflicts_with = "no_diagnostics")]
    capture_screenshot: bool,
}

#[derive(Args, Debug)]
struct FormArgs {
    title: String,
    body: String,
    /// Give up after the first failed attempt
    #[arg(long)]
    no_retry: bool,
}

#[derive(Args, Debug)]
struct CollectArgs {
    /// Leave the scratch directory (and bundle) in place
    #[arg(long)]
    keep: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = Config::load();
    match cli.command {
        Commands::Login => {
            account::interactive_login(&mut config)?;
            eprintln!("  {} Logged in", style("✓").green());
            Ok(())
        }
        Commands::Logout => {
            account::logout()?;
            eprintln!("  {} Logged out", style("✓").green());
            Ok(())
        }
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
        Commands::Report(args) => run_report(&config, args, cli.yes).await,
        Commands::Form(args) => run_form(&config, args, cli.yes).await,
        Commands::Collect(args) => run_collect(&config, args).await,
    }
}

fn cycle_lock() -> Result<CycleLock> {
    let dir = Config::data_dir().context("Could not determine data directory")?;
    CycleLock::acquire(&dir)
}

fn log_store(config: &Config) -> Result<Arc<dyn LogStore>> {
    let dir = config.log_dir().context("Could not determine log directory")?;
    Ok(Arc::new(FileLogStore::new(dir)))
}

fn prompter(non_interactive: bool) -> Box<dyn Prompter> {
    if non_interactive {
        Box::new(AutoPrompter {
            answer: UserChoice::Decline,
        })
    } else {
        Box::new(TerminalPrompter)
    }
}

fn gatekeeper(config: &Config, non_interactive: bool) -> Gatekeeper {
    Gatekeeper::new(
        Box::new(TcpReachability::from_config(config)),
        Box::new(KeyringSession::new(config.clone(), !non_interactive)),
    )
}

fn scratch(config: &Config) -> Result<ScratchSpace> {
    let dir = config
        .scratch_dir()
        .context("Could not determine scratch directory")?;
    Ok(ScratchSpace::new(dir))
}

async fn run_report(config: &Config, args: ReportArgs, non_interactive: bool) -> Result<()> {
    let _lock = cycle_lock()?;
    let scratch = scratch(config)?;
    let store = log_store(config)?;

    let screenshot = if let Some(path) = args.screenshot {
        Screenshot::CopyFrom(path)
    } else if args.capture_screenshot {
        let argv = config
            .screenshot_command
            .clone()
            .context("--capture-screenshot needs `screenshot_command` in the config")?;
        Screenshot::Capture(argv)
    } else {
        Screenshot::None
    };

    let request = ReportRequest {
        text: args.text,
        subject: args.subject,
        full_report: !args.no_diagnostics,
        screenshot,
    };

    let mut prompter = prompter(non_interactive);
    let post_submit = Arc::new(Mutex::new(LocalPostSubmit::new(
        LocalPostSubmit::default_stats_path(),
        Arc::clone(&store),
    )));
    let catalog = system_catalog(config, scratch.root().to_path_buf(), store);
    let mut pipeline = Pipeline::new(
        PipelineSettings::from_config(config),
        scratch,
        gatekeeper(config, non_interactive),
        prompter.as_mut(),
        post_submit,
        catalog,
    );

    let outcome = pipeline.send_report(&request).await;
    if outcome.success {
        return Ok(());
    }
    anyhow::bail!(
        "Report not sent: {}",
        outcome.error_message.unwrap_or_else(|| "unknown error".to_string())
    )
}

async fn run_form(config: &Config, args: FormArgs, non_interactive: bool) -> Result<()> {
    let _lock = cycle_lock()?;
    let store = log_store(config)?;
    let scratch = scratch(config)?;

    let mut settings = PipelineSettings::from_config(config);
    settings.retry = !args.no_retry && !non_interactive;

    let mut prompter = prompter(non_interactive);
    let post_submit = Arc::new(Mutex::new(LocalPostSubmit::new(
        LocalPostSubmit::default_stats_path(),
        Arc::clone(&store),
    )));
    let catalog = system_catalog(config, scratch.root().to_path_buf(), store);
    let mut pipeline = Pipeline::new(
        settings,
        scratch,
        gatekeeper(config, non_interactive),
        prompter.as_mut(),
        post_submit,
        catalog,
    );

    let outcome = pipeline.send_form(&args.title, &args.body).await;
    if outcome.success {
        return Ok(());
    }
    anyhow::bail!(
        "Feedback not sent after {} attempt(s): {}",
        outcome.attempts,
        outcome.last_error.unwrap_or_else(|| "unknown error".to_string())
    )
}

async fn run_collect(config: &Config, args: CollectArgs) -> Result<()> {
    let _lock = cycle_lock()?;
    let scratch = scratch(config)?;
    let store = log_store(config)?;

    let mut prompter = AutoPrompter {
        answer: UserChoice::Decline,
    };
    let post_submit = Arc::new(Mutex::new(LocalPostSubmit::new(None, Arc::clone(&store))));
    let catalog = system_catalog(config, scratch.root().to_path_buf(), store);
    let pipeline = Pipeline::new(
        PipelineSettings::from_config(config),
        scratch.clone(),
        gatekeeper(config, true),
        &mut prompter,
        post_submit,
        catalog,
    );

    let guard = (!args.keep).then(|| ScratchGuard::new(scratch));
    let archive = pipeline
        .collect_bundle(&account::username(config), &Screenshot::None)
        .await?;

    println!();
    println!("  {}", style("Diagnostic bundle").cyan().bold());
    if archive.members.is_empty() {
        println!("  (no diagnostics could be collected)");
    }
    for member in &archive.members {
        println!("  - {}", member);
    }
    println!();
    if guard.is_some() {
        println!("  Bundle discarded (use --keep to inspect it)");
    } else {
        println!("  Bundle kept at {}", archive.path.display());
    }
    Ok(())
}

fn print_config(config: &Config) {
    let login = if account::is_logged_in() {
        style("logged in").green().to_string()
    } else {
        style("not logged in").yellow().to_string()
    };
    let show = |value: Option<String>| value.unwrap_or_else(|| "(not set)".to_string());

    println!();
    println!("  {}", style("diagdrop configuration").cyan().bold());
    println!("  Config file:   {}", Config::config_location());
    println!("  API URL:       {}", show(config.api_url()));
    println!("  Form URL:      {}", config.form_url);
    println!(
        "  Scratch dir:   {}",
        show(config.scratch_dir().map(|p| p.display().to_string()))
    );
    println!(
        "  Log dir:       {}",
        show(config.log_dir().map(|p| p.display().to_string()))
    );
    println!("  Account:       {} ({})", login, keyring::credentials_store_label());
    println!("  Username:      {}", account::username(config));
    println!("  Email:         {}", account::email(config));
    println!();
}
