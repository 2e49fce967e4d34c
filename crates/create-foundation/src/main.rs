#![forbid(unsafe_code)]

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use console::style;
use create_foundation::Cli;
use foundation_core::args::{RawArguments, normalize_argv};
use foundation_core::config::{self, Settings};
use foundation_core::process;
use foundation_core::prompt::{self, PromptAnswers, TerminalPrompter};
use foundation_core::resolve::{ResolvedConfiguration, resolve};
use foundation_core::scaffold::{
    AbortExisting, ExistingDirDecider, PromptDecider, ScaffoldOptions, ScaffoldReport, scaffold,
};
use foundation_core::vocab::{Orm, Vocabulary};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = match Cli::try_parse_from(normalize_argv(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(cli.verbose);

    if let Err(message) = run(cli) {
        eprintln!("{} {message}", style("error:").red().bold());
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let default_filter =
        format!("warn,create_foundation={default_level},foundation_core={default_level}");

    let filter = EnvFilter::try_from_env("FOUNDATION_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let raw = RawArguments::from_flags(cli.flags).map_err(|e| e.to_string())?;
    let settings = config::load_settings_or_default(cli.config.as_deref()).map_err(|e| e.to_string())?;
    tracing::debug!(?settings, dry_run = cli.dry_run, "run");

    print_intro();

    let mut prompter = TerminalPrompter::new();
    let answers = if raw.non_interactive() {
        PromptAnswers::default()
    } else {
        prompt::prompt(&raw, &mut prompter).map_err(|e| e.to_string())?
    };
    let config = resolve(&raw, &answers);
    print_summary(&config);

    let templates = config::template_root(&settings);
    let mut abort = AbortExisting;
    let mut asker;
    let decider: &mut dyn ExistingDirDecider = if raw.non_interactive() {
        &mut abort
    } else {
        asker = PromptDecider::new(&mut prompter);
        &mut asker
    };

    let report = scaffold(
        &config,
        &templates,
        ScaffoldOptions {
            dry_run: cli.dry_run,
        },
        decider,
    )
    .map_err(|e| e.to_string())?;

    if cli.dry_run {
        print_dry_run(&config, &settings, &report);
        return Ok(());
    }
    print_scaffolded(&config, &report);

    post_scaffold(&config, &settings)?;
    print_outro(&config);
    Ok(())
}

/// Install, migrate, init git and open the editor, in that order.
///
/// Install and migration failures are fatal; git and editor failures warn.
fn post_scaffold(config: &ResolvedConfiguration, settings: &Settings) -> Result<(), String> {
    let dir = config.project_dir.as_path();

    if config.install_packages {
        with_spinner("Installing dependencies", || {
            process::install_dependencies(config.pkg_manager, dir)
        })
        .map_err(|e| e.to_string())?;
    }

    if should_run_migrations(config) {
        with_spinner("Running migrations", || {
            process::run_migrations(config.pkg_manager, dir)
        })
        .map_err(|e| e.to_string())?;
    }

    if config.initialize_git {
        let branch = settings.git_branch();
        if let Err(e) = with_spinner("Initializing git repository", || {
            process::git_init(dir, branch)
        }) {
            tracing::warn!(error = %e, "git init failed");
            print_warning(&format!("git init failed: {e}"));
        }
    }

    if let Some(ide) = config.ide {
        if config.ci {
            tracing::info!(ide = ide.as_str(), "ci mode; not opening editor");
        } else if let Err(e) = process::open_ide(settings.ide_command(ide), dir) {
            tracing::warn!(error = %e, "failed to open editor");
            print_warning(&format!("could not open {}: {e}", ide.label()));
        }
    }

    Ok(())
}

fn should_run_migrations(config: &ResolvedConfiguration) -> bool {
    config.orm == Some(Orm::Drizzle) && config.install_packages && config.run_migrations
}

fn with_spinner<T, E>(
    message: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} {message}", style("✔").green())),
        Err(_) => spinner.finish_with_message(format!("{} {message}", style("✖").red())),
    }
    result
}

fn print_intro() {
    eprintln!();
    eprintln!("{}", style(" create-foundation ").black().on_cyan().bold());
    eprintln!();
}

fn print_summary(config: &ResolvedConfiguration) {
    let opt = |v: Option<&'static str>| v.unwrap_or("none");
    eprintln!("{}", style("Configuration").bold());
    eprintln!("  name:      {}", config.project_name);
    eprintln!("  directory: {}", config.project_dir.display());
    eprintln!("  router:    {}", config.router.as_str());
    eprintln!("  styles:    {}", opt(config.styles.map(Vocabulary::as_str)));
    eprintln!("  database:  {}", opt(config.database.map(Vocabulary::as_str)));
    eprintln!("  orm:       {}", opt(config.orm.map(Vocabulary::as_str)));
    eprintln!("  ide:       {}", opt(config.ide.map(Vocabulary::as_str)));
    eprintln!();
}

fn print_scaffolded(config: &ResolvedConfiguration, report: &ScaffoldReport) {
    if let Some(backup) = &report.backup_dir {
        eprintln!("backed up existing directory to {}", backup.display());
    }
    eprintln!(
        "{} {} scaffolded ({} files)",
        style("✔").green(),
        style(&config.project_name).bold(),
        report.files.created_files + report.files.overwritten_files
    );
}

fn print_dry_run(config: &ResolvedConfiguration, settings: &Settings, report: &ScaffoldReport) {
    let dir = config.project_dir.display();
    eprintln!("dry-run: would create {dir}");
    for overlay in &report.overlays {
        eprintln!("dry-run: would apply {}", overlay.display());
    }
    for package in &report.packages {
        eprintln!("dry-run: would add package {}", package.name());
    }
    if config.install_packages {
        eprintln!("dry-run: would run {} install", config.pkg_manager.as_str());
    }
    if should_run_migrations(config) {
        eprintln!("dry-run: would run migrations");
    }
    if config.initialize_git {
        eprintln!("dry-run: would run git init (branch {})", settings.git_branch());
    }
    println!(
        "dry-run: files={} overwritten={} skipped={}",
        report.files.created_files, report.files.overwritten_files, report.files.skipped_files
    );
}

fn print_outro(config: &ResolvedConfiguration) {
    eprintln!();
    eprintln!("{}", style("Next steps").bold());
    eprintln!("  cd {}", relative_display(&config.project_dir));
    if !config.install_packages {
        eprintln!("  {} install", config.pkg_manager.as_str());
    }
    eprintln!("  {} run dev", config.pkg_manager.as_str());
    eprintln!();
}

fn print_warning(message: &str) {
    eprintln!("{} {message}", style("warning:").yellow().bold());
}

fn relative_display(dir: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| dir.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or_else(|| dir.to_path_buf())
        .display()
        .to_string()
}
