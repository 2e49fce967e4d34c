#![forbid(unsafe_code)]

//! Project generation from a [`ResolvedConfiguration`].
//!
//! Copies `base/`, layers the selected `extras/` on top, then edits
//! `package.json`, the env files and the HTML title.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::packages::{self, Package, PackageJsonError};
use crate::prompt::{PromptError, Prompter};
use crate::resolve::ResolvedConfiguration;
use crate::vocab::{Style, Vocabulary};
use crate::{ApplyError, ApplyOptions, ApplyReport, apply_template_dir};

#[derive(Clone, Copy, Debug, Default)]
pub struct ScaffoldOptions {
    pub dry_run: bool,
}

/// What a scaffold run did (or would do, for a dry run).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub files: ApplyReport,
    /// Template directories applied after `base/`, relative to the template root.
    pub overlays: Vec<PathBuf>,
    pub packages: Vec<Package>,
    /// Where an existing project directory was moved.
    pub backup_dir: Option<PathBuf>,
    pub removed_existing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExistingDirAction {
    Backup,
    Remove,
    Abort,
}

/// Decides what happens to a non-empty project directory.
pub trait ExistingDirDecider {
    fn decide(&mut self, dir: &Path) -> ExistingDirAction;
}

/// Always aborts; used for `--ci`/`--yes` runs.
pub struct AbortExisting;

impl ExistingDirDecider for AbortExisting {
    fn decide(&mut self, _dir: &Path) -> ExistingDirAction {
        ExistingDirAction::Abort
    }
}

/// Asks through a [`Prompter`]; removal needs a second confirmation.
pub struct PromptDecider<'a> {
    prompter: &'a mut dyn Prompter,
}

impl<'a> PromptDecider<'a> {
    pub fn new(prompter: &'a mut dyn Prompter) -> Self {
        Self { prompter }
    }
}

impl ExistingDirDecider for PromptDecider<'_> {
    fn decide(&mut self, dir: &Path) -> ExistingDirAction {
        let message = format!(
            "{} already exists. How would you like to handle it?",
            dir.display()
        );
        let items = [
            "Create a backup and continue",
            "Remove the existing directory and continue",
            "Cancel project creation",
        ];
        let action = match self.prompter.select(&message, &items, 0) {
            Ok(0) => ExistingDirAction::Backup,
            Ok(1) => ExistingDirAction::Remove,
            Ok(_) => ExistingDirAction::Abort,
            Err(PromptError::Cancelled) => {
                debug!("existing directory prompt cancelled");
                ExistingDirAction::Abort
            }
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "existing directory prompt failed");
                ExistingDirAction::Abort
            }
        };
        if action != ExistingDirAction::Remove {
            return action;
        }
        match self.prompter.confirm(
            "Permanently delete this directory? This cannot be undone.",
            false,
        ) {
            Ok(true) => ExistingDirAction::Remove,
            Ok(false) | Err(PromptError::Cancelled) => ExistingDirAction::Abort,
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "remove confirmation failed");
                ExistingDirAction::Abort
            }
        }
    }
}

#[derive(Debug)]
pub enum ScaffoldError {
    DestinationExists(PathBuf),
    Io { path: PathBuf, source: io::Error },
    Apply(ApplyError),
    PackageJson(PackageJsonError),
}

impl fmt::Display for ScaffoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldError::DestinationExists(path) => write!(
                f,
                "project directory already exists and is not empty: {}",
                path.display()
            ),
            ScaffoldError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ScaffoldError::Apply(e) => write!(f, "{e}"),
            ScaffoldError::PackageJson(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ScaffoldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaffoldError::Io { source, .. } => Some(source),
            ScaffoldError::Apply(e) => Some(e),
            ScaffoldError::PackageJson(e) => Some(e),
            ScaffoldError::DestinationExists(_) => None,
        }
    }
}

impl From<ApplyError> for ScaffoldError {
    fn from(value: ApplyError) -> Self {
        ScaffoldError::Apply(value)
    }
}

impl From<PackageJsonError> for ScaffoldError {
    fn from(value: PackageJsonError) -> Self {
        ScaffoldError::PackageJson(value)
    }
}

/// Overlay directories for `config`, relative to the template root, in
/// application order.
pub fn overlay_dirs(config: &ResolvedConfiguration) -> Vec<PathBuf> {
    let extras = PathBuf::from("extras");
    let router_variant = match config.styles {
        Some(Style::Tailwind) => "with-tailwind",
        _ => "base",
    };
    let mut out = vec![extras.join(config.router.as_str()).join(router_variant)];
    if let Some(style) = config.styles {
        out.push(extras.join("styles").join(style.as_str()));
    }
    if let Some(database) = config.database {
        out.push(extras.join(database.as_str()));
    }
    if let Some(orm) = config.orm {
        out.push(extras.join(orm.as_str()));
    }
    out
}

/// Generate the project described by `config` from `templates`.
#[instrument(skip_all, fields(dir = %config.project_dir.display(), key = %config.config_key()))]
pub fn scaffold(
    config: &ResolvedConfiguration,
    templates: &Path,
    options: ScaffoldOptions,
    decider: &mut dyn ExistingDirDecider,
) -> Result<ScaffoldReport, ScaffoldError> {
    let dir = config.project_dir.as_path();
    let mut report = ScaffoldReport {
        overlays: overlay_dirs(config),
        packages: packages::selected_packages(config),
        ..ScaffoldReport::default()
    };

    if options.dry_run {
        if !is_empty_or_missing(dir)? {
            info!("dry-run: project directory exists and would need a decision");
        }
    } else {
        prepare_project_dir(dir, decider, &mut report)?;
    }

    let copy = ApplyOptions {
        dry_run: options.dry_run,
        overwrite: false,
    };
    report
        .files
        .absorb(apply_template_dir(templates.join("base"), dir, copy)?);

    let overlay = ApplyOptions {
        overwrite: true,
        ..copy
    };
    for rel in &report.overlays {
        let src = templates.join(rel);
        if !src.is_dir() {
            debug!(overlay = %rel.display(), "overlay not present in templates; skipping");
            continue;
        }
        report.files.absorb(apply_template_dir(&src, dir, overlay)?);
    }

    if options.dry_run {
        return Ok(report);
    }

    packages::update_package_json(
        &dir.join("package.json"),
        &config.project_name,
        &report.packages,
    )?;
    write_env_files(config)?;
    set_html_title(&dir.join("index.html"), &config.project_name)?;

    info!(
        created = report.files.created_files,
        overwritten = report.files.overwritten_files,
        "project scaffolded"
    );
    Ok(report)
}

fn is_empty_or_missing(dir: &Path) -> Result<bool, ScaffoldError> {
    match fs::read_dir(dir) {
        Ok(mut iter) => Ok(iter.next().is_none()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(ScaffoldError::Io {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

fn prepare_project_dir(
    dir: &Path,
    decider: &mut dyn ExistingDirDecider,
    report: &mut ScaffoldReport,
) -> Result<(), ScaffoldError> {
    if let Ok(meta) = fs::symlink_metadata(dir) {
        if !meta.is_dir() {
            return Err(ScaffoldError::Apply(ApplyError::DestDirNotDir(
                dir.to_path_buf(),
            )));
        }
    }
    if is_empty_or_missing(dir)? {
        return Ok(());
    }

    match decider.decide(dir) {
        ExistingDirAction::Abort => Err(ScaffoldError::DestinationExists(dir.to_path_buf())),
        ExistingDirAction::Backup => {
            let backup = backup_path(dir, &chrono::Local::now().format("%Y%m%d%H%M%S").to_string());
            fs::rename(dir, &backup).map_err(|e| ScaffoldError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            warn!(backup = %backup.display(), "existing directory backed up");
            report.backup_dir = Some(backup);
            Ok(())
        }
        ExistingDirAction::Remove => {
            fs::remove_dir_all(dir).map_err(|e| ScaffoldError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            warn!("existing directory removed");
            report.removed_existing = true;
            Ok(())
        }
    }
}

/// `<dir>.backup.<timestamp>` next to `dir`.
pub fn backup_path(dir: &Path, timestamp: &str) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(format!(".backup.{timestamp}"));
    PathBuf::from(name)
}

/// Contents of `.env` and `.env.example` for `config`.
pub fn env_contents(config: &ResolvedConfiguration) -> (String, String) {
    let mut vars = vec![
        ("APP_NAME", config.project_name.clone()),
        ("NODE_ENV", "development".to_string()),
    ];
    if config.database.is_some() {
        vars.push(("DB_PATH", format!("{}.db", config.project_name)));
    }

    let env: String = vars.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
    let example: String = vars.iter().map(|(k, _)| format!("{k}=\n")).collect();
    (env, example)
}

fn write_env_files(config: &ResolvedConfiguration) -> Result<(), ScaffoldError> {
    let (env, example) = env_contents(config);
    for (name, content) in [(".env", env), (".env.example", example)] {
        let path = config.project_dir.join(name);
        fs::write(&path, content).map_err(|e| ScaffoldError::Io { path, source: e })?;
    }
    Ok(())
}

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title>.*?</title>").expect("valid title regex"))
}

/// Replace the first `<title>` element of `html` with `title`.
///
/// Returns `None` when the document has no title element.
pub fn replace_title(html: &str, title: &str) -> Option<String> {
    let re = title_regex();
    if !re.is_match(html) {
        return None;
    }
    let element = format!("<title>{}</title>", escape_html(title));
    Some(re.replacen(html, 1, regex::NoExpand(&element)).into_owned())
}

fn set_html_title(path: &Path, title: &str) -> Result<(), ScaffoldError> {
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no index.html; title left unset");
            return Ok(());
        }
        Err(e) => {
            return Err(ScaffoldError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let Some(updated) = replace_title(&html, title) else {
        warn!(path = %path.display(), "index.html has no <title> element");
        return Ok(());
    };
    fs::write(path, updated).map_err(|e| ScaffoldError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
