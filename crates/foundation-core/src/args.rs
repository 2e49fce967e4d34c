#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parsing is forgiving: an out-of-vocabulary value is logged and the option
//! is treated as unset so the prompter can ask for it later. The one hard
//! rule is that a database and an ORM are either both given or both absent.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use clap::{ArgAction, Args, Parser};
use regex::Regex;
use tracing::{debug, error};

use crate::vocab::{
    Database, Ide, Orm, PackageManager, Router, Selection, Style, Vocabulary, is_opt_out,
};

/// Flags accepted by the scaffolder.
///
/// Enumerated options are collected as strings and validated in
/// [`RawArguments::from_flags`] rather than by clap, so invalid values can be
/// dropped instead of aborting.
#[derive(Args, Clone, Debug, Default)]
pub struct FlagArgs {
    /// Project name or path; the last path component becomes the name
    #[arg(value_name = "PROJECT_NAME")]
    pub name: Option<String>,

    /// Project name (takes precedence over the positional argument)
    #[arg(long = "project_name", value_name = "NAME")]
    pub project_name: Option<String>,

    /// Directory to create the project in (default: ./<project name>)
    #[arg(long = "project_dir", value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Router: tanstack-router, react-router
    #[arg(long = "router", action = ArgAction::Append)]
    pub router: Vec<String>,

    /// Styling: tailwind, css, none
    #[arg(long = "styles", action = ArgAction::Append)]
    pub styles: Vec<String>,

    /// Database: sqlite, none
    #[arg(long = "database", action = ArgAction::Append)]
    pub database: Vec<String>,

    /// ORM: drizzle, none
    #[arg(long = "orm", action = ArgAction::Append)]
    pub orm: Vec<String>,

    /// Package manager: npm
    #[arg(long = "pkg_manager", action = ArgAction::Append)]
    pub pkg_manager: Vec<String>,

    /// Editor to open the project in: cursor, vscode, none
    #[arg(long = "ide", action = ArgAction::Append)]
    pub ide: Vec<String>,

    /// Run in CI mode (no prompts, no editor launch)
    #[arg(long = "ci")]
    pub ci: bool,

    /// Skip prompts and accept defaults
    #[arg(short = 'y', long = "yes", alias = "y")]
    pub yes: bool,

    /// Initialize a git repository and stage the files (true/false)
    #[arg(
        long = "initialize_git",
        visible_alias = "git",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append
    )]
    pub initialize_git: Vec<String>,

    /// Install dependencies after scaffolding (true/false)
    #[arg(
        long = "install_packages",
        visible_alias = "install",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append
    )]
    pub install_packages: Vec<String>,

    /// Run database migrations after installing (true/false)
    #[arg(
        long = "run_migrations",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Append
    )]
    pub run_migrations: Vec<String>,
}

/// Argument bag produced by the parser; anything may still be unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawArguments {
    pub ci: bool,
    pub yes: bool,
    pub project_name: Option<String>,
    pub project_dir: Option<PathBuf>,
    pub router: Option<Router>,
    pub styles: Selection<Style>,
    pub database: Selection<Database>,
    pub orm: Selection<Orm>,
    pub pkg_manager: Option<PackageManager>,
    pub ide: Selection<Ide>,
    pub initialize_git: Option<bool>,
    pub install_packages: Option<bool>,
    pub run_migrations: Option<bool>,
}

impl RawArguments {
    /// True when prompts must be skipped.
    pub fn non_interactive(&self) -> bool {
        self.ci || self.yes
    }

    /// Validate clap-parsed flags into a [`RawArguments`].
    pub fn from_flags(flags: FlagArgs) -> Result<Self, ArgsError> {
        let name_arg = flags.project_name.or(flags.name);

        let project_dir = flags
            .project_dir
            .as_deref()
            .or(name_arg.as_deref().map(Path::new))
            .map(absolute);

        let project_name = name_arg.as_deref().and_then(project_name_from_arg);

        let router = selection_flag::<Router>(&flags.router, false).value.chosen();
        let styles = selection_flag::<Style>(&flags.styles, true).value;
        let pkg_manager = selection_flag::<PackageManager>(&flags.pkg_manager, false)
            .value
            .chosen();
        let ide = selection_flag::<Ide>(&flags.ide, true).value;

        let database = selection_flag::<Database>(&flags.database, true);
        let orm = selection_flag::<Orm>(&flags.orm, true);
        let (database, orm) = check_database_orm(database, orm)?;

        let raw = RawArguments {
            ci: flags.ci,
            yes: flags.yes,
            project_name,
            project_dir,
            router,
            styles,
            database,
            orm,
            pkg_manager,
            ide,
            initialize_git: bool_flag("initialize_git", &flags.initialize_git),
            install_packages: bool_flag("install_packages", &flags.install_packages),
            run_migrations: bool_flag("run_migrations", &flags.run_migrations),
        };

        if raw.project_name.is_none() && raw.non_interactive() {
            return Err(ArgsError::MissingProjectName);
        }

        debug!(?raw, "parsed cli args");
        Ok(raw)
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-foundation")]
struct ArgvParser {
    #[command(flatten)]
    flags: FlagArgs,
}

/// Parse a full argv (program name first) into [`RawArguments`].
pub fn parse<I, T>(argv: I) -> Result<RawArguments, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parsed = ArgvParser::try_parse_from(normalize_argv(argv)).map_err(ArgsError::Cli)?;
    RawArguments::from_flags(parsed.flags)
}

const BOOL_FLAGS: &[&str] = &[
    "--initialize_git",
    "--git",
    "--install_packages",
    "--install",
    "--run_migrations",
];

/// Fold `--git false` into `--git=false` for the boolean flags.
///
/// The boolean flags require `=` so that a bare `--git` does not swallow the
/// positional project name; a following `true`/`false` token is taken as the
/// flag's value instead. Nothing after `--` is touched.
pub fn normalize_argv<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut out: Vec<OsString> = Vec::new();
    let mut args = argv.into_iter().map(Into::into).peekable();
    let mut positional_only = false;

    while let Some(arg) = args.next() {
        if positional_only {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            positional_only = true;
            out.push(arg);
            continue;
        }

        let is_bool_flag = arg.to_str().is_some_and(|a| BOOL_FLAGS.contains(&a));
        let value = args
            .peek()
            .and_then(|next| next.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|next| next == "true" || next == "false");

        match value {
            Some(value) if is_bool_flag => {
                debug!(flag = ?arg, value = %value, "argv: folding boolean value");
                let mut folded = arg;
                folded.push("=");
                folded.push(&value);
                out.push(folded);
                args.next();
            }
            _ => out.push(arg),
        }
    }

    out
}

/// Fatal argument errors.
#[derive(Debug)]
pub enum ArgsError {
    MissingProjectName,
    DatabaseOrmMismatch { database: String, orm: String },
    Cli(clap::Error),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingProjectName => write!(f, "Project name required"),
            ArgsError::DatabaseOrmMismatch { database, orm } => write!(
                f,
                "must provide both a database and an ORM, or neither (database: {database}, orm: {orm})"
            ),
            ArgsError::Cli(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::Cli(err) => Some(err),
            _ => None,
        }
    }
}

/// Check a project name against npm package naming rules.
pub fn validate_project_name(name: &str) -> Result<(), String> {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9~-][a-z0-9._~-]*$").expect("project name regex is valid")
    });

    if name.is_empty() {
        return Err("Project name is required".to_string());
    }
    if matches!(name, "null" | "undefined" | "true" | "false") {
        return Err(format!("\"{name}\" is a reserved word"));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("\"{name}\" cannot start with a number"));
    }
    if !re.is_match(name) {
        return Err(format!(
            "\"{name}\" can only contain lowercase letters, numbers, hyphens, periods, underscores and tildes"
        ));
    }
    Ok(())
}

fn project_name_from_arg(arg: &str) -> Option<String> {
    let name = Path::new(arg).file_name()?.to_str()?;
    match validate_project_name(name) {
        Ok(()) => Some(name.to_string()),
        Err(reason) => {
            error!(name = %name, %reason, "invalid project name; treating as unset");
            None
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

struct Parsed<T> {
    value: Selection<T>,
    invalidated: bool,
}

impl<T> Parsed<T> {
    fn valid(value: Selection<T>) -> Self {
        Self {
            value,
            invalidated: false,
        }
    }

    fn invalidated() -> Self {
        Self {
            value: Selection::Unspecified,
            invalidated: true,
        }
    }
}

fn selection_flag<T: Vocabulary>(values: &[String], allow_opt_out: bool) -> Parsed<T> {
    match values {
        [] => Parsed::valid(Selection::Unspecified),
        [value] => {
            if allow_opt_out && is_opt_out(value) {
                Parsed::valid(Selection::Disabled)
            } else if let Some(v) = T::parse(value) {
                Parsed::valid(Selection::Chosen(v))
            } else {
                error!(
                    option = T::OPTION,
                    value = %value,
                    valid = %T::valid_values(),
                    "invalid value; treating as unset"
                );
                Parsed::invalidated()
            }
        }
        _ => {
            error!(
                option = T::OPTION,
                count = values.len(),
                "option can only be specified once; treating as unset"
            );
            Parsed::invalidated()
        }
    }
}

fn bool_flag(option: &'static str, values: &[String]) -> Option<bool> {
    match values {
        [] => None,
        [value] => match value.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                error!(option, value = %value, "must be true or false; treating as unset");
                None
            }
        },
        _ => {
            error!(
                option,
                count = values.len(),
                "option can only be specified once; treating as unset"
            );
            None
        }
    }
}

fn check_database_orm(
    database: Parsed<Database>,
    orm: Parsed<Orm>,
) -> Result<(Selection<Database>, Selection<Orm>), ArgsError> {
    use Selection::{Chosen, Disabled, Unspecified};

    let mismatched = matches!(
        (database.value, orm.value),
        (Chosen(_), Unspecified) | (Unspecified, Chosen(_)) | (Disabled, Chosen(_))
    );
    if !mismatched {
        return Ok((database.value, orm.value));
    }

    if database.invalidated || orm.invalidated {
        error!("database and ORM must be provided together; treating both as unset");
        return Ok((Unspecified, Unspecified));
    }

    Err(ArgsError::DatabaseOrmMismatch {
        database: describe(database.value),
        orm: describe(orm.value),
    })
}

fn describe<T: Vocabulary>(value: Selection<T>) -> String {
    match value {
        Selection::Unspecified => "unset".to_string(),
        Selection::Disabled => "none".to_string(),
        Selection::Chosen(v) => v.as_str().to_string(),
    }
}
