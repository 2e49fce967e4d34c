#![forbid(unsafe_code)]

//! Interactive collection of options left unset by the parser.
//!
//! Steps are planned from the [`RawArguments`] (only unset fields are asked
//! about), run in order through a [`Prompter`], and decoded into a typed
//! [`PromptAnswers`] as soon as the last step completes.

use std::fmt;
use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use tracing::debug;

use crate::args::{RawArguments, validate_project_name};
use crate::vocab::{
    DEFAULT_IDE, DEFAULT_PROJECT_NAME, DEFAULT_ROUTER, Database, Ide, Orm, Router, Selection,
    Vocabulary,
};

/// Source of interactive answers.
///
/// Every method returns [`PromptError::Cancelled`] when the user backs out.
pub trait Prompter {
    fn input(
        &mut self,
        message: &str,
        default: &str,
        validate: fn(&str) -> Result<(), String>,
    ) -> Result<String, PromptError>;

    /// Returns the index of the selected item.
    fn select(&mut self, message: &str, items: &[&str], default: usize)
    -> Result<usize, PromptError>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;
}

/// Prompter backed by dialoguer widgets on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn input(
        &mut self,
        message: &str,
        default: &str,
        validate: fn(&str) -> Result<(), String>,
    ) -> Result<String, PromptError> {
        let value: String = Input::with_theme(&self.theme)
            .with_prompt(message)
            .default(default.to_string())
            .validate_with(move |s: &String| validate(s))
            .interact_text()?;
        Ok(value)
    }

    fn select(
        &mut self,
        message: &str,
        items: &[&str],
        default: usize,
    ) -> Result<usize, PromptError> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)
    }
}

/// Errors from the prompt stage.
#[derive(Debug)]
pub enum PromptError {
    Cancelled,
    Io(io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Cancelled => write!(f, "scaffolding cancelled"),
            PromptError::Io(err) => write!(f, "prompt failed: {err}"),
        }
    }
}

impl std::error::Error for PromptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PromptError::Io(err) => Some(err),
            PromptError::Cancelled => None,
        }
    }
}

impl From<dialoguer::Error> for PromptError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
                PromptError::Cancelled
            }
            dialoguer::Error::IO(e) => PromptError::Io(e),
        }
    }
}

/// One question in the interactive flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptStep {
    ProjectName,
    Router,
    InitializeDatabase,
    Database,
    InitializeOrm,
    Orm,
    Styles,
    InitializeGit,
    InstallPackages,
    Ide,
}

/// A single collected answer, tagged by the step that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    ProjectName(String),
    Router(Router),
    InitializeDatabase(bool),
    Database(Selection<Database>),
    InitializeOrm(bool),
    Orm(Selection<Orm>),
    Styles(bool),
    InitializeGit(bool),
    InstallPackages(bool),
    Ide(Selection<Ide>),
}

/// Decoded answers; fields stay unset for steps that were not planned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptAnswers {
    pub project_name: Option<String>,
    pub router: Option<Router>,
    pub database: Selection<Database>,
    pub orm: Selection<Orm>,
    /// Whether Tailwind was accepted.
    pub styles: Option<bool>,
    pub initialize_git: Option<bool>,
    pub install_packages: Option<bool>,
    pub ide: Selection<Ide>,
}

impl PromptAnswers {
    pub fn decode(answers: impl IntoIterator<Item = Answer>) -> Self {
        let mut out = PromptAnswers::default();
        for answer in answers {
            match answer {
                Answer::ProjectName(name) => out.project_name = Some(name),
                Answer::Router(router) => out.router = Some(router),
                Answer::InitializeDatabase(false) => out.database = Selection::Disabled,
                Answer::InitializeDatabase(true) => {}
                Answer::Database(database) => out.database = database.or(out.database),
                Answer::InitializeOrm(false) => out.orm = Selection::Disabled,
                Answer::InitializeOrm(true) => {}
                Answer::Orm(orm) => out.orm = orm.or(out.orm),
                Answer::Styles(tailwind) => out.styles = Some(tailwind),
                Answer::InitializeGit(git) => out.initialize_git = Some(git),
                Answer::InstallPackages(install) => out.install_packages = Some(install),
                Answer::Ide(ide) => out.ide = ide,
            }
        }
        out
    }
}

/// Steps needed to fill every unset field of `raw`, in prompt order.
pub fn plan(raw: &RawArguments) -> Vec<PromptStep> {
    let mut steps = Vec::new();
    if raw.project_name.is_none() {
        steps.push(PromptStep::ProjectName);
    }
    if raw.router.is_none() {
        steps.push(PromptStep::Router);
    }
    if raw.database.is_unspecified() {
        steps.push(PromptStep::InitializeDatabase);
        steps.push(PromptStep::Database);
    }
    if raw.orm.is_unspecified() && !raw.database.is_disabled() {
        steps.push(PromptStep::InitializeOrm);
        steps.push(PromptStep::Orm);
    }
    if raw.styles.is_unspecified() {
        steps.push(PromptStep::Styles);
    }
    if raw.initialize_git.is_none() {
        steps.push(PromptStep::InitializeGit);
    }
    if raw.install_packages.is_none() {
        steps.push(PromptStep::InstallPackages);
    }
    if raw.ide.is_unspecified() {
        steps.push(PromptStep::Ide);
    }
    steps
}

/// Ask for every unset option in `raw`.
pub fn prompt(raw: &RawArguments, prompter: &mut dyn Prompter) -> Result<PromptAnswers, PromptError> {
    let steps = plan(raw);
    debug!(steps = steps.len(), "prompt plan");

    let mut database_initialized = raw.database.is_chosen();
    let mut orm_initialized = raw.orm.is_chosen();
    let mut answers = Vec::with_capacity(steps.len());

    for step in steps {
        let answer = match step {
            PromptStep::ProjectName => Answer::ProjectName(prompter.input(
                "What is the name of your project?",
                DEFAULT_PROJECT_NAME,
                validate_project_name,
            )?),
            PromptStep::Router => Answer::Router(select_from(
                prompter,
                "Which router would you like to use?",
                DEFAULT_ROUTER,
            )?),
            PromptStep::InitializeDatabase => {
                database_initialized =
                    prompter.confirm("Should we initialize an SQLite database?", true)?;
                Answer::InitializeDatabase(database_initialized)
            }
            PromptStep::Database => {
                if database_initialized {
                    Answer::Database(Selection::Chosen(select_from(
                        prompter,
                        "Which database would you like to use?",
                        Database::Sqlite,
                    )?))
                } else {
                    Answer::Database(Selection::Disabled)
                }
            }
            PromptStep::InitializeOrm => {
                orm_initialized = database_initialized
                    && prompter.confirm("Should we set up an ORM for the database?", true)?;
                Answer::InitializeOrm(orm_initialized)
            }
            PromptStep::Orm => {
                if database_initialized && orm_initialized {
                    Answer::Orm(Selection::Chosen(select_from(
                        prompter,
                        "Which ORM would you like to use?",
                        Orm::Drizzle,
                    )?))
                } else {
                    Answer::Orm(Selection::Disabled)
                }
            }
            PromptStep::Styles => Answer::Styles(
                prompter.confirm("Will you be using Tailwind CSS for styling?", true)?,
            ),
            PromptStep::InitializeGit => Answer::InitializeGit(prompter.confirm(
                "Should we initialize a Git repository and stage the changes?",
                true,
            )?),
            PromptStep::InstallPackages => Answer::InstallPackages(
                prompter.confirm("Should we install packages after scaffolding?", true)?,
            ),
            PromptStep::Ide => Answer::Ide(select_ide(prompter)?),
        };
        debug!(?step, ?answer, "prompt answer");
        answers.push(answer);
    }

    Ok(PromptAnswers::decode(answers))
}

fn select_from<T: Vocabulary + PartialEq>(
    prompter: &mut dyn Prompter,
    message: &str,
    default: T,
) -> Result<T, PromptError> {
    if let [only] = T::ALL {
        return Ok(*only);
    }
    let labels: Vec<&str> = T::ALL.iter().map(|v| v.label()).collect();
    let default_index = T::ALL.iter().position(|v| *v == default).unwrap_or(0);
    let index = prompter.select(message, &labels, default_index)?;
    Ok(T::ALL.get(index).copied().unwrap_or(default))
}

fn select_ide(prompter: &mut dyn Prompter) -> Result<Selection<Ide>, PromptError> {
    let mut labels: Vec<&str> = Ide::ALL.iter().map(|v| v.label()).collect();
    labels.push("Neither");
    let default_index = Ide::ALL.iter().position(|v| *v == DEFAULT_IDE).unwrap_or(0);
    let index = prompter.select("Which IDE would you like to use?", &labels, default_index)?;
    Ok(match Ide::ALL.get(index) {
        Some(ide) => Selection::Chosen(*ide),
        None => Selection::Disabled,
    })
}
