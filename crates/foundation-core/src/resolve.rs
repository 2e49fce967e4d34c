#![forbid(unsafe_code)]

//! Merge parsed flags, prompt answers and hard defaults into the final
//! project configuration.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::args::RawArguments;
use crate::prompt::PromptAnswers;
use crate::vocab::{
    DEFAULT_DATABASE, DEFAULT_IDE, DEFAULT_INITIALIZE_GIT, DEFAULT_INSTALL_PACKAGES,
    DEFAULT_ORM, DEFAULT_PACKAGE_MANAGER, DEFAULT_PROJECT_NAME, DEFAULT_ROUTER,
    DEFAULT_RUN_MIGRATIONS, DEFAULT_STYLE, Database, Ide, Orm, PackageManager, Router, Selection,
    Style, config_key,
};

/// Fully-determined configuration that drives every scaffolding step.
///
/// `None` on an optional package means the user opted out of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub project_name: String,
    pub project_dir: PathBuf,
    pub router: Router,
    pub styles: Option<Style>,
    pub database: Option<Database>,
    pub orm: Option<Orm>,
    pub pkg_manager: PackageManager,
    pub ide: Option<Ide>,
    pub initialize_git: bool,
    pub install_packages: bool,
    pub run_migrations: bool,
    pub ci: bool,
}

impl ResolvedConfiguration {
    /// `<router>-<styles>-<database>-<orm>`, e.g. `react-router-css-none-none`.
    pub fn config_key(&self) -> String {
        config_key(self.router, self.styles, self.database, self.orm)
    }
}

/// Resolve `raw` against `answers`; flags win over answers, answers over defaults.
///
/// In `--yes`/`--ci` mode answers are ignored and every unresolved option takes
/// its default.
pub fn resolve(raw: &RawArguments, answers: &PromptAnswers) -> ResolvedConfiguration {
    let empty = PromptAnswers::default();
    let answers = if raw.non_interactive() { &empty } else { answers };

    let project_name = raw
        .project_name
        .clone()
        .or_else(|| answers.project_name.clone())
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

    let project_dir = raw
        .project_dir
        .clone()
        .unwrap_or_else(|| default_project_dir(&project_name));

    let router = raw.router.or(answers.router).unwrap_or(DEFAULT_ROUTER);

    let styles = match raw.styles {
        Selection::Chosen(style) => Some(style),
        Selection::Disabled => None,
        Selection::Unspecified => match answers.styles {
            Some(false) => Some(Style::Css),
            Some(true) | None => Some(DEFAULT_STYLE),
        },
    };

    let (database, orm) = resolve_database_orm(
        raw.database.or(answers.database),
        raw.orm.or(answers.orm),
    );

    let config = ResolvedConfiguration {
        project_name,
        project_dir,
        router,
        styles,
        database,
        orm,
        pkg_manager: raw.pkg_manager.unwrap_or(DEFAULT_PACKAGE_MANAGER),
        ide: raw.ide.or(answers.ide).resolve_or(Some(DEFAULT_IDE)),
        initialize_git: raw
            .initialize_git
            .or(answers.initialize_git)
            .unwrap_or(DEFAULT_INITIALIZE_GIT),
        install_packages: raw
            .install_packages
            .or(answers.install_packages)
            .unwrap_or(DEFAULT_INSTALL_PACKAGES),
        run_migrations: raw.run_migrations.unwrap_or(DEFAULT_RUN_MIGRATIONS),
        ci: raw.ci,
    };

    info!(
        name = %config.project_name,
        dir = %config.project_dir.display(),
        key = %config.config_key(),
        "resolved configuration"
    );
    debug!(?config, "resolved configuration detail");
    config
}

/// Apply the database/ORM coupling rules.
///
/// A disabled database forces the ORM off. A chosen ORM pulls an unresolved
/// database into existence.
fn resolve_database_orm(
    database: Selection<Database>,
    orm: Selection<Orm>,
) -> (Option<Database>, Option<Orm>) {
    let database = match database {
        Selection::Disabled => return (None, None),
        Selection::Chosen(db) => db,
        Selection::Unspecified => DEFAULT_DATABASE,
    };
    (Some(database), orm.resolve_or(Some(DEFAULT_ORM)))
}

fn default_project_dir(name: &str) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(name))
        .unwrap_or_else(|_| PathBuf::from(name))
}
