use foundation_core::args::{RawArguments, parse};
use foundation_core::prompt::PromptAnswers;
use foundation_core::resolve::{ResolvedConfiguration, resolve};
use foundation_core::vocab::{
    Database, Ide, Orm, PackageManager, Router, Selection, Style, Vocabulary,
};

fn resolve_argv(args: &[&str]) -> ResolvedConfiguration {
    let argv = std::iter::once("create-foundation").chain(args.iter().copied());
    let raw = parse(argv).unwrap();
    resolve(&raw, &PromptAnswers::default())
}

fn assert_invariants(config: &ResolvedConfiguration) {
    if config.orm.is_some() {
        assert!(config.database.is_some(), "orm without database: {config:?}");
    }
    if config.database.is_none() {
        assert!(config.orm.is_none(), "orm kept after database opt-out: {config:?}");
    }
}

fn selections<T: Vocabulary>() -> Vec<Option<T>> {
    std::iter::once(None).chain(T::ALL.iter().copied().map(Some)).collect()
}

fn flag<T: Vocabulary>(name: &str, value: Option<T>) -> String {
    format!("--{name}={}", value.map_or("none", Vocabulary::as_str))
}

#[test]
fn every_flag_combination_in_ci_mode_is_consistent() {
    for router in Router::ALL {
        for styles in selections::<Style>() {
            for database in selections::<Database>() {
                for orm in selections::<Orm>() {
                    let args = vec![
                        "my-app".to_string(),
                        "--ci".to_string(),
                        "--yes".to_string(),
                        format!("--router={}", router.as_str()),
                        flag("styles", styles),
                        flag("database", database),
                        flag("orm", orm),
                    ];
                    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
                    let argv = std::iter::once("create-foundation").chain(argv);

                    let Ok(raw) = parse(argv) else {
                        // Only contradictory database/ORM pairs may be rejected.
                        assert!(database.is_none() && orm.is_some());
                        continue;
                    };
                    let config = resolve(&raw, &PromptAnswers::default());
                    assert_invariants(&config);
                    assert_eq!(config.router, *router);
                    assert_eq!(config.styles, styles);
                }
            }
        }
    }
}

#[test]
fn unset_flags_in_ci_mode_are_consistent() {
    let cases: [&[&str]; 4] = [
        &["my-app", "--ci"],
        &["my-app", "--yes", "--database=none"],
        &["my-app", "--ci", "--database=none", "--orm=none"],
        &["my-app", "--ci", "--database=sqlite", "--orm=none"],
    ];
    for args in cases {
        assert_invariants(&resolve_argv(args));
    }
}

#[test]
fn orm_with_unresolved_database_pulls_in_sqlite() {
    let raw = RawArguments {
        ci: true,
        project_name: Some("my-app".into()),
        orm: Selection::Chosen(Orm::Drizzle),
        ..RawArguments::default()
    };
    let config = resolve(&raw, &PromptAnswers::default());
    assert_eq!(config.database, Some(Database::Sqlite));
    assert_eq!(config.orm, Some(Orm::Drizzle));
}

#[test]
fn disabled_database_with_unset_orm_disables_orm() {
    let config = resolve_argv(&["my-app", "--ci", "--database=none"]);
    assert_eq!(config.database, None);
    assert_eq!(config.orm, None);
}

#[test]
fn only_a_name_takes_every_default() {
    let config = resolve_argv(&["my-app", "--yes"]);
    assert_eq!(config.project_name, "my-app");
    assert_eq!(config.router, Router::TanstackRouter);
    assert_eq!(config.styles, Some(Style::Tailwind));
    assert_eq!(config.database, Some(Database::Sqlite));
    assert_eq!(config.orm, Some(Orm::Drizzle));
    assert_eq!(config.pkg_manager, PackageManager::Npm);
    assert_eq!(config.ide, Some(Ide::Cursor));
    assert!(config.initialize_git);
    assert!(config.install_packages);
    assert!(config.run_migrations);
    assert_eq!(config.config_key(), "tanstack-router-tailwind-sqlite-drizzle");
}

#[test]
fn flags_beat_defaults() {
    let config = resolve_argv(&[
        "my-app",
        "--ci",
        "--router=react-router",
        "--styles=none",
        "--ide=none",
        "--git=false",
        "--install=false",
        "--run_migrations=false",
    ]);
    assert_eq!(config.router, Router::ReactRouter);
    assert_eq!(config.styles, None);
    assert_eq!(config.ide, None);
    assert!(!config.initialize_git);
    assert!(!config.install_packages);
    assert!(!config.run_migrations);
    assert!(config.ci);
}

#[test]
fn answers_fill_unset_flags() {
    let raw = RawArguments {
        router: Some(Router::ReactRouter),
        ..RawArguments::default()
    };
    let answers = PromptAnswers {
        project_name: Some("from-prompt".into()),
        router: Some(Router::TanstackRouter),
        database: Selection::Disabled,
        orm: Selection::Disabled,
        styles: Some(false),
        initialize_git: Some(false),
        install_packages: Some(true),
        ide: Selection::Disabled,
    };

    let config = resolve(&raw, &answers);

    assert_eq!(config.project_name, "from-prompt");
    assert!(config.project_dir.ends_with("from-prompt"));
    assert_eq!(config.router, Router::ReactRouter);
    assert_eq!(config.styles, Some(Style::Css));
    assert_eq!(config.database, None);
    assert_eq!(config.orm, None);
    assert!(!config.initialize_git);
    assert_eq!(config.ide, None);
    assert_eq!(config.config_key(), "react-router-css-none-none");
}

#[test]
fn non_interactive_mode_ignores_answers() {
    let raw = RawArguments {
        yes: true,
        project_name: Some("my-app".into()),
        ..RawArguments::default()
    };
    let answers = PromptAnswers {
        styles: Some(false),
        database: Selection::Disabled,
        ..PromptAnswers::default()
    };

    let config = resolve(&raw, &answers);

    assert_eq!(config.styles, Some(Style::Tailwind));
    assert_eq!(config.database, Some(Database::Sqlite));
}

#[test]
fn missing_name_falls_back_to_default() {
    let config = resolve(&RawArguments::default(), &PromptAnswers::default());
    assert_eq!(config.project_name, "electron-foundation");
    assert!(config.project_dir.is_absolute());
    assert!(config.project_dir.ends_with("electron-foundation"));
}
