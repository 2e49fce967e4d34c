use foundation_core::args::{ArgsError, normalize_argv, parse};
use foundation_core::vocab::{Database, Ide, Orm, Router, Selection, Style};

fn argv(args: &[&str]) -> Vec<String> {
    std::iter::once("create-foundation")
        .chain(args.iter().copied())
        .map(String::from)
        .collect()
}

#[test]
fn positional_name_sets_name_and_absolute_dir() {
    let raw = parse(argv(&["my-app"])).unwrap();
    assert_eq!(raw.project_name.as_deref(), Some("my-app"));
    let dir = raw.project_dir.unwrap();
    assert!(dir.is_absolute());
    assert!(dir.ends_with("my-app"));
}

#[test]
fn nested_path_uses_basename_as_name() {
    let raw = parse(argv(&["apps/desktop/my-app"])).unwrap();
    assert_eq!(raw.project_name.as_deref(), Some("my-app"));
    assert!(raw.project_dir.unwrap().ends_with("apps/desktop/my-app"));
}

#[test]
fn project_name_flag_wins_over_positional() {
    let raw = parse(argv(&["ignored", "--project_name=chosen"])).unwrap();
    assert_eq!(raw.project_name.as_deref(), Some("chosen"));
}

#[test]
fn project_dir_flag_overrides_directory() {
    let raw = parse(argv(&["my-app", "--project_dir=/srv/elsewhere"])).unwrap();
    assert_eq!(raw.project_name.as_deref(), Some("my-app"));
    assert_eq!(
        raw.project_dir.unwrap(),
        std::path::PathBuf::from("/srv/elsewhere")
    );
}

#[test]
fn invalid_name_is_dropped_when_interactive() {
    let raw = parse(argv(&["Not Valid"])).unwrap();
    assert_eq!(raw.project_name, None);
}

#[test]
fn missing_name_is_fatal_in_ci_or_yes_mode() {
    assert!(matches!(
        parse(argv(&["--ci"])),
        Err(ArgsError::MissingProjectName)
    ));
    assert!(matches!(
        parse(argv(&["-y", "1-invalid"])),
        Err(ArgsError::MissingProjectName)
    ));
    assert!(parse(argv(&[])).is_ok());
}

#[test]
fn git_flag_accepts_true_and_false() {
    let raw = parse(argv(&["my-app", "--git=false"])).unwrap();
    assert_eq!(raw.initialize_git, Some(false));

    let raw = parse(argv(&["my-app", "--git=true"])).unwrap();
    assert_eq!(raw.initialize_git, Some(true));

    let raw = parse(argv(&["my-app", "--initialize_git=FALSE"])).unwrap();
    assert_eq!(raw.initialize_git, Some(false));
}

#[test]
fn bare_bool_flag_means_true_and_absent_means_unset() {
    let raw = parse(argv(&["my-app", "--install", "--run_migrations"])).unwrap();
    assert_eq!(raw.install_packages, Some(true));
    assert_eq!(raw.run_migrations, Some(true));
    assert_eq!(raw.initialize_git, None);
}

#[test]
fn bad_bool_value_is_soft_invalid() {
    let raw = parse(argv(&["my-app", "--install_packages=maybe"])).unwrap();
    assert_eq!(raw.install_packages, None);
}

#[test]
fn enum_flags_are_case_insensitive() {
    let raw = parse(argv(&["my-app", "--router=React-Router", "--styles=CSS", "--ide=VSCode"]))
        .unwrap();
    assert_eq!(raw.router, Some(Router::ReactRouter));
    assert_eq!(raw.styles, Selection::Chosen(Style::Css));
    assert_eq!(raw.ide, Selection::Chosen(Ide::Vscode));
}

#[test]
fn out_of_vocabulary_values_are_unset() {
    let raw = parse(argv(&["my-app", "--router=vue-router", "--pkg_manager=yarn"])).unwrap();
    assert_eq!(raw.router, None);
    assert_eq!(raw.pkg_manager, None);
}

#[test]
fn repeated_flag_is_unset() {
    let raw = parse(argv(&["my-app", "--styles=css", "--styles=tailwind"])).unwrap();
    assert_eq!(raw.styles, Selection::Unspecified);
}

#[test]
fn none_sentinel_disables_options() {
    let raw = parse(argv(&["my-app", "--database=none", "--orm=none", "--styles=none", "--ide=none"]))
        .unwrap();
    assert_eq!(raw.database, Selection::Disabled);
    assert_eq!(raw.orm, Selection::Disabled);
    assert_eq!(raw.styles, Selection::Disabled);
    assert_eq!(raw.ide, Selection::Disabled);
}

#[test]
fn legacy_false_sentinel_disables_options() {
    let raw = parse(argv(&["my-app", "--ide=false"])).unwrap();
    assert_eq!(raw.ide, Selection::Disabled);
}

#[test]
fn database_and_orm_together_are_accepted() {
    let raw = parse(argv(&["my-app", "--database=sqlite", "--orm=drizzle"])).unwrap();
    assert_eq!(raw.database, Selection::Chosen(Database::Sqlite));
    assert_eq!(raw.orm, Selection::Chosen(Orm::Drizzle));
}

#[test]
fn invalid_database_alone_is_unspecified() {
    let raw = parse(argv(&["my-app", "--database=postgres"])).unwrap();
    assert_eq!(raw.database, Selection::Unspecified);
    assert_eq!(raw.orm, Selection::Unspecified);
}

#[test]
fn invalid_database_with_orm_resets_both() {
    let raw = parse(argv(&["my-app", "--database=postgres", "--orm=drizzle"])).unwrap();
    assert_eq!(raw.database, Selection::Unspecified);
    assert_eq!(raw.orm, Selection::Unspecified);
}

#[test]
fn database_without_orm_is_fatal() {
    let err = parse(argv(&["my-app", "--database=sqlite"])).unwrap_err();
    assert!(matches!(err, ArgsError::DatabaseOrmMismatch { .. }));
    assert!(err.to_string().contains("database: sqlite, orm: unset"));
}

#[test]
fn orm_without_database_is_fatal() {
    let err = parse(argv(&["my-app", "--orm=drizzle"])).unwrap_err();
    assert!(matches!(err, ArgsError::DatabaseOrmMismatch { .. }));
}

#[test]
fn orm_with_disabled_database_is_fatal() {
    let err = parse(argv(&["my-app", "--database=none", "--orm=drizzle"])).unwrap_err();
    assert!(matches!(err, ArgsError::DatabaseOrmMismatch { .. }));
}

#[test]
fn yes_accepts_short_and_legacy_spellings() {
    assert!(parse(argv(&["my-app", "-y"])).unwrap().yes);
    assert!(parse(argv(&["my-app", "--yes"])).unwrap().yes);
    assert!(parse(argv(&["my-app", "--y"])).unwrap().yes);
}

#[test]
fn unknown_flag_is_a_cli_error() {
    assert!(matches!(
        parse(argv(&["my-app", "--bogus"])),
        Err(ArgsError::Cli(_))
    ));
}

#[test]
fn space_separated_bool_value_is_honored() {
    let raw = parse(argv(&["--git", "false"])).unwrap();
    assert_eq!(raw.initialize_git, Some(false));
    assert_eq!(raw.project_name, None);

    let raw = parse(argv(&["my-app", "--install", "false"])).unwrap();
    assert_eq!(raw.project_name.as_deref(), Some("my-app"));
    assert_eq!(raw.install_packages, Some(false));

    let raw = parse(argv(&["--run_migrations", "FALSE", "my-app", "--initialize_git", "True"])).unwrap();
    assert_eq!(raw.run_migrations, Some(false));
    assert_eq!(raw.initialize_git, Some(true));
    assert_eq!(raw.project_name.as_deref(), Some("my-app"));
}

#[test]
fn bare_bool_flag_still_leaves_name_positional() {
    let raw = parse(argv(&["--git", "my-app"])).unwrap();
    assert_eq!(raw.initialize_git, Some(true));
    assert_eq!(raw.project_name.as_deref(), Some("my-app"));
}

#[test]
fn argv_after_separator_is_untouched() {
    let folded = normalize_argv(argv(&["--install", "true", "--", "--git", "false"]));
    let folded: Vec<String> = folded
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        folded,
        ["create-foundation", "--install=true", "--", "--git", "false"]
    );
}
