use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use foundation_core::config::{self, Settings, SettingsError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn with_env<T>(key: &str, value: Option<&std::ffi::OsStr>, f: impl FnOnce() -> T) -> T {
    let prev = std::env::var_os(key);
    match value {
        Some(v) => unsafe { std::env::set_var(key, v) },
        None => unsafe { std::env::remove_var(key) },
    }
    let out = f();
    match prev {
        Some(v) => unsafe { std::env::set_var(key, v) },
        None => unsafe { std::env::remove_var(key) },
    }
    out
}

fn temp_dir(label: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "foundation-config-env-{label}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&root).unwrap();
    root
}

#[test]
fn load_settings_not_found_when_xdg_empty() {
    let _guard = ENV_LOCK.lock().unwrap();
    let root = temp_dir("empty");

    let res = with_env("XDG_CONFIG_HOME", Some(root.as_os_str()), || {
        config::load_settings(None)
    });
    let _ = fs::remove_dir_all(&root);

    match res {
        Err(SettingsError::NotFound) => {}
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn load_settings_finds_file_in_xdg_config_home() {
    let _guard = ENV_LOCK.lock().unwrap();
    let root = temp_dir("found");
    let cfg_dir = root.join("create-foundation");
    fs::create_dir_all(&cfg_dir).unwrap();
    let cfg_path = cfg_dir.join("config.toml");
    fs::write(&cfg_path, "git_branch = \"develop\"\n").unwrap();

    let res = with_env("XDG_CONFIG_HOME", Some(root.as_os_str()), || {
        config::load_settings(None)
    });
    let _ = fs::remove_dir_all(&root);

    let (found_path, settings) = res.unwrap();
    assert_eq!(found_path, cfg_path);
    assert_eq!(settings.git_branch(), "develop");
}

#[test]
fn unknown_keys_are_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    let root = temp_dir("unknown");
    let cfg_path = root.join("config.toml");
    fs::write(&cfg_path, "templates = \"/tmp\"\n").unwrap();

    let res = config::load_settings(Some(&cfg_path));
    let _ = fs::remove_dir_all(&root);

    assert!(matches!(res, Err(SettingsError::ParseToml { .. })));
}

#[test]
fn missing_discovered_file_falls_back_to_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let root = temp_dir("defaults");

    let res = with_env("XDG_CONFIG_HOME", Some(root.as_os_str()), || {
        config::load_settings_or_default(None)
    });
    let _ = fs::remove_dir_all(&root);

    assert_eq!(res.unwrap(), Settings::default());
}

#[test]
fn template_root_prefers_environment_then_settings() {
    let _guard = ENV_LOCK.lock().unwrap();
    let settings = Settings {
        template_dir: Some(PathBuf::from("/from/settings")),
        ..Settings::default()
    };

    let from_env = with_env(
        config::TEMPLATE_DIR_ENV,
        Some(std::ffi::OsStr::new("/from/env")),
        || config::template_root(&settings),
    );
    assert_eq!(from_env, PathBuf::from("/from/env"));

    let from_settings = with_env(config::TEMPLATE_DIR_ENV, None, || {
        config::template_root(&settings)
    });
    assert_eq!(from_settings, PathBuf::from("/from/settings"));

    let bundled = with_env(config::TEMPLATE_DIR_ENV, None, || {
        config::template_root(&Settings::default())
    });
    assert_eq!(bundled, foundation_core::bundled_template_dir());
}
