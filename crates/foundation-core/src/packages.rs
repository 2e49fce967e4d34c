#![forbid(unsafe_code)]

//! Package installers: dependency and script injection into `package.json`.
//!
//! Nothing here runs a package manager; it only edits the manifest so a later
//! `npm install` picks the dependencies up.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::resolve::ResolvedConfiguration;
use crate::vocab::{Database, Orm, Router, Style};

/// Pinned versions for every dependency an installer may add.
///
/// Pinning avoids a registry round-trip per package.
pub const DEPENDENCY_VERSIONS: &[(&str, &str)] = &[
    ("@tailwindcss/vite", "^4.1.7"),
    ("@tanstack/react-query", "^5.79.0"),
    ("@tanstack/react-query-devtools", "^5.79.0"),
    ("@tanstack/react-router", "^1.120.11"),
    ("@tanstack/react-router-devtools", "^1.120.11"),
    ("@tanstack/router-plugin", "^1.120.11"),
    ("@types/better-sqlite3", "^7.6.13"),
    ("better-sqlite3", "^11.10.0"),
    ("drizzle-kit", "^0.31.1"),
    ("drizzle-orm", "^0.43.1"),
    ("react-router", "^7.6.1"),
    ("tailwindcss", "^4.1.7"),
];

pub fn dependency_version(name: &str) -> Option<&'static str> {
    DEPENDENCY_VERSIONS
        .iter()
        .find(|(dep, _)| *dep == name)
        .map(|(_, version)| *version)
}

/// A selectable package with its own installer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Package {
    TanstackRouter,
    ReactRouter,
    Tailwind,
    Sqlite,
    Drizzle,
}

impl Package {
    pub fn name(self) -> &'static str {
        match self {
            Package::TanstackRouter => "tanstack-router",
            Package::ReactRouter => "react-router",
            Package::Tailwind => "tailwind",
            Package::Sqlite => "sqlite",
            Package::Drizzle => "drizzle",
        }
    }

    pub fn dependencies(self) -> &'static [&'static str] {
        match self {
            Package::TanstackRouter => &["@tanstack/react-query"],
            Package::ReactRouter => &["@tanstack/react-query", "react-router"],
            Package::Tailwind => &[],
            Package::Sqlite => &["better-sqlite3"],
            Package::Drizzle => &["drizzle-orm"],
        }
    }

    pub fn dev_dependencies(self) -> &'static [&'static str] {
        match self {
            Package::TanstackRouter => &[
                "@tanstack/react-query-devtools",
                "@tanstack/react-router",
                "@tanstack/react-router-devtools",
                "@tanstack/router-plugin",
            ],
            Package::ReactRouter => &["@tanstack/react-query-devtools"],
            Package::Tailwind => &["@tailwindcss/vite", "tailwindcss"],
            Package::Sqlite => &["@types/better-sqlite3"],
            Package::Drizzle => &["drizzle-kit"],
        }
    }

    pub fn scripts(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Package::Drizzle => &[
                ("drizzle:rebuild:sqlite", "npm rebuild better-sqlite3"),
                (
                    "drizzle:generate",
                    "npm run drizzle:rebuild:sqlite && drizzle-kit generate",
                ),
                (
                    "drizzle:migrate",
                    "npm run drizzle:rebuild:sqlite && drizzle-kit migrate",
                ),
                (
                    "drizzle:studio",
                    "npm run drizzle:rebuild:sqlite && drizzle-kit studio",
                ),
            ],
            _ => &[],
        }
    }
}

/// Packages in use for `config`, in installer order.
pub fn selected_packages(config: &ResolvedConfiguration) -> Vec<Package> {
    let mut out = vec![match config.router {
        Router::TanstackRouter => Package::TanstackRouter,
        Router::ReactRouter => Package::ReactRouter,
    }];
    if config.styles == Some(Style::Tailwind) {
        out.push(Package::Tailwind);
    }
    if config.database == Some(Database::Sqlite) {
        out.push(Package::Sqlite);
    }
    if config.orm == Some(Orm::Drizzle) {
        out.push(Package::Drizzle);
    }
    out
}

#[derive(Debug)]
pub enum PackageJsonError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    NotAnObject {
        path: PathBuf,
        key: &'static str,
    },
    UnknownDependency(String),
}

impl fmt::Display for PackageJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageJsonError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            PackageJsonError::Parse { path, source } => {
                write!(f, "{}: invalid JSON: {}", path.display(), source)
            }
            PackageJsonError::NotAnObject { path, key } => {
                write!(f, "{}: `{key}` must be a JSON object", path.display())
            }
            PackageJsonError::UnknownDependency(name) => {
                write!(f, "no pinned version for dependency: {name}")
            }
        }
    }
}

impl std::error::Error for PackageJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackageJsonError::Io { source, .. } => Some(source),
            PackageJsonError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Rename the project and run every selected installer against `package.json`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn update_package_json(
    path: &Path,
    project_name: &str,
    packages: &[Package],
) -> Result<(), PackageJsonError> {
    let content = fs::read_to_string(path).map_err(|e| PackageJsonError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut manifest: Value =
        serde_json::from_str(&content).map_err(|e| PackageJsonError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    apply_packages(&mut manifest, project_name, packages).map_err(|err| match err {
        PackageJsonError::NotAnObject { key, .. } => PackageJsonError::NotAnObject {
            path: path.to_path_buf(),
            key,
        },
        other => other,
    })?;

    let mut out = serde_json::to_string_pretty(&manifest).map_err(|e| PackageJsonError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    out.push('\n');
    fs::write(path, out).map_err(|e| PackageJsonError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply installers to an in-memory manifest.
pub fn apply_packages(
    manifest: &mut Value,
    project_name: &str,
    packages: &[Package],
) -> Result<(), PackageJsonError> {
    let root = manifest
        .as_object_mut()
        .ok_or(PackageJsonError::NotAnObject {
            path: PathBuf::from("package.json"),
            key: "(root)",
        })?;
    root.insert("name".to_string(), Value::String(project_name.to_string()));

    for package in packages {
        debug!(package = package.name(), "run installer");
        for dep in package.dependencies() {
            add_dependency(root, "dependencies", dep)?;
        }
        for dep in package.dev_dependencies() {
            add_dependency(root, "devDependencies", dep)?;
        }
        for (name, command) in package.scripts() {
            section(root, "scripts")?.insert((*name).to_string(), Value::String((*command).to_string()));
        }
    }

    for key in ["scripts", "dependencies", "devDependencies"] {
        if let Some(Value::Object(map)) = root.get_mut(key) {
            sort_map(map);
        }
    }
    Ok(())
}

fn add_dependency(
    root: &mut Map<String, Value>,
    key: &'static str,
    name: &str,
) -> Result<(), PackageJsonError> {
    let version =
        dependency_version(name).ok_or_else(|| PackageJsonError::UnknownDependency(name.to_string()))?;
    section(root, key)?.insert(name.to_string(), Value::String(version.to_string()));
    Ok(())
}

fn section<'a>(
    root: &'a mut Map<String, Value>,
    key: &'static str,
) -> Result<&'a mut Map<String, Value>, PackageJsonError> {
    root.entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or(PackageJsonError::NotAnObject {
            path: PathBuf::from("package.json"),
            key,
        })
}

fn sort_map(map: &mut Map<String, Value>) {
    let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    map.extend(entries);
}
