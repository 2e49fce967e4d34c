#![forbid(unsafe_code)]

//! Fixed option vocabularies for project generation.
//!
//! Every enumerated CLI option maps onto one of the enums here. Values parse
//! case-insensitively; `none` (or the legacy `false`) is the opt-out sentinel
//! for options that allow one.

use std::fmt;

/// Behavior shared by every option enum.
pub trait Vocabulary: Sized + Copy + 'static {
    /// Flag name used in log messages, e.g. `router`.
    const OPTION: &'static str;

    /// Every valid value, in prompt order.
    const ALL: &'static [Self];

    /// Canonical CLI spelling.
    fn as_str(self) -> &'static str;

    /// Human label shown by the prompter.
    fn label(self) -> &'static str;

    /// Parse a CLI value case-insensitively.
    fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }

    /// Comma-separated list of valid values for help text and errors.
    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Returns true for the opt-out sentinels (`none`, `false`).
pub fn is_opt_out(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "none" | "false")
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $option:literal {
            $( $variant:ident => $value:literal, $label:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
        }

        impl Vocabulary for $name {
            const OPTION: &'static str = $option;
            const ALL: &'static [Self] = &[ $( $name::$variant, )+ ];

            fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $value, )+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Client-side router.
    Router, "router" {
        TanstackRouter => "tanstack-router", "Tanstack Router";
        ReactRouter => "react-router", "React Router";
    }
}

vocabulary! {
    /// Styling system.
    Style, "styles" {
        Tailwind => "tailwind", "Tailwind CSS";
        Css => "css", "Plain CSS";
    }
}

vocabulary! {
    /// Embedded database.
    Database, "database" {
        Sqlite => "sqlite", "SQLite";
    }
}

vocabulary! {
    /// Database ORM.
    Orm, "orm" {
        Drizzle => "drizzle", "Drizzle ORM";
    }
}

vocabulary! {
    PackageManager, "pkg_manager" {
        Npm => "npm", "npm";
    }
}

vocabulary! {
    /// Editor to open the generated project in.
    Ide, "ide" {
        Cursor => "cursor", "Cursor";
        Vscode => "vscode", "VSCode";
    }
}

impl Ide {
    /// Launcher executable for this editor.
    pub fn command(self) -> &'static str {
        match self {
            Ide::Cursor => "cursor",
            Ide::Vscode => "code",
        }
    }
}

/// Tri-state for options that may be left unspecified or explicitly disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection<T> {
    #[default]
    Unspecified,
    Disabled,
    Chosen(T),
}

impl<T: Copy> Selection<T> {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Selection::Unspecified)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Selection::Disabled)
    }

    pub fn is_chosen(&self) -> bool {
        matches!(self, Selection::Chosen(_))
    }

    /// The chosen value, if any.
    pub fn chosen(&self) -> Option<T> {
        match self {
            Selection::Chosen(v) => Some(*v),
            _ => None,
        }
    }

    /// Keep `self` unless it is unspecified.
    pub fn or(self, other: Selection<T>) -> Selection<T> {
        match self {
            Selection::Unspecified => other,
            specified => specified,
        }
    }

    /// Collapse into a resolved value: `None` for disabled, `default` when unspecified.
    pub fn resolve_or(self, default: Option<T>) -> Option<T> {
        match self {
            Selection::Unspecified => default,
            Selection::Disabled => None,
            Selection::Chosen(v) => Some(v),
        }
    }
}

pub const DEFAULT_PROJECT_NAME: &str = "electron-foundation";
pub const DEFAULT_ROUTER: Router = Router::TanstackRouter;
pub const DEFAULT_STYLE: Style = Style::Tailwind;
pub const DEFAULT_DATABASE: Database = Database::Sqlite;
pub const DEFAULT_ORM: Orm = Orm::Drizzle;
pub const DEFAULT_PACKAGE_MANAGER: PackageManager = PackageManager::Npm;
pub const DEFAULT_IDE: Ide = Ide::Cursor;
pub const DEFAULT_INITIALIZE_GIT: bool = true;
pub const DEFAULT_INSTALL_PACKAGES: bool = true;
pub const DEFAULT_RUN_MIGRATIONS: bool = true;

/// Render the `<router>-<styles>-<database>-<orm>` configuration key.
pub fn config_key(
    router: Router,
    styles: Option<Style>,
    database: Option<Database>,
    orm: Option<Orm>,
) -> String {
    format!(
        "{}-{}-{}-{}",
        router,
        styles.map_or("none", Style::as_str),
        database.map_or("none", Database::as_str),
        orm.map_or("none", Orm::as_str),
    )
}
