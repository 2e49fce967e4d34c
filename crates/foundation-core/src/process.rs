#![forbid(unsafe_code)]

//! Wrappers around the external tools run after scaffolding.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, info, instrument};

use crate::vocab::{PackageManager, Vocabulary};

#[derive(Debug)]
pub enum ProcessError {
    /// The program could not be started at all.
    Spawn { program: String, source: io::Error },
    /// The program ran and exited unsuccessfully.
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn { program, source } => {
                write!(f, "failed to run {program}: {source}")
            }
            ProcessError::Failed {
                command,
                code,
                stderr,
            } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                if stderr.is_empty() {
                    write!(f, "{command} failed ({code})")
                } else {
                    write!(f, "{command} failed ({code}): {stderr}")
                }
            }
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn { source, .. } => Some(source),
            ProcessError::Failed { .. } => None,
        }
    }
}

fn run(program: &str, args: &[&str], dir: &Path) -> Result<Output, ProcessError> {
    debug!(program, ?args, dir = %dir.display(), "spawn");
    Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ProcessError::Spawn {
            program: program.to_string(),
            source: e,
        })
}

fn check(program: &str, args: &[&str], out: Output) -> Result<(), ProcessError> {
    if out.status.success() {
        return Ok(());
    }
    Err(ProcessError::Failed {
        command: std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" "),
        code: out.status.code(),
        stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
    })
}

fn run_checked(program: &str, args: &[&str], dir: &Path) -> Result<(), ProcessError> {
    let out = run(program, args, dir)?;
    check(program, args, out)
}

/// Install the project's dependencies with `pkg_manager`.
#[instrument(skip_all, fields(pkg_manager = pkg_manager.as_str(), dir = %dir.display()))]
pub fn install_dependencies(pkg_manager: PackageManager, dir: &Path) -> Result<(), ProcessError> {
    info!("installing dependencies");
    run_checked(pkg_manager.as_str(), &["install"], dir)
}

/// Generate and apply the drizzle migrations.
#[instrument(skip_all, fields(pkg_manager = pkg_manager.as_str(), dir = %dir.display()))]
pub fn run_migrations(pkg_manager: PackageManager, dir: &Path) -> Result<(), ProcessError> {
    info!("running migrations");
    for script in ["drizzle:generate", "drizzle:migrate"] {
        run_checked(pkg_manager.as_str(), &["run", script], dir)?;
    }
    Ok(())
}

/// Initialize a repository on `branch` and stage every file.
#[instrument(skip_all, fields(dir = %dir.display(), branch = %branch))]
pub fn git_init(dir: &Path, branch: &str) -> Result<(), ProcessError> {
    info!("git init");

    let out = run("git", &["init", "--initial-branch", branch], dir)?;
    if !out.status.success() {
        debug!(
            status = ?out.status.code(),
            stderr = %String::from_utf8_lossy(&out.stderr),
            "git init --initial-branch failed; falling back"
        );
        run_checked("git", &["init"], dir)?;
        // Older git has no --initial-branch.
        run_checked("git", &["checkout", "-B", branch], dir)?;
    }

    run_checked("git", &["add", "-A"], dir)
}

/// Whether `git` can be spawned at all.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Launch `command .` in `dir` without waiting for the editor to exit.
#[instrument(skip_all, fields(command = %command, dir = %dir.display()))]
pub fn open_ide(command: &str, dir: &Path) -> Result<(), ProcessError> {
    info!("opening project");
    Command::new(command)
        .arg(".")
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| ProcessError::Spawn {
            program: command.to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_command_renders_code_and_stderr() {
        let err = ProcessError::Failed {
            command: "npm run drizzle:migrate".to_string(),
            code: Some(2),
            stderr: "no such script".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "npm run drizzle:migrate failed (2): no such script"
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run_checked(
            "create-foundation-definitely-missing-program",
            &[],
            Path::new("."),
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
