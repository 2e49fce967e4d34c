#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xtask", about = "create-foundation maintenance tasks")]
struct Xtask {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Render create-foundation.1 from the clap command definition.
    Man {
        #[arg(long = "out-dir", default_value = "target/man")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<(), String> {
    match Xtask::parse().command {
        Task::Man { out_dir } => write_manpage(out_dir),
    }
}

fn write_manpage(out_dir: PathBuf) -> Result<(), String> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace = manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(&manifest_dir)
        .to_path_buf();
    let out_dir = workspace.join(out_dir);
    fs::create_dir_all(&out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let cmd = create_foundation::command();
    let path = out_dir.join(format!("{}.1", cmd.get_name()));
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut page)
        .map_err(|e| format!("render {}: {e}", path.display()))?;
    fs::write(&path, page).map_err(|e| format!("{}: {e}", path.display()))?;

    println!("wrote {}", path.display());
    Ok(())
}
