use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use libeq_archive::Archive;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the files an archive contains
    List { path: PathBuf },
    /// Inflate every file in an archive to a destination directory
    Extract { path: PathBuf, dest: PathBuf },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::List { path } => list(&path),
        Command::Extract { path, dest } => extract(&path, &dest),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error while reading {}", message);
            ExitCode::FAILURE
        }
    }
}

fn list(path: &Path) -> Result<(), String> {
    let archive = Archive::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    for (name, entry) in archive.files() {
        println!("{name} ({} bytes)", entry.uncompressed_size);
    }
    Ok(())
}

fn extract(path: &Path, dest: &Path) -> Result<(), String> {
    let archive = Archive::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    fs::create_dir_all(dest).map_err(|e| format!("{}: {e}", dest.display()))?;
    for (name, _) in archive.files() {
        let data = archive.open(name).map_err(|e| format!("{}: {e}", path.display()))?;
        let out_path = dest.join(name);
        fs::write(&out_path, data).map_err(|e| format!("{}: {e}", out_path.display()))?;
    }
    Ok(())
}
