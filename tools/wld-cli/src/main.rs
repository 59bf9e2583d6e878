use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use libeq_archive::Archive;
use libeq_wld::Wld;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every fragment record in a wld document
    DumpFragments {
        archive: PathBuf,
        wld_name: Option<String>,
    },
    /// List every skeleton and the animations found for it
    DumpSkeletons {
        archive: PathBuf,
        wld_name: Option<String>,
    },
    /// List actors, their skeleton/mesh pieces, and per-skin material coverage
    ListCharacters {
        archive: PathBuf,
        wld_name: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::DumpFragments { archive, wld_name } => {
            run(&archive, wld_name.as_deref(), dump_fragments)
        }
        Command::DumpSkeletons { archive, wld_name } => {
            run(&archive, wld_name.as_deref(), dump_skeletons)
        }
        Command::ListCharacters { archive, wld_name } => {
            run(&archive, wld_name.as_deref(), list_characters)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(archive_path: &PathBuf, wld_name: Option<&str>, f: fn(&Wld)) -> Result<(), String> {
    let archive =
        Archive::open(archive_path).map_err(|e| format!("error while reading {}: {e}", archive_path.display()))?;

    let name = match wld_name {
        Some(name) => name.to_string(),
        None => archive
            .files()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .find(|name| name.to_lowercase().ends_with(".wld"))
            .ok_or_else(|| format!("{}: no .wld entry found", archive_path.display()))?,
    };

    let data = archive
        .open(&name)
        .map_err(|e| format!("error while reading {name}: {e}"))?;
    let wld = libeq_wld::load(&data).map_err(|e| format!("error while reading {name}: {e}"))?;

    f(&wld);
    Ok(())
}

fn dump_fragments(wld: &Wld) {
    for (index, fragment) in wld.doc().iter().enumerate() {
        let reference = libeq_wld::parser::StringReference::new(fragment.name_ref());
        let name = wld.doc().get_string(reference).unwrap_or_default();
        println!("{index:>5}  type=0x{:02x}  name={name:?}", fragment.type_id());
    }
}

fn dump_skeletons(wld: &Wld) {
    for (key, skeleton, animations) in wld.skeleton_animations() {
        println!("{key}: {} bones", skeleton.entries.len());
        for (anim_name, _) in &animations.animations {
            println!("    {anim_name}");
        }
    }
}

fn list_characters(wld: &Wld) {
    for actor in wld.actor_defs() {
        let name = actor.name().unwrap_or_else(|| "<unnamed>".to_string());
        println!("{name}");

        if let Some(skeleton) = actor.skeleton() {
            println!("  skeleton: {} pieces", skeleton.entries.len());
        }

        if let Some(mesh) = actor.mesh() {
            let materials: Vec<String> = mesh
                .materials()
                .iter()
                .filter_map(|m| m.name())
                .collect();
            println!("  mesh: {} vertices", mesh.positions().len());
            println!("  materials: {}", materials.join(", "));
        }
    }
}
