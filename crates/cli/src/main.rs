use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use pak_core::config::load_pack_options_for;
use pak_core::progress::LogProgress;
use pak_core::reader::Unpacker;
use pak_core::writer::pack_with_progress;

/// Pack a directory into a `.pak` archive, or unpack a `.pak` archive into
/// a sibling directory, based on what `path` points at (§4.7: no flags).
#[derive(Parser)]
#[command(
    name = "pak-tool",
    author,
    version,
    about = "Pack or unpack PAK! v4 archives"
)]
struct Cli {
    /// A `.pak` file to unpack, or a directory to pack.
    path: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(&cli.path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> pak_core::Result<()> {
    if path.is_dir() {
        pack_directory(path)
    } else if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pak"))
    {
        unpack_archive(path)
    } else {
        Err(pak_core::PakError::NotPak)
    }
}

fn pack_directory(dir: &Path) -> pak_core::Result<()> {
    let dest = dir.with_extension("pak");
    if dest.exists() && !confirm_overwrite(&dest) {
        info!("operation cancelled");
        return Ok(());
    }

    info!("packing {} into {}", dir.display(), dest.display());
    let options = load_pack_options_for(dir)?;
    pack_with_progress(dir, &dest, &options, &LogProgress)?;
    Ok(())
}

fn unpack_archive(archive: &Path) -> pak_core::Result<()> {
    let dest = archive.with_extension("");
    if dest.exists() && !confirm_overwrite(&dest) {
        info!("operation cancelled");
        return Ok(());
    }

    info!("unpacking {} into {}", archive.display(), dest.display());
    let unpacker = Unpacker::open(archive)?;
    let report = unpacker.extract_all_with(
        &dest,
        &LogProgress,
        &pak_core::filetime_support::PlatformFileTimeRestorer,
        None,
    )?;

    for failure in report.failures() {
        if let Err(msg) = &failure.outcome {
            error!("{}: {}", failure.path, msg);
        }
    }
    info!("extracted {}/{} files", report.succeeded(), report.results.len());
    Ok(())
}

/// Prompts on stdin for overwrite confirmation (§4.7: "y" proceeds, anything
/// else aborts).
fn confirm_overwrite(dest: &Path) -> bool {
    print!("'{}' already exists. Overwrite? (y/n): ", dest.display());
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    line.trim().eq_ignore_ascii_case("y")
}
