//! Command-line front-end for inspecting compressed tar archives in place.

use std::{
    io::{stdout, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tarwalk::{ArchiveReader, Compression, PrefixMatch};

/// tarwalk
#[derive(Debug, Parser)]
#[clap(name = "tarwalk", version)]
pub struct App {
    /// Compression of the archive (guessed from the file name if not given)
    #[clap(long, value_enum)]
    compression: Option<Compression>,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists the entries of an archive in the order they are stored
    Ls {
        archive: PathBuf,
        /// only list entries under this path
        #[clap(long)]
        prefix: Option<String>,
        /// how --prefix is matched against entry paths
        #[clap(long, value_enum, default_value_t = PrefixMatch::String)]
        matching: PrefixMatch,
        /// show mode, owner, size and modification time
        #[clap(short, long)]
        long: bool,
    },
    /// Writes the content of one file in the archive to stdout
    Cat { archive: PathBuf, path: String },
}

fn open(archive: &Path, compression: Option<Compression>) -> Result<ArchiveReader<std::fs::File>> {
    let reader = match compression {
        Some(compression) => tarwalk::open_with(archive, compression),
        None => tarwalk::open(archive),
    };
    reader.with_context(|| format!("Opening {archive:?}"))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = App::parse();

    match args.cmd {
        Command::Ls {
            archive,
            prefix,
            matching,
            long,
        } => {
            let reader = open(&archive, args.compression)?;
            let mut out = stdout().lock();
            let mut print = |entry: tarwalk::ArchiveEntry| -> Result<()> {
                if long {
                    writeln!(out, "{entry}")?;
                } else {
                    writeln!(out, "{}", entry.path)?;
                }
                Ok(())
            };
            match prefix {
                Some(root) => reader.walk_matching(&root, matching, &mut print)?,
                None => reader.walk_all(&mut print)?,
            };
        }
        Command::Cat { archive, path } => {
            let content = open(&archive, args.compression)?.get_file(&path)?;
            stdout().lock().write_all(&content)?;
        }
    }

    Ok(())
}
