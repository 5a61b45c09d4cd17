use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
mod auth;
use sealbox::{DATA_DIR_VAR, DEFAULT_DATA_DIR, SealedStore, StoreConfig, normalize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sealbox")]
#[command(
    version,
    about = "Passphrase-sealed envelope encryption and encrypted file storage."
)]
struct Cli {
    /// Base directory for stored objects
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = DATA_DIR_VAR,
        default_value = DEFAULT_DATA_DIR
    )]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts and stores a value at a logical path
    #[command(arg_required_else_help = true)]
    Put {
        path: String,
        /// Literal value to store; omit when using --file
        value: Option<String>,
        /// Read the value from a file instead
        #[arg(long, conflicts_with = "value", value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Decrypts and prints a stored value
    #[command(arg_required_else_help = true)]
    Get {
        path: String,
        /// Write the decrypted bytes to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Removes a stored value
    #[command(arg_required_else_help = true)]
    Rm { path: String },

    /// Lists stored envelopes under a directory
    Ls {
        #[arg(default_value = ".")]
        dir: String,

        /// Print names and modification times
        #[arg(short, long, default_value_t = false)]
        long: bool,
    },

    /// Reports whether a stored value exists
    #[command(arg_required_else_help = true)]
    Exists { path: String },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let passphrase = auth::read_passphrase()?;
    let store = SealedStore::open(StoreConfig::new(passphrase, args.data_dir.clone()))?;

    match args.command {
        Commands::Put { path, value, file } => {
            let bytes = match (value, file) {
                (Some(v), None) => v.into_bytes(),
                (None, Some(f)) => {
                    fs::read(&f).with_context(|| format!("cannot read '{}'", f.display()))?
                }
                _ => bail!("provide a value or --file"),
            };
            store.write(&path, &bytes)?;
            println!("stored '{}'", normalize(&path).display());
        }
        Commands::Get { path, out } => {
            let bytes = store.read(&path)?;
            match out {
                Some(f) => fs::write(&f, &*bytes)
                    .with_context(|| format!("cannot write '{}'", f.display()))?,
                None => println!("{}", String::from_utf8_lossy(&bytes)),
            }
        }
        Commands::Rm { path } => {
            store.delete(&path)?;
            println!("removed '{}'", normalize(&path).display());
        }
        Commands::Ls { dir, long } => {
            let names = store.list(&dir);
            if !long {
                for name in names {
                    println!("{name}");
                }
                return Ok(());
            }

            if names.is_empty() {
                println!("No stored objects.");
                return Ok(());
            }

            let name_width = names
                .iter()
                .map(|n| n.len())
                .chain(std::iter::once("Name".len()))
                .max()
                .unwrap();

            println!("{:<name_width$}  {}", "Name", "Modified");
            println!("{:-<name_width$}  {:-<19}", "", "");

            for name in names {
                let modified = fs::metadata(store.base_dir().join(&dir).join(&name))
                    .and_then(|m| m.modified())
                    .map(|t| {
                        let local: DateTime<Local> = t.into();
                        local.format("%Y-%m-%d %H:%M:%S").to_string()
                    })
                    .unwrap_or_else(|_| "-".to_string());
                println!("{name:<name_width$}  {modified}");
            }
        }
        Commands::Exists { path } => {
            if store.exists(&path) {
                println!("{}", normalize(&path).display());
            } else {
                bail!("no stored object at '{}'", normalize(&path).display());
            }
        }
    }

    Ok(())
}
