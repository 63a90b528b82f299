use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use inikit::{Dialect, Fetch, Options, Profile};

/// Inspect and edit INI, Windows ini, registry export and option files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dialect of the document: ini, wini, reg or options
    #[arg(short, long, value_name = "DIALECT", default_value = "ini")]
    dialect: Dialect,

    /// Path to the document
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List section names
    Sections,
    /// Print the document as it would be written
    Dump,
    /// Print the stored value of an option
    Get { section: String, option: String },
    /// Print the value of an option with placeholders expanded
    Fetch { section: String, option: String },
    /// Set an option and write the document back
    Set {
        section: String,
        option: String,
        value: String,
    },
}

enum Document {
    Profile(Profile),
    Options(Options),
}

impl Document {
    fn load(dialect: Dialect, path: &Path) -> anyhow::Result<Self> {
        let document = match dialect {
            Dialect::Options => Self::Options(Options::from_path(path)?),
            dialect => Self::Profile(Profile::from_path(dialect, path)?),
        };
        Ok(document)
    }

    fn store(&self, path: &Path) -> inikit::Result<()> {
        match self {
            Self::Profile(profile) => profile.store_path(path),
            Self::Options(options) => options.store_path(path),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    let args = Args::parse();
    let mut document = Document::load(args.dialect, &args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    match (args.command, &mut document) {
        (Command::Sections, Document::Profile(profile)) => {
            for name in profile.keys() {
                println!("{name}");
            }
        }
        (Command::Sections, Document::Options(_)) => {}
        (Command::Dump, Document::Profile(profile)) => print!("{}", profile.to_text()?),
        (Command::Dump, Document::Options(options)) => print!("{}", options.to_text()?),
        (Command::Get { section, option }, Document::Profile(profile)) => {
            let Some(value) = profile.get_value(&section, &option) else {
                bail!("no option {option:?} in section {section:?}");
            };
            println!("{value}");
        }
        (Command::Get { option, .. }, Document::Options(options)) => {
            let Some(value) = options.get(&option) else {
                bail!("no option {option:?}");
            };
            println!("{value}");
        }
        (Command::Fetch { section, option }, Document::Profile(profile)) => {
            let Some(value) = profile.fetch_value(&section, &option) else {
                bail!("no option {option:?} in section {section:?}");
            };
            println!("{value}");
        }
        (Command::Fetch { option, .. }, Document::Options(options)) => {
            let Some(value) = options.fetch(&option) else {
                bail!("no option {option:?}");
            };
            println!("{value}");
        }
        (
            Command::Set {
                section,
                option,
                value,
            },
            document,
        ) => {
            match document {
                Document::Profile(profile) => {
                    profile.put_value(&section, &option, value)?;
                }
                Document::Options(options) => {
                    options.put(option, value);
                }
            }
            document
                .store(&args.file)
                .with_context(|| format!("failed to write {}", args.file.display()))?;
            info!("updated {}", args.file.display());
        }
    }

    Ok(())
}
