//! `algo-studio` command-line interface

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::{Path, PathBuf};
use studio_core::StudioConfig;
use studio_record::{parse_import, Record, RecordLoader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let file_arg = || {
        Arg::new("file")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Record JSON file")
    };

    let cli = Command::new("algo-studio")
        .version(studio_core::VERSION)
        .about("Algorithm record authoring: implementation matrix and protected merge")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Studio configuration (TOML)"),
        )
        .subcommand(
            Command::new("normalize")
                .about("Decode legacy double-encoded fields and print structured JSON")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check matrix consistency and save-time identity fields")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("approaches")
                .about("Print approach order and missing cells")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("merge")
                .about("Smart-fill an incoming payload into an existing record")
                .arg(
                    Arg::new("existing")
                        .long("existing")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Record being edited"),
                )
                .arg(
                    Arg::new("incoming")
                        .long("incoming")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Pasted or generated payload (object, or array using its first element)"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write merged record here instead of stdout"),
                ),
        );

    let matches = cli.get_matches();
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::load(path).await?,
        None => StudioConfig::default(),
    };

    match matches.subcommand() {
        Some(("normalize", args)) => {
            let record = load_record(path_arg(args, "file")?).await?;
            println!("{}", record.to_json_pretty()?);
        }
        Some(("validate", args)) => {
            let record = load_record(path_arg(args, "file")?).await?;
            let report = record.implementations.validate();
            let identity = record.check_identity();

            println!("implementations: {report}");
            match &identity {
                Ok(()) => println!("identity: ok"),
                Err(err) => println!("identity: {err}"),
            }

            if report.has_errors() || identity.is_err() {
                std::process::exit(1);
            }
        }
        Some(("approaches", args)) => {
            let record = load_record(path_arg(args, "file")?).await?;
            let coverage = studio_matrix::ApproachKeyRegistry::coverage(&record.implementations);

            for entry in coverage {
                let missing: Vec<_> = entry.missing.iter().map(ToString::to_string).collect();
                if missing.is_empty() {
                    println!("{} ({})", entry.approach, entry.approach.display());
                } else {
                    println!(
                        "{} ({}) missing: {}",
                        entry.approach,
                        entry.approach.display(),
                        missing.join(", ")
                    );
                }
            }
        }
        Some(("merge", args)) => {
            let existing = load_record(path_arg(args, "existing")?).await?;
            let incoming_path = path_arg(args, "incoming")?;
            let incoming_text = read(incoming_path).await?;
            let incoming = parse_import(&incoming_text)
                .with_context(|| format!("rejected payload {}", incoming_path.display()))?;

            let outcome = config.merge_engine()?.merge(&existing, &incoming);
            eprint!("{}", outcome.report);

            let json = outcome.record.to_json_pretty()?;
            match args.get_one::<PathBuf>("out") {
                Some(out) => tokio::fs::write(out, json)
                    .await
                    .with_context(|| format!("cannot write {}", out.display()))?,
                None => println!("{json}"),
            }
        }
        _ => {}
    }

    Ok(())
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing argument: {name}"))
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

async fn load_record(path: &Path) -> Result<Record> {
    let text = read(path).await?;
    RecordLoader::new()
        .load_str(&text)
        .with_context(|| format!("invalid record {}", path.display()))
}
