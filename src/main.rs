use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use opml_sort::config::Config;
use opml_sort::opml::{Mode, OpmlTransformer};

#[derive(Parser, Debug)]
#[command(
    name = "opml-sort",
    version,
    about = "Parse, sort and write an OPML subscription file"
)]
struct Args {
    /// OPML file to read
    input: PathBuf,

    /// Path to write the sorted OPML to
    output: PathBuf,

    /// Log every feed as it is parsed
    #[arg(short, long)]
    verbose: bool,

    /// How to treat the groups in the body (default: auto)
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Title of the single group written in flat mode
    #[arg(long, value_name = "TEXT")]
    group_title: Option<String>,

    /// Do not write the <?xml ...?> declaration
    #[arg(long)]
    no_declaration: bool,

    /// Config file (default: ~/.config/opml-sort/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Logs go to stdout. `RUST_LOG` wins over the verbosity flag when set.
fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "warn,opml_sort=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Unable to initialize logging: {}", e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => Config::default(),
        },
    };

    let mut options = config.transform_options();
    options.verbose |= args.verbose;
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    if let Some(title) = args.group_title {
        options.write.group_title = title;
    }
    if args.no_declaration {
        options.write.xml_declaration = false;
    }

    init_logging(options.verbose)?;
    for key in &config.unknown_keys {
        tracing::warn!(key = %key, "Unknown key in config file, ignoring");
    }

    let summary = OpmlTransformer::new(options)
        .run(&args.input, &args.output)
        .with_context(|| {
            format!(
                "Failed to sort '{}' into '{}'",
                args.input.display(),
                args.output.display()
            )
        })?;

    println!(
        "Sorted {} feeds ({} categories) into {}",
        summary.feeds,
        summary.categories,
        args.output.display()
    );
    Ok(())
}
