//! Export a Traktor collection to a rekordbox collection XML

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use traktor_export_cli::{init_logging, print_json, CommonArgs};
use traktor_export_core::{export_collection, ExportConfig};

#[derive(Parser)]
#[command(name = "rekordbox-export")]
#[command(about = "Convert a Traktor collection.nml into a rekordbox XML collection")]
#[command(version)]
struct Cli {
    /// Traktor collection (collection.nml)
    input: PathBuf,

    /// rekordbox XML file to write
    output: PathBuf,

    /// PRODUCT Company written into the document
    #[arg(long)]
    company: Option<String>,

    /// Fail on tracks without location instead of skipping them
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.verbose)?;

    let mut config = ExportConfig {
        strict: cli.strict,
        ..Default::default()
    };
    cli.common.apply(&mut config);
    if let Some(company) = cli.company {
        config.product.company = company;
    }

    let summary = export_collection(&cli.input, &cli.output, &config)
        .with_context(|| format!("Cannot export {:?} to {:?}", cli.input, cli.output))?;

    for track in &summary.skipped.missing_location {
        warn!("Not exported (no location): {}", track);
    }
    info!(
        "Exported {} tracks, {} cue markers, {} grid markers, {} playlists",
        summary.tracks, summary.cue_markers, summary.grid_markers, summary.playlists
    );

    if cli.common.json {
        print_json(&summary)?;
    }

    Ok(())
}
