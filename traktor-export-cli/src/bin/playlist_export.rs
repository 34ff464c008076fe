//! Export Traktor playlists as a directory tree of M3U files

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use traktor_export_cli::{init_logging, print_json, CommonArgs};
use traktor_export_core::{export_playlists, ExportConfig};

#[derive(Parser)]
#[command(name = "playlist-export")]
#[command(about = "Export Traktor playlists to M3U files")]
#[command(version)]
struct Cli {
    /// Traktor collection (collection.nml)
    input: PathBuf,

    /// Directory receiving the playlist tree
    output: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.common.verbose)?;

    let mut config = ExportConfig::default();
    cli.common.apply(&mut config);

    let summary = export_playlists(&cli.input, &cli.output, &config)
        .with_context(|| format!("Cannot export playlists from {:?} to {:?}", cli.input, cli.output))?;
    info!("Exported {} playlists", summary.playlists);

    if cli.common.json {
        print_json(&summary)?;
    }

    Ok(())
}
