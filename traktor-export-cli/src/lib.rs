//! Shared setup for the traktor-export binaries

use clap::Args;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use traktor_export_core::ExportConfig;

/// Flags common to both exporters
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Mount point prepended to paths without a drive letter
    #[arg(long, default_value = "Volumes")]
    pub mount_prefix: String,

    /// Additional playlist names to leave out (`_LOOPS` and `_RECORDINGS` always are)
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn apply(&self, config: &mut ExportConfig) {
        config.mount_prefix = self.mount_prefix.clone();
        config.excluded_playlists.extend(self.exclude.iter().cloned());
    }
}

/// Install the stderr log subscriber
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Print a run summary as pretty JSON
pub fn print_json<T: serde::Serialize>(summary: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
