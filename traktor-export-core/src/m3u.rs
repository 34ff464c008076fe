//! Playlist-only export to M3U files
//!
//! Mirrors the NML folder tree as directories below the output directory and
//! writes one `<playlist>.m3u` per playlist, listing absolute track paths one
//! per line. No collection lookup happens here; paths come straight from the
//! playlist entry keys.

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::nml::{parse_playlists, SourceNode};
use crate::output::write_atomic;
use crate::path::local_path;

pub const M3U_EXTENSION: &str = "m3u";

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaylistExportSummary {
    pub folders: usize,
    pub playlists: usize,
    pub entries: usize,
    pub files: Vec<PathBuf>,
}

/// File system name for a node; the path separator becomes `-`
pub fn sanitize_name(name: &str) -> String {
    name.replace(MAIN_SEPARATOR, "-")
}

/// M3U body for a playlist's entry keys
pub fn render_m3u(keys: &[String], config: &ExportConfig) -> String {
    let mut out = String::new();
    for key in keys {
        out.push_str(&local_path(key, MAIN_SEPARATOR, &config.mount_prefix));
        out.push('\n');
    }
    out
}

/// Write the children of `root` below `output_dir`
pub fn write_playlist_tree(
    root: &SourceNode,
    output_dir: &Path,
    config: &ExportConfig,
) -> Result<PlaylistExportSummary> {
    let mut summary = PlaylistExportSummary::default();

    fs::create_dir_all(output_dir)?;
    if let SourceNode::Folder { children, .. } = root {
        for child in children {
            write_node(child, output_dir, config, &mut summary)?;
        }
    }

    Ok(summary)
}

fn write_node(
    node: &SourceNode,
    parent_dir: &Path,
    config: &ExportConfig,
    summary: &mut PlaylistExportSummary,
) -> Result<()> {
    let node_path = parent_dir.join(sanitize_name(node.name()));

    match node {
        SourceNode::Folder { children, .. } => {
            fs::create_dir_all(&node_path)?;
            summary.folders += 1;

            for child in children {
                write_node(child, &node_path, config, summary)?;
            }
        }
        SourceNode::Playlist { name, .. } if config.is_excluded_playlist(name) => {
            debug!("Skipping excluded playlist {}", name);
        }
        SourceNode::Playlist { keys, .. } => {
            let file = with_extension(&node_path);
            write_atomic(&file, render_m3u(keys, config).as_bytes())?;
            debug!("Wrote {:?} ({} entries)", file, keys.len());

            summary.playlists += 1;
            summary.entries += keys.len();
            summary.files.push(file);
        }
    }

    Ok(())
}

/// Append `.m3u` without replacing dots already in the playlist name
fn with_extension(path: &Path) -> PathBuf {
    let mut file = path.as_os_str().to_owned();
    file.push(".");
    file.push(M3U_EXTENSION);
    PathBuf::from(file)
}

/// Export every playlist of an NML file as M3U
pub fn export_playlists(input: &Path, output_dir: &Path, config: &ExportConfig) -> Result<PlaylistExportSummary> {
    info!("Reading playlists from {:?}", input);
    let xml = fs::read_to_string(input)?;
    let root = parse_playlists(&xml)?.ok_or_else(|| Error::MissingElement {
        element: "NODE",
        context: "PLAYLISTS".into(),
    })?;

    let summary = write_playlist_tree(&root, output_dir, config)?;
    info!(
        "Wrote {} playlists ({} entries) in {} folders to {:?}",
        summary.playlists, summary.entries, summary.folders, output_dir
    );

    Ok(summary)
}
