//! rekordbox collection document
//!
//! Output layout:
//! - DJ_PLAYLISTS Version="1.0.0"
//!   - PRODUCT Name Version Company
//!   - COLLECTION Entries
//!     - TRACK (attributes from [`TargetTrack::attributes`])
//!       - POSITION_MARK Name Type Start [End] Num
//!       - TEMPO Inizio Bpm Metro Battito
//!   - PLAYLISTS
//!     - NODE Type="0" Name="ROOT" Count
//!       - NODE Type="0" Name Count (folders)
//!       - NODE Name Type="1" KeyType="1" Entries (playlists)
//!         - TRACK Key

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::config::{ExportConfig, Product};
use crate::cue::{format_bpm, format_seconds, CueMarker, GridMarker, GRID_BEAT, GRID_METER};
use crate::error::{Error, Result};
use crate::index::{SkippedTracks, TrackIndex};
use crate::nml::{parse_collection, SourceCollection};
use crate::output::write_atomic;
use crate::playlist::{rebuild_tree, KeyType, PlaylistNode};
use crate::track::TargetTrack;
use crate::xml::XmlWriter;

/// `DJ_PLAYLISTS Version`
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Fully converted collection, ready to serialize
#[derive(Debug)]
pub struct RekordboxDocument {
    pub product: Product,
    pub index: TrackIndex,
    pub playlists: PlaylistNode,
}

/// What a collection export produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionSummary {
    pub tracks: usize,
    pub cue_markers: usize,
    pub grid_markers: usize,
    pub folders: usize,
    pub playlists: usize,
    pub playlist_entries: usize,
    pub skipped: SkippedTracks,
}

/// Convert a parsed collection
///
/// The index is complete before the playlist tree is converted.
pub fn build_document(
    source: &SourceCollection,
    config: &ExportConfig,
) -> Result<(RekordboxDocument, CollectionSummary)> {
    let root = source.playlists.as_ref().ok_or_else(|| Error::MissingElement {
        element: "NODE",
        context: "PLAYLISTS".into(),
    })?;

    let (index, skipped) = TrackIndex::build(&source.entries, config)?;
    info!("Indexed {} tracks ({} skipped)", index.len(), skipped.len());

    let playlists = rebuild_tree(root, &index, config)?;
    let tree = playlists.stats();

    let summary = CollectionSummary {
        tracks: index.len(),
        cue_markers: index.tracks().iter().map(|t| t.markers.cues.len()).sum(),
        grid_markers: index.tracks().iter().map(|t| t.markers.grid.len()).sum(),
        // The root folder is not part of the user's tree
        folders: tree.folders.saturating_sub(1),
        playlists: tree.playlists,
        playlist_entries: tree.entries,
        skipped,
    };

    let document = RekordboxDocument {
        product: config.product.clone(),
        index,
        playlists,
    };

    Ok((document, summary))
}

impl RekordboxDocument {
    pub fn write_to<W: Write>(&self, out: W) -> io::Result<()> {
        let mut xml = XmlWriter::new(out);
        xml.declaration()?;
        xml.start("DJ_PLAYLISTS", &[("Version", DOCUMENT_VERSION)])?;

        xml.empty(
            "PRODUCT",
            &[
                ("Name", self.product.name.as_str()),
                ("Version", self.product.version.as_str()),
                ("Company", self.product.company.as_str()),
            ],
        )?;

        let entries = self.index.len().to_string();
        xml.start("COLLECTION", &[("Entries", entries.as_str())])?;
        for track in self.index.tracks() {
            write_track(&mut xml, track)?;
        }
        xml.end("COLLECTION")?;

        xml.start("PLAYLISTS", &[])?;
        write_node(&mut xml, &self.playlists)?;
        xml.end("PLAYLISTS")?;

        xml.end("DJ_PLAYLISTS")?;
        xml.into_inner().flush()
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

fn write_track<W: Write>(xml: &mut XmlWriter<W>, track: &TargetTrack) -> io::Result<()> {
    let attrs = track.attributes();
    if track.markers.cues.is_empty() && track.markers.grid.is_empty() {
        return xml.empty("TRACK", &attrs);
    }

    xml.start("TRACK", &attrs)?;
    for marker in &track.markers.cues {
        write_cue_marker(xml, marker)?;
    }
    for grid in &track.markers.grid {
        write_grid_marker(xml, grid)?;
    }
    xml.end("TRACK")
}

fn write_cue_marker<W: Write>(xml: &mut XmlWriter<W>, marker: &CueMarker) -> io::Result<()> {
    let marker_type = marker.kind.marker_type().code().to_string();
    let start = format_seconds(marker.start);
    let end = marker.end().map(format_seconds);
    let num = marker.num.to_string();

    let mut attrs = vec![
        ("Name", marker.name.as_str()),
        ("Type", marker_type.as_str()),
        ("Start", start.as_str()),
    ];
    if let Some(end) = &end {
        attrs.push(("End", end.as_str()));
    }
    attrs.push(("Num", num.as_str()));

    xml.empty("POSITION_MARK", &attrs)
}

fn write_grid_marker<W: Write>(xml: &mut XmlWriter<W>, grid: &GridMarker) -> io::Result<()> {
    xml.empty(
        "TEMPO",
        &[
            ("Inizio", format_seconds(grid.start).as_str()),
            ("Bpm", format_bpm(grid.bpm).as_str()),
            ("Metro", GRID_METER),
            ("Battito", GRID_BEAT.to_string().as_str()),
        ],
    )
}

fn write_node<W: Write>(xml: &mut XmlWriter<W>, node: &PlaylistNode) -> io::Result<()> {
    let node_type = node.node_type().code().to_string();
    let count = node.count().to_string();

    match node {
        PlaylistNode::Folder { name, children } => {
            let attrs = [
                ("Type", node_type.as_str()),
                ("Name", name.as_str()),
                ("Count", count.as_str()),
            ];
            if children.is_empty() {
                return xml.empty("NODE", &attrs);
            }
            xml.start("NODE", &attrs)?;
            for child in children {
                write_node(xml, child)?;
            }
            xml.end("NODE")
        }
        PlaylistNode::Playlist { name, tracks } => {
            let key_type = KeyType::Location.code().to_string();
            let attrs = [
                ("Name", name.as_str()),
                ("Type", node_type.as_str()),
                ("KeyType", key_type.as_str()),
                ("Entries", count.as_str()),
            ];
            if tracks.is_empty() {
                return xml.empty("NODE", &attrs);
            }
            xml.start("NODE", &attrs)?;
            for key in tracks {
                xml.empty("TRACK", &[("Key", key.as_str())])?;
            }
            xml.end("NODE")
        }
    }
}

/// Convert an NML file into a rekordbox XML file
pub fn export_collection(input: &Path, output: &Path, config: &ExportConfig) -> Result<CollectionSummary> {
    info!("Reading collection {:?}", input);
    let xml = fs::read_to_string(input)?;
    let source = parse_collection(&xml)?;

    let (document, summary) = build_document(&source, config)?;
    write_atomic(output, &document.to_bytes()?)?;
    info!(
        "Wrote {:?}: {} tracks, {} playlists in {} folders",
        output, summary.tracks, summary.playlists, summary.folders
    );

    Ok(summary)
}
