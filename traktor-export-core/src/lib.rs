//! traktor-export-core: Traktor collection conversion
//!
//! This crate converts a Traktor `collection.nml` into:
//! - a rekordbox collection XML (tracks, cues, beat grids, playlist tree)
//! - a directory tree of M3U playlists
//!
//! Both exporters are single pass: parse, convert in memory, write.

pub mod config;
pub mod cue;
pub mod document;
pub mod error;
pub mod index;
pub mod m3u;
pub mod nml;
pub mod output;
pub mod path;
pub mod playlist;
pub mod track;
pub mod xml;

pub use config::{ExportConfig, Product};
pub use document::{build_document, export_collection, CollectionSummary, RekordboxDocument};
pub use error::{Error, Result};
pub use index::TrackIndex;
pub use m3u::{export_playlists, PlaylistExportSummary};
pub use nml::{parse_collection, parse_playlists, SourceCollection};
