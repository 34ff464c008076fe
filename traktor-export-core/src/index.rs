//! Natural key → track lookup
//!
//! Built once from the collection before any playlist is converted. Keeps
//! collection order for serialization.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::nml::SourceEntry;
use crate::track::{derive_track, TargetTrack};

#[derive(Debug, Default)]
pub struct TrackIndex {
    tracks: Vec<TargetTrack>,
    by_key: HashMap<String, usize>,
}

/// Entries that did not make it into the index
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkippedTracks {
    /// Entries without location
    pub missing_location: Vec<String>,
    /// Later entries sharing an earlier entry's natural key
    pub duplicate_keys: Vec<String>,
}

impl SkippedTracks {
    pub fn len(&self) -> usize {
        self.missing_location.len() + self.duplicate_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrackIndex {
    /// Derive every entry and index it by natural key
    ///
    /// Entries without location are skipped unless `config.strict` is set. The
    /// first entry for a key wins.
    pub fn build(entries: &[SourceEntry], config: &ExportConfig) -> Result<(Self, SkippedTracks)> {
        let mut index = Self::default();
        let mut skipped = SkippedTracks::default();

        for entry in entries {
            let track = match derive_track(entry, config) {
                Ok(track) => track,
                Err(Error::MissingLocation { track }) if !config.strict => {
                    warn!("Skipping track without location: {}", track);
                    skipped.missing_location.push(track);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let (cues, grid) = (track.markers.cues.len(), track.markers.grid.len());
            if let Some(duplicate) = index.insert(track) {
                warn!("Skipping duplicate collection entry: {}", duplicate.key);
                skipped.duplicate_keys.push(duplicate.key);
                continue;
            }
            debug!("Indexed track {} ({} cue markers, {} grid markers)", index.len(), cues, grid);
        }

        Ok((index, skipped))
    }

    /// Add a track; a track whose key is already indexed is handed back
    pub fn insert(&mut self, track: TargetTrack) -> Option<TargetTrack> {
        if self.by_key.contains_key(&track.key) {
            return Some(track);
        }
        self.by_key.insert(track.key.clone(), self.tracks.len());
        self.tracks.push(track);
        None
    }

    pub fn get(&self, key: &str) -> Option<&TargetTrack> {
        self.by_key.get(key).map(|&pos| &self.tracks[pos])
    }

    /// Tracks in collection order
    pub fn tracks(&self) -> &[TargetTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
