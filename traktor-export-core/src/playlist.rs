//! Playlist tree conversion
//!
//! Rebuilds the NML folder/playlist tree as rekordbox `NODE` elements. Playlist
//! entries are resolved through the [`TrackIndex`] and referenced by their
//! `Location` URI (`KeyType="1"`).

use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::index::TrackIndex;
use crate::nml::SourceNode;

/// rekordbox `NODE Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    Folder = 0,
    Playlist = 1,
}

impl NodeType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// rekordbox `NODE KeyType`: how `TRACK Key` refers to the collection
///
/// Only location keys are written; `0` (track id) is never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyType {
    Location = 1,
}

impl KeyType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Converted playlist tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistNode {
    Folder {
        name: String,
        children: Vec<PlaylistNode>,
    },
    Playlist {
        name: String,
        /// `Location` URIs of the referenced tracks
        tracks: Vec<String>,
    },
}

impl PlaylistNode {
    pub fn name(&self) -> &str {
        match self {
            PlaylistNode::Folder { name, .. } | PlaylistNode::Playlist { name, .. } => name,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            PlaylistNode::Folder { .. } => NodeType::Folder,
            PlaylistNode::Playlist { .. } => NodeType::Playlist,
        }
    }

    /// `Count` of a folder (immediate children) or `Entries` of a playlist
    pub fn count(&self) -> usize {
        match self {
            PlaylistNode::Folder { children, .. } => children.len(),
            PlaylistNode::Playlist { tracks, .. } => tracks.len(),
        }
    }

    /// Folder, playlist and entry totals below and including this node
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.collect_stats(&mut stats);
        stats
    }

    fn collect_stats(&self, stats: &mut TreeStats) {
        match self {
            PlaylistNode::Folder { children, .. } => {
                stats.folders += 1;
                for child in children {
                    child.collect_stats(stats);
                }
            }
            PlaylistNode::Playlist { tracks, .. } => {
                stats.playlists += 1;
                stats.entries += tracks.len();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub folders: usize,
    pub playlists: usize,
    pub entries: usize,
}

/// Convert the NML root node
///
/// The root is always emitted as a folder named `config.root_name`. Fails with
/// [`Error::UnknownTrack`] on the first entry missing from `index`.
pub fn rebuild_tree(root: &SourceNode, index: &TrackIndex, config: &ExportConfig) -> Result<PlaylistNode> {
    let children = match root {
        SourceNode::Folder { children, .. } => convert_children(children, "", index, config)?,
        SourceNode::Playlist { name, .. } => {
            warn!("Playlist root {:?} has no subnodes, exporting empty root", name);
            Vec::new()
        }
    };

    Ok(PlaylistNode::Folder {
        name: config.root_name.clone(),
        children,
    })
}

fn convert_children(
    children: &[SourceNode],
    parent_path: &str,
    index: &TrackIndex,
    config: &ExportConfig,
) -> Result<Vec<PlaylistNode>> {
    let mut converted = Vec::with_capacity(children.len());

    for child in children {
        let path = format!("{}/{}", parent_path, child.name());

        match child {
            SourceNode::Folder { name, children } => {
                converted.push(PlaylistNode::Folder {
                    name: name.clone(),
                    children: convert_children(children, &path, index, config)?,
                });
            }
            SourceNode::Playlist { name, .. } if config.is_excluded_playlist(name) => {
                debug!("Skipping excluded playlist {}", path);
            }
            SourceNode::Playlist { name, keys } => {
                let tracks = keys
                    .iter()
                    .map(|key| {
                        index
                            .get(key)
                            .map(|track| track.location.clone())
                            .ok_or_else(|| Error::UnknownTrack {
                                playlist: path.clone(),
                                key: key.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;

                debug!("Converted playlist {} ({} entries)", path, tracks.len());
                converted.push(PlaylistNode::Playlist {
                    name: name.clone(),
                    tracks,
                });
            }
        }
    }

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nml::SourceEntry;
    use crate::path::TrackLocation;

    const KEY_A: &str = "HD/:Music/:a.mp3";
    const KEY_B: &str = "HD/:Music/:b.mp3";

    fn index() -> TrackIndex {
        let entries: Vec<_> = ["a.mp3", "b.mp3"]
            .iter()
            .map(|file| SourceEntry {
                location: Some(TrackLocation::new("HD", "/:Music/:", *file)),
                ..Default::default()
            })
            .collect();
        TrackIndex::build(&entries, &ExportConfig::default()).unwrap().0
    }

    fn folder(name: &str, children: Vec<SourceNode>) -> SourceNode {
        SourceNode::Folder {
            name: name.into(),
            children,
        }
    }

    fn playlist(name: &str, keys: &[&str]) -> SourceNode {
        SourceNode::Playlist {
            name: name.into(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_root_renamed() {
        let root = folder("$ROOT", vec![]);
        let tree = rebuild_tree(&root, &index(), &ExportConfig::default()).unwrap();
        assert_eq!(tree.name(), "ROOT");
        assert_eq!(tree.node_type(), NodeType::Folder);
        assert_eq!(tree.count(), 0);
    }

    #[test]
    fn test_playlist_resolves_uris() {
        let root = folder("$ROOT", vec![playlist("Warmup", &[KEY_B, KEY_A, KEY_B])]);
        let tree = rebuild_tree(&root, &index(), &ExportConfig::default()).unwrap();

        let PlaylistNode::Folder { children, .. } = &tree else {
            panic!("root must be a folder");
        };
        assert_eq!(
            children[0],
            PlaylistNode::Playlist {
                name: "Warmup".into(),
                tracks: vec![
                    "file://localhost/Volumes/HD/Music/b.mp3".into(),
                    "file://localhost/Volumes/HD/Music/a.mp3".into(),
                    "file://localhost/Volumes/HD/Music/b.mp3".into(),
                ],
            }
        );
        assert_eq!(children[0].count(), 3);
    }

    #[test]
    fn test_folder_count_excludes_filtered_playlist() {
        let root = folder(
            "$ROOT",
            vec![folder(
                "Sets",
                vec![
                    playlist("Friday", &[KEY_A]),
                    playlist("_RECORDINGS", &[KEY_B]),
                    folder("Empty", vec![]),
                ],
            )],
        );
        let tree = rebuild_tree(&root, &index(), &ExportConfig::default()).unwrap();

        let PlaylistNode::Folder { children, .. } = &tree else {
            panic!("root must be a folder");
        };
        assert_eq!(tree.count(), 1);
        assert_eq!(children[0].count(), 2);
        assert!(matches!(&children[0], PlaylistNode::Folder { children, .. }
            if children.iter().all(|c| c.name() != "_RECORDINGS")));
    }

    #[test]
    fn test_filtered_at_any_depth() {
        let root = folder(
            "$ROOT",
            vec![
                playlist("_LOOPS", &[]),
                folder("A", vec![folder("B", vec![playlist("_LOOPS", &[KEY_A])])]),
            ],
        );
        let tree = rebuild_tree(&root, &index(), &ExportConfig::default()).unwrap();
        let stats = tree.stats();

        assert_eq!(tree.count(), 1);
        assert_eq!(stats.playlists, 0);
        assert_eq!(stats.folders, 3);
    }

    #[test]
    fn test_unknown_key_names_playlist() {
        let root = folder(
            "$ROOT",
            vec![folder("Sets", vec![playlist("Friday", &[KEY_A, "HD/:gone.mp3"])])],
        );
        let err = rebuild_tree(&root, &index(), &ExportConfig::default()).unwrap_err();

        match err {
            Error::UnknownTrack { playlist, key } => {
                assert_eq!(playlist, "/Sets/Friday");
                assert_eq!(key, "HD/:gone.mp3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stats() {
        let root = folder(
            "$ROOT",
            vec![playlist("One", &[KEY_A, KEY_B]), folder("F", vec![playlist("Two", &[KEY_A])])],
        );
        let stats = rebuild_tree(&root, &index(), &ExportConfig::default()).unwrap().stats();
        assert_eq!(
            stats,
            TreeStats {
                folders: 2,
                playlists: 2,
                entries: 3
            }
        );
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(NodeType::Folder.code(), 0);
        assert_eq!(NodeType::Playlist.code(), 1);
        assert_eq!(KeyType::Location.code(), 1);
    }
}
