//! Traktor NML source model
//!
//! Parses a `collection.nml` document into owned records:
//!
//! ```text
//! NML
//! ├── COLLECTION
//! │   └── ENTRY (TITLE, ARTIST)
//! │       ├── LOCATION (VOLUME, DIR, FILE)
//! │       ├── ALBUM (TITLE, TRACK)
//! │       ├── INFO (COMMENT, GENRE, IMPORT_DATE, ...)
//! │       ├── TEMPO (BPM)
//! │       └── CUE_V2 (NAME, TYPE, START, LEN, HOTCUE)*
//! └── PLAYLISTS
//!     └── NODE TYPE="FOLDER" NAME="$ROOT"
//!         └── SUBNODES
//!             └── NODE TYPE="FOLDER" | "PLAYLIST"
//!                 ├── SUBNODES/NODE*            (folders)
//!                 └── PLAYLIST/ENTRY/PRIMARYKEY (playlists)
//! ```

use roxmltree::{Document, Node};
use tracing::warn;

use crate::cue::SourceCueType;
use crate::error::{Error, Result};
use crate::path::TrackLocation;

/// Parsed NML document
#[derive(Debug, Clone, Default)]
pub struct SourceCollection {
    pub entries: Vec<SourceEntry>,
    /// `PLAYLISTS/NODE`, absent in collections without playlists section
    pub playlists: Option<SourceNode>,
}

/// One `COLLECTION/ENTRY`
#[derive(Debug, Clone, Default)]
pub struct SourceEntry {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub location: Option<TrackLocation>,
    pub album: Option<SourceAlbum>,
    pub info: Option<SourceInfo>,
    pub tempo: Option<SourceTempo>,
    pub cues: Vec<SourceCue>,
}

impl SourceEntry {
    /// Human readable identity for diagnostics
    pub fn display_name(&self) -> String {
        format!(
            "{} - {}",
            self.artist.as_deref().unwrap_or("?"),
            self.title.as_deref().unwrap_or("?")
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceAlbum {
    pub title: Option<String>,
    pub track: Option<String>,
}

/// `INFO` attributes, kept as raw strings except where a unit conversion follows
#[derive(Debug, Clone, Default)]
pub struct SourceInfo {
    pub comment: Option<String>,
    /// `YYYY/MM/DD`
    pub import_date: Option<String>,
    pub genre: Option<String>,
    pub label: Option<String>,
    pub play_count: Option<String>,
    pub ranking: Option<String>,
    pub remixer: Option<String>,
    /// Kilobytes
    pub file_size_kb: Option<u64>,
    pub key: Option<String>,
    /// Seconds
    pub play_time: Option<String>,
    /// `YYYY/MM/DD`, sometimes only `YYYY`
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceTempo {
    pub bpm: Option<f64>,
}

/// One `CUE_V2`
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCue {
    pub kind: SourceCueType,
    pub name: Option<String>,
    /// Milliseconds
    pub start: f64,
    /// Milliseconds, only meaningful for loops
    pub len: Option<f64>,
    /// Hot cue slot, -1 for memory cues
    pub hotcue: i32,
}

/// Node of the playlist tree
#[derive(Debug, Clone, PartialEq)]
pub enum SourceNode {
    Folder {
        name: String,
        children: Vec<SourceNode>,
    },
    Playlist {
        name: String,
        /// Natural keys of the referenced tracks, in playlist order
        keys: Vec<String>,
    },
}

impl SourceNode {
    pub fn name(&self) -> &str {
        match self {
            SourceNode::Folder { name, .. } | SourceNode::Playlist { name, .. } => name,
        }
    }
}

/// Node `TYPE` values in NML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceNodeType {
    Folder,
    Playlist,
}

impl SourceNodeType {
    pub fn from_nml(value: &str) -> Option<Self> {
        match value {
            "FOLDER" => Some(SourceNodeType::Folder),
            "PLAYLIST" => Some(SourceNodeType::Playlist),
            _ => None,
        }
    }
}

/// `PRIMARYKEY TYPE` value of playlist entries that reference collection tracks
const PRIMARY_KEY_TRACK: &str = "TRACK";

/// Parse an NML document
pub fn parse_collection(xml: &str) -> Result<SourceCollection> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let entries = match child(root, "COLLECTION") {
        Some(collection) => children(collection, "ENTRY")
            .enumerate()
            .map(|(index, entry)| parse_entry(entry, index))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let playlists = parse_playlist_root(root)?;

    Ok(SourceCollection { entries, playlists })
}

/// Parse only the playlist tree of an NML document
///
/// `COLLECTION` is not read, so malformed track entries do not matter here.
pub fn parse_playlists(xml: &str) -> Result<Option<SourceNode>> {
    let doc = Document::parse(xml)?;
    parse_playlist_root(doc.root_element())
}

fn parse_playlist_root(root: Node<'_, '_>) -> Result<Option<SourceNode>> {
    match child(root, "PLAYLISTS") {
        Some(playlists) => {
            let node = child(playlists, "NODE").ok_or_else(|| Error::MissingElement {
                element: "NODE",
                context: "PLAYLISTS".into(),
            })?;
            parse_node(node, "")
        }
        None => Ok(None),
    }
}

fn parse_entry(entry: Node<'_, '_>, index: usize) -> Result<SourceEntry> {
    let mut parsed = SourceEntry {
        title: attr(entry, "TITLE"),
        artist: attr(entry, "ARTIST"),
        ..Default::default()
    };
    let context = format!("ENTRY #{} ({})", index + 1, parsed.display_name());

    parsed.location = child(entry, "LOCATION").and_then(|loc| {
        Some(TrackLocation::new(
            loc.attribute("VOLUME")?,
            loc.attribute("DIR")?,
            loc.attribute("FILE")?,
        ))
    });

    parsed.album = child(entry, "ALBUM").map(|album| SourceAlbum {
        title: attr(album, "TITLE"),
        track: attr(album, "TRACK"),
    });

    parsed.info = child(entry, "INFO")
        .map(|info| -> Result<SourceInfo> {
            Ok(SourceInfo {
                comment: attr(info, "COMMENT"),
                import_date: attr(info, "IMPORT_DATE"),
                genre: attr(info, "GENRE"),
                label: attr(info, "LABEL"),
                play_count: attr(info, "PLAYCOUNT"),
                ranking: attr(info, "RANKING"),
                remixer: attr(info, "REMIXER"),
                file_size_kb: parse_attr(info, "INFO", "FILESIZE", &context)?,
                key: attr(info, "KEY"),
                play_time: attr(info, "PLAYTIME"),
                release_date: attr(info, "RELEASE_DATE"),
            })
        })
        .transpose()?;

    parsed.tempo = child(entry, "TEMPO")
        .map(|tempo| -> Result<SourceTempo> {
            Ok(SourceTempo {
                bpm: parse_attr(tempo, "TEMPO", "BPM", &context)?,
            })
        })
        .transpose()?;

    for cue in children(entry, "CUE_V2") {
        if let Some(cue) = parse_cue(cue, &context)? {
            parsed.cues.push(cue);
        }
    }

    Ok(parsed)
}

fn parse_cue(cue: Node<'_, '_>, context: &str) -> Result<Option<SourceCue>> {
    let code: u8 = require_attr(cue, "CUE_V2", "TYPE", context)?;
    let Some(kind) = SourceCueType::from_code(code) else {
        warn!("Skipping cue with unknown type {} in {}", code, context);
        return Ok(None);
    };

    let start = require_attr(cue, "CUE_V2", "START", context)?;
    let len = if kind == SourceCueType::Loop {
        Some(require_attr(cue, "CUE_V2", "LEN", context)?)
    } else {
        parse_attr(cue, "CUE_V2", "LEN", context)?
    };

    Ok(Some(SourceCue {
        kind,
        name: attr(cue, "NAME"),
        start,
        len,
        hotcue: parse_attr(cue, "CUE_V2", "HOTCUE", context)?.unwrap_or(-1),
    }))
}

/// Parse a playlist node; `None` for node types neither exporter handles
fn parse_node(node: Node<'_, '_>, parent_path: &str) -> Result<Option<SourceNode>> {
    let name = attr(node, "NAME").unwrap_or_default();
    let path = format!("{}/{}", parent_path, name);

    let raw_type = node.attribute("TYPE").ok_or_else(|| Error::MissingAttribute {
        element: "NODE",
        attribute: "TYPE",
        context: path.clone(),
    })?;

    let Some(node_type) = SourceNodeType::from_nml(raw_type) else {
        warn!("Skipping node {} with unsupported type {}", path, raw_type);
        return Ok(None);
    };

    match node_type {
        SourceNodeType::Folder => {
            let mut folder_children = Vec::new();
            if let Some(subnodes) = child(node, "SUBNODES") {
                for subnode in children(subnodes, "NODE") {
                    if let Some(parsed) = parse_node(subnode, &path)? {
                        folder_children.push(parsed);
                    }
                }
            }
            Ok(Some(SourceNode::Folder {
                name,
                children: folder_children,
            }))
        }
        SourceNodeType::Playlist => {
            let keys = child(node, "PLAYLIST")
                .into_iter()
                .flat_map(|playlist| children(playlist, "ENTRY"))
                .filter_map(|entry| child(entry, "PRIMARYKEY"))
                .filter(|key| key.attribute("TYPE") == Some(PRIMARY_KEY_TRACK))
                .filter_map(|key| key.attribute("KEY").map(str::to_owned))
                .collect();
            Ok(Some(SourceNode::Playlist { name, keys }))
        }
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(tag))
}

fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_owned)
}

fn parse_attr<T: std::str::FromStr>(
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
    context: &str,
) -> Result<Option<T>> {
    match node.attribute(attribute) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidAttribute {
                element,
                attribute,
                value: value.to_owned(),
                context: context.to_owned(),
            }),
    }
}

fn require_attr<T: std::str::FromStr>(
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
    context: &str,
) -> Result<T> {
    parse_attr(node, element, attribute, context)?.ok_or_else(|| Error::MissingAttribute {
        element,
        attribute,
        context: context.to_owned(),
    })
}
