//! Cue point and beat grid conversion
//!
//! Traktor keeps cues, loops and grid anchors in one `CUE_V2` list. rekordbox
//! splits them into `POSITION_MARK` (cues and loops) and `TEMPO` (grid) elements,
//! and numbers the cue types differently:
//!
//! | Concept  | Traktor `TYPE` | rekordbox `Type` |
//! |----------|----------------|------------------|
//! | Cue      | 0              | 0                |
//! | Fade-in  | 1              | 1                |
//! | Fade-out | 2              | 2                |
//! | Load     | 3              | 3                |
//! | Grid     | 4              | (`TEMPO`)        |
//! | Loop     | 5              | 4                |
//!
//! rekordbox shows hot cues and memory cues separately, so every hot cue is
//! exported twice: once on its slot and once as a memory cue (`Num="-1"`).

use crate::config::ExportConfig;
use crate::nml::SourceCue;

/// Hot cue slot of a memory cue
pub const MEMORY_CUE: i32 = -1;

/// Grid markers are exported as 4/4 with the anchor on the first beat
pub const GRID_METER: &str = "4/4";
pub const GRID_BEAT: u8 = 1;

/// Traktor `CUE_V2 TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SourceCueType {
    Cue = 0,
    FadeIn = 1,
    FadeOut = 2,
    Load = 3,
    Grid = 4,
    Loop = 5,
}

impl SourceCueType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SourceCueType::Cue),
            1 => Some(SourceCueType::FadeIn),
            2 => Some(SourceCueType::FadeOut),
            3 => Some(SourceCueType::Load),
            4 => Some(SourceCueType::Grid),
            5 => Some(SourceCueType::Loop),
            _ => None,
        }
    }
}

/// rekordbox `POSITION_MARK Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MarkerType {
    Cue = 0,
    FadeIn = 1,
    FadeOut = 2,
    Load = 3,
    Loop = 4,
}

impl MarkerType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Marker variant; only loops carry an end position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    Cue,
    FadeIn,
    FadeOut,
    Load,
    /// End in seconds
    Loop { end: f64 },
}

impl MarkerKind {
    /// Marker for a source cue; grid anchors have none
    pub fn from_source(cue: &SourceCue) -> Option<Self> {
        match cue.kind {
            SourceCueType::Cue => Some(MarkerKind::Cue),
            SourceCueType::FadeIn => Some(MarkerKind::FadeIn),
            SourceCueType::FadeOut => Some(MarkerKind::FadeOut),
            SourceCueType::Load => Some(MarkerKind::Load),
            SourceCueType::Grid => None,
            SourceCueType::Loop => Some(MarkerKind::Loop {
                end: (cue.start + cue.len.unwrap_or_default()) / 1000.0,
            }),
        }
    }

    pub fn marker_type(&self) -> MarkerType {
        match self {
            MarkerKind::Cue => MarkerType::Cue,
            MarkerKind::FadeIn => MarkerType::FadeIn,
            MarkerKind::FadeOut => MarkerType::FadeOut,
            MarkerKind::Load => MarkerType::Load,
            MarkerKind::Loop { .. } => MarkerType::Loop,
        }
    }
}

/// `POSITION_MARK`
#[derive(Debug, Clone, PartialEq)]
pub struct CueMarker {
    /// Hot cue slot, [`MEMORY_CUE`] for memory cues
    pub num: i32,
    pub kind: MarkerKind,
    pub name: String,
    /// Seconds
    pub start: f64,
}

impl CueMarker {
    pub fn is_hot_cue(&self) -> bool {
        self.num != MEMORY_CUE
    }

    /// Same marker, unbound from its hot cue slot
    pub fn to_memory_cue(&self) -> Self {
        Self {
            num: MEMORY_CUE,
            ..self.clone()
        }
    }

    pub fn end(&self) -> Option<f64> {
        match self.kind {
            MarkerKind::Loop { end } => Some(end),
            _ => None,
        }
    }
}

/// `TEMPO`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMarker {
    /// Seconds
    pub start: f64,
    pub bpm: f64,
}

/// Markers derived from one track's cue list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markers {
    pub cues: Vec<CueMarker>,
    pub grid: Vec<GridMarker>,
}

/// Render seconds with millisecond precision
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

pub fn format_bpm(bpm: f64) -> String {
    format!("{:.2}", bpm)
}

/// Convert a track's `CUE_V2` list
///
/// Output keeps source order; each hot cue is directly followed by its memory
/// cue copy.
pub fn derive_markers(cues: &[SourceCue], bpm: f64, config: &ExportConfig) -> Markers {
    let mut markers = Markers::default();

    for cue in cues {
        let kind = match MarkerKind::from_source(cue) {
            Some(kind) => kind,
            None => {
                markers.grid.push(GridMarker {
                    start: cue.start / 1000.0,
                    bpm,
                });

                // A grid anchor on a hot cue slot is also a regular cue
                if cue.hotcue == MEMORY_CUE {
                    continue;
                }
                MarkerKind::Cue
            }
        };
        let marker = cue_marker(cue, kind, config);

        let memory_copy = marker.is_hot_cue().then(|| marker.to_memory_cue());
        markers.cues.push(marker);
        markers.cues.extend(memory_copy);
    }

    markers
}

fn cue_marker(cue: &SourceCue, kind: MarkerKind, config: &ExportConfig) -> CueMarker {
    let name = match cue.name.as_deref() {
        Some(name) if !config.is_placeholder_cue_name(name) => name.to_owned(),
        _ => String::new(),
    };

    CueMarker {
        num: cue.hotcue,
        kind,
        name,
        start: cue.start / 1000.0,
    }
}
