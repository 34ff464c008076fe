//! rekordbox `TRACK` records derived from Traktor entries
//!
//! Each optional NML section maps to its own group of attributes. A missing
//! section drops the whole group; a present section with missing attributes
//! falls back to the defaults rekordbox expects ("0" for counters and numbers,
//! "" for text).

use chrono::NaiveDate;

use crate::config::ExportConfig;
use crate::cue::{derive_markers, format_bpm, Markers};
use crate::error::{Error, Result};
use crate::nml::{SourceAlbum, SourceEntry, SourceInfo};

/// Date format of `IMPORT_DATE` / `RELEASE_DATE`
const NML_DATE_FORMAT: &str = "%Y/%m/%d";

/// Date format of `DateAdded`
const REKORDBOX_DATE_FORMAT: &str = "%Y-%m-%d";

/// Complete target track
#[derive(Debug, Clone, PartialEq)]
pub struct TargetTrack {
    /// Natural key, `VOLUME + DIR + FILE` before normalization
    pub key: String,
    pub name: String,
    pub artist: String,
    /// `file://localhost/...`
    pub location: String,
    pub album: Option<AlbumFields>,
    pub info: Option<InfoFields>,
    /// `AverageBpm`, 2 decimals
    pub average_bpm: Option<String>,
    pub markers: Markers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumFields {
    pub album: String,
    pub track_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFields {
    pub comments: String,
    /// `YYYY-MM-DD`
    pub date_added: String,
    pub genre: String,
    pub label: String,
    pub play_count: String,
    pub rating: String,
    pub remixer: String,
    /// Bytes
    pub size: String,
    pub tonality: String,
    /// Seconds
    pub total_time: String,
    pub year: String,
}

impl TargetTrack {
    /// Attributes in rekordbox order, omitted sections left out
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attrs = vec![
            ("Name", self.name.as_str()),
            ("Artist", self.artist.as_str()),
            ("Location", self.location.as_str()),
        ];

        if let Some(album) = &self.album {
            attrs.push(("Album", album.album.as_str()));
            attrs.push(("TrackNumber", album.track_number.as_str()));
        }

        if let Some(info) = &self.info {
            attrs.extend([
                ("Comments", info.comments.as_str()),
                ("DateAdded", info.date_added.as_str()),
                ("Genre", info.genre.as_str()),
                ("Label", info.label.as_str()),
                ("PlayCount", info.play_count.as_str()),
                ("Rating", info.rating.as_str()),
                ("Remixer", info.remixer.as_str()),
                ("Size", info.size.as_str()),
                ("Tonality", info.tonality.as_str()),
                ("TotalTime", info.total_time.as_str()),
                ("Year", info.year.as_str()),
            ]);
        }

        if let Some(bpm) = &self.average_bpm {
            attrs.push(("AverageBpm", bpm.as_str()));
        }

        attrs
    }
}

/// Derive a track, including its markers
///
/// Fails with [`Error::MissingLocation`] when the entry has no usable
/// `LOCATION`, and with [`Error::InvalidAttribute`] on a malformed import date
/// or a file size that does not fit in bytes.
pub fn derive_track(entry: &SourceEntry, config: &ExportConfig) -> Result<TargetTrack> {
    let location = entry.location.as_ref().ok_or_else(|| Error::MissingLocation {
        track: entry.display_name(),
    })?;

    let bpm = entry.tempo.as_ref().map(|tempo| tempo.bpm.unwrap_or_default());

    Ok(TargetTrack {
        key: location.key(),
        name: entry.title.clone().unwrap_or_default(),
        artist: entry.artist.clone().unwrap_or_default(),
        location: location.uri(&config.mount_prefix),
        album: entry.album.as_ref().map(album_fields),
        info: entry
            .info
            .as_ref()
            .map(|info| info_fields(info, &entry.display_name(), config))
            .transpose()?,
        average_bpm: bpm.map(format_bpm),
        markers: derive_markers(&entry.cues, bpm.unwrap_or_default(), config),
    })
}

fn album_fields(album: &SourceAlbum) -> AlbumFields {
    AlbumFields {
        album: album.title.clone().unwrap_or_default(),
        track_number: or_zero(&album.track),
    }
}

fn info_fields(info: &SourceInfo, track: &str, config: &ExportConfig) -> Result<InfoFields> {
    let date_added = match &info.import_date {
        Some(raw) => parse_nml_date(raw).ok_or_else(|| Error::InvalidAttribute {
            element: "INFO",
            attribute: "IMPORT_DATE",
            value: raw.clone(),
            context: track.to_owned(),
        })?,
        None => config.export_date,
    };

    let size = info
        .file_size_kb
        .unwrap_or_default()
        .checked_mul(1024)
        .ok_or_else(|| Error::InvalidAttribute {
            element: "INFO",
            attribute: "FILESIZE",
            value: info.file_size_kb.unwrap_or_default().to_string(),
            context: track.to_owned(),
        })?;

    Ok(InfoFields {
        comments: info.comment.clone().unwrap_or_default(),
        date_added: date_added.format(REKORDBOX_DATE_FORMAT).to_string(),
        genre: info.genre.clone().unwrap_or_default(),
        label: info.label.clone().unwrap_or_default(),
        play_count: or_zero(&info.play_count),
        rating: or_zero(&info.ranking),
        remixer: info.remixer.clone().unwrap_or_default(),
        size: size.to_string(),
        tonality: info.key.clone().unwrap_or_default(),
        total_time: or_zero(&info.play_time),
        year: release_year(info.release_date.as_deref()),
    })
}

fn or_zero(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "0".into())
}

fn parse_nml_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), NML_DATE_FORMAT).ok()
}

/// Part of `RELEASE_DATE` before the first `/`
fn release_year(release_date: Option<&str>) -> String {
    let raw = release_date.unwrap_or("0");
    raw.split('/').next().unwrap_or(raw).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::SourceCueType;
    use crate::nml::{SourceCue, SourceTempo};
    use crate::path::TrackLocation;

    fn config() -> ExportConfig {
        ExportConfig {
            export_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            ..Default::default()
        }
    }

    fn entry() -> SourceEntry {
        SourceEntry {
            title: Some("Strings".into()),
            artist: Some("Lane 8".into()),
            location: Some(TrackLocation::new("Macintosh HD", "/:Music/:", "Strings.mp3")),
            ..Default::default()
        }
    }

    #[test]
    fn test_bare_entry() {
        let track = derive_track(&entry(), &config()).unwrap();
        assert_eq!(track.key, "Macintosh HD/:Music/:Strings.mp3");
        assert_eq!(
            track.location,
            "file://localhost/Volumes/Macintosh%20HD/Music/Strings.mp3"
        );

        // Absent sections are omitted, not zero-filled
        let names: Vec<_> = track.attributes().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["Name", "Artist", "Location"]);
        assert!(track.markers.cues.is_empty());
        assert!(track.markers.grid.is_empty());
    }

    #[test]
    fn test_missing_location() {
        let mut source = entry();
        source.location = None;
        let err = derive_track(&source, &config()).unwrap_err();
        assert!(matches!(err, Error::MissingLocation { track } if track == "Lane 8 - Strings"));
    }

    #[test]
    fn test_info_defaults() {
        let mut source = entry();
        source.album = Some(SourceAlbum::default());
        source.info = Some(SourceInfo::default());

        let track = derive_track(&source, &config()).unwrap();
        let album = track.album.unwrap();
        assert_eq!(album.album, "");
        assert_eq!(album.track_number, "0");

        let info = track.info.unwrap();
        assert_eq!(info.play_count, "0");
        assert_eq!(info.rating, "0");
        assert_eq!(info.total_time, "0");
        assert_eq!(info.year, "0");
        assert_eq!(info.size, "0");
        assert_eq!(info.date_added, "2024-03-09");
    }

    #[test]
    fn test_info_conversion() {
        let mut source = entry();
        source.info = Some(SourceInfo {
            import_date: Some("2019/4/12".into()),
            release_date: Some("2020/1/10".into()),
            file_size_kb: Some(8712),
            ranking: Some("153".into()),
            play_time: Some("372".into()),
            key: Some("8A".into()),
            ..Default::default()
        });

        let info = derive_track(&source, &config()).unwrap().info.unwrap();
        assert_eq!(info.date_added, "2019-04-12");
        assert_eq!(info.year, "2020");
        assert_eq!(info.size, "8921088");
        assert_eq!(info.rating, "153");
        assert_eq!(info.total_time, "372");
        assert_eq!(info.tonality, "8A");
    }

    #[test]
    fn test_year_only_release_date() {
        assert_eq!(release_year(Some("1999")), "1999");
        assert_eq!(release_year(None), "0");
    }

    #[test]
    fn test_invalid_import_date() {
        let mut source = entry();
        source.info = Some(SourceInfo {
            import_date: Some("12-04-2019".into()),
            ..Default::default()
        });
        let err = derive_track(&source, &config()).unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { attribute: "IMPORT_DATE", .. }));
    }

    #[test]
    fn test_oversized_file_size() {
        let mut source = entry();
        source.info = Some(SourceInfo {
            file_size_kb: Some(18_014_398_509_481_984),
            ..Default::default()
        });
        let err = derive_track(&source, &config()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidAttribute { attribute: "FILESIZE", value, .. } if value == "18014398509481984"
        ));

        source.info = Some(SourceInfo {
            file_size_kb: Some(u64::MAX / 1024),
            ..Default::default()
        });
        let info = derive_track(&source, &config()).unwrap().info.unwrap();
        assert_eq!(info.size, ((u64::MAX / 1024) * 1024).to_string());
    }

    #[test]
    fn test_bpm_and_grid() {
        let mut source = entry();
        source.tempo = Some(SourceTempo { bpm: Some(128.0) });
        source.cues = vec![SourceCue {
            kind: SourceCueType::Grid,
            name: Some("AutoGrid".into()),
            start: 250.0,
            len: None,
            hotcue: -1,
        }];

        let track = derive_track(&source, &config()).unwrap();
        assert_eq!(track.average_bpm.as_deref(), Some("128.00"));
        assert_eq!(track.markers.grid.len(), 1);
        assert_eq!(track.markers.grid[0].bpm, 128.0);
        assert!(track.markers.cues.is_empty());
    }

    #[test]
    fn test_grid_without_tempo_uses_zero_bpm() {
        let mut source = entry();
        source.cues = vec![SourceCue {
            kind: SourceCueType::Grid,
            name: None,
            start: 0.0,
            len: None,
            hotcue: -1,
        }];

        let track = derive_track(&source, &config()).unwrap();
        assert_eq!(track.average_bpm, None);
        assert_eq!(track.markers.grid[0].bpm, 0.0);
    }
}
