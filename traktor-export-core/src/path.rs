//! Track location normalization
//!
//! Traktor stores a location as three attributes on `<LOCATION>`:
//! `VOLUME="Macintosh HD" DIR="/:Users/:dj/:Music/:" FILE="Track.mp3"`.
//! Directory components are separated by `/:` instead of `/`.
//!
//! Absolute paths are recognized with a drive-letter heuristic: if the second
//! character is `:` (`C:/...`) the path is taken as is, otherwise the mount
//! prefix is prepended (`/Volumes/Macintosh HD/...`). A volume whose second
//! character happens to be `:` is misclassified as a drive letter.

use std::path::MAIN_SEPARATOR;

/// Directory separator used inside NML locations
pub const SOURCE_SEPARATOR: &str = "/:";

/// Scheme and host of rekordbox `Location` URIs
pub const URI_PREFIX: &str = "file://localhost/";

/// Raw location of a collection entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLocation {
    pub volume: String,
    pub dir: String,
    pub file: String,
}

impl TrackLocation {
    pub fn new(volume: impl Into<String>, dir: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            volume: volume.into(),
            dir: dir.into(),
            file: file.into(),
        }
    }

    /// Natural key: the unnormalized concatenation playlists refer to
    pub fn key(&self) -> String {
        format!("{}{}{}", self.volume, self.dir, self.file)
    }

    /// Absolute path using the platform separator
    pub fn native_path(&self, mount_prefix: &str) -> String {
        local_path(&self.key(), MAIN_SEPARATOR, mount_prefix)
    }

    /// `file://localhost/` URI with every path segment percent-encoded
    pub fn uri(&self, mount_prefix: &str) -> String {
        location_uri(&self.key(), mount_prefix)
    }
}

/// True when the second character is a drive colon (`C:`)
///
/// Paths shorter than two characters never match.
pub fn has_drive_letter(path: &str) -> bool {
    path.chars().nth(1) == Some(':')
}

/// Turn a raw key into an absolute path joined with `separator`
pub fn local_path(key: &str, separator: char, mount_prefix: &str) -> String {
    let sep = separator.to_string();
    let path = key.replace(SOURCE_SEPARATOR, &sep);

    if has_drive_letter(&path) {
        path
    } else {
        format!("{sep}{mount_prefix}{sep}{path}")
    }
}

/// Turn a raw key into a rekordbox `Location` URI
pub fn location_uri(key: &str, mount_prefix: &str) -> String {
    let path = key.replace(SOURCE_SEPARATOR, "/");
    let path = if has_drive_letter(&path) {
        path
    } else {
        format!("{mount_prefix}/{path}")
    };

    let segments: Vec<_> = path.split('/').map(urlencoding::encode).collect();
    format!("{}{}", URI_PREFIX, segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_letter_path() {
        let loc = TrackLocation::new("C:", "/:Music/:Artist/:", "Track.mp3");
        assert_eq!(loc.key(), "C:/:Music/:Artist/:Track.mp3");
        assert_eq!(local_path(&loc.key(), '/', "Volumes"), "C:/Music/Artist/Track.mp3");
    }

    #[test]
    fn test_mount_point_path() {
        let loc = TrackLocation::new("Macintosh HD", "/:Users/:dj/:Music/:", "Track.mp3");
        assert_eq!(
            local_path(&loc.key(), '/', "Volumes"),
            "/Volumes/Macintosh HD/Users/dj/Music/Track.mp3"
        );
    }

    #[test]
    fn test_native_separator() {
        let loc = TrackLocation::new("Data", "/:Sets/:", "a.mp3");
        let expected = format!("{0}Volumes{0}Data{0}Sets{0}a.mp3", MAIN_SEPARATOR);
        assert_eq!(loc.native_path("Volumes"), expected);
    }

    #[test]
    fn test_uri_mount_point() {
        let loc = TrackLocation::new("Macintosh HD", "/:Users/:dj/:Music/:", "Track 01.mp3");
        assert_eq!(
            loc.uri("Volumes"),
            "file://localhost/Volumes/Macintosh%20HD/Users/dj/Music/Track%2001.mp3"
        );
    }

    #[test]
    fn test_uri_drive_letter() {
        let loc = TrackLocation::new("C:", "/:Music/:", "Track.mp3");
        assert_eq!(loc.uri("Volumes"), "file://localhost/C%3A/Music/Track.mp3");
    }

    #[test]
    fn test_uri_reserved_and_unicode() {
        let loc = TrackLocation::new("HD", "/:Björk/:", "A&B #1 (Mix).mp3");
        assert_eq!(
            loc.uri("Volumes"),
            "file://localhost/Volumes/HD/Bj%C3%B6rk/A%26B%20%231%20%28Mix%29.mp3"
        );
    }

    #[test]
    fn test_unreserved_characters_stay_literal() {
        let uri = location_uri("HD/:a-b_c.d~e.mp3", "Volumes");
        assert_eq!(uri, "file://localhost/Volumes/HD/a-b_c.d~e.mp3");
    }

    // Known limitation: a volume whose second character is ':' is taken for a
    // drive letter and never gets the mount prefix.
    #[test]
    fn test_drive_letter_heuristic_misclassifies_colon_volume() {
        let loc = TrackLocation::new("A:B Drive", "/:Music/:", "Track.mp3");
        assert!(has_drive_letter(&loc.key()));
        assert_eq!(local_path(&loc.key(), '/', "Volumes"), "A:B Drive/Music/Track.mp3");
        assert_eq!(loc.uri("Volumes"), "file://localhost/A%3AB%20Drive/Music/Track.mp3");
    }

    #[test]
    fn test_short_path_has_no_drive_letter() {
        assert!(!has_drive_letter(""));
        assert!(!has_drive_letter("C"));
        assert_eq!(local_path("C", '/', "Volumes"), "/Volumes/C");
    }
}
