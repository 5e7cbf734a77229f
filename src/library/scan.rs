use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::player::PlayerError;

use super::song::Song;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };

    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .any(|e| {
            if settings.case_sensitive_extensions {
                e == ext
            } else {
                e.eq_ignore_ascii_case(ext)
            }
        })
}

/// List the audio files directly inside `dir` as songs.
///
/// Only the top level is scanned and entries keep directory-listing order.
/// An unreadable `dir` is an error; unreadable entries below it are skipped.
pub fn scan_folder(dir: &Path, settings: &LibrarySettings) -> Result<Vec<Song>, PlayerError> {
    let mut songs = Vec::new();

    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => return Err(PlayerError::Scan(e)),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let song = if settings.read_tags {
            Song::from_tags(path)?
        } else {
            Song::new(path)?
        };
        songs.push(song);
    }

    debug!(dir = %dir.display(), found = songs.len(), "scanned folder");
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_is_case_sensitive_by_default() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn is_audio_file_can_ignore_case_and_leading_dots() {
        let settings = LibrarySettings {
            extensions: vec![".mp3".into(), "ogg".into()],
            case_sensitive_extensions: false,
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.Ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
    }

    #[test]
    fn scan_folder_keeps_only_top_level_audio_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one.mp3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("two.MP3"), b"wrong case").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();
        fs::create_dir(dir.path().join("folder.mp3")).unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.mp3"), b"too deep").unwrap();

        let songs = scan_folder(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name(), "one");
        assert_eq!(songs[0].file_name(), "one.mp3");
        assert_eq!(songs[0].artist(), "Unknown");
    }

    #[test]
    fn scan_folder_follows_directory_listing_order() {
        let dir = tempdir().unwrap();
        for name in ["c.mp3", "a.mp3", "b.mp3"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let listed: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        let songs = scan_folder(dir.path(), &LibrarySettings::default()).unwrap();
        let scanned: Vec<String> = songs.iter().map(|s| s.file_name().to_string()).collect();
        assert_eq!(scanned, listed);
    }

    #[test]
    fn scan_folder_reports_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan_folder(&missing, &LibrarySettings::default()).unwrap_err();
        assert!(matches!(err, PlayerError::Scan(_)));
    }

    #[cfg(unix)]
    #[test]
    fn scan_folder_keeps_files_with_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"caf\xe9.mp3"));
        fs::write(&odd, b"x").unwrap();
        fs::write(dir.path().join("good.mp3"), b"x").unwrap();

        let songs = scan_folder(dir.path(), &LibrarySettings::default()).unwrap();
        assert_eq!(songs.len(), 2);

        let odd_song = songs.iter().find(|s| s.path() == odd).unwrap();
        assert_eq!(odd_song.name(), "caf\u{fffd}");
        assert_eq!(odd_song.file_name(), "caf\u{fffd}.mp3");
    }

    #[test]
    fn scan_folder_with_tags_falls_back_to_file_stem() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("untagged.mp3"), b"garbage").unwrap();

        let settings = LibrarySettings {
            read_tags: true,
            ..LibrarySettings::default()
        };
        let songs = scan_folder(dir.path(), &settings).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name(), "untagged");
        assert_eq!(songs[0].artist(), "Unknown");
    }
}
