//! Local library scanning and artist identity normalization.
//!
//! The library root is expected to contain one folder per artist, each
//! holding release folders and loose files. Folder names frequently encode
//! collaborations or qualifiers ("Artist & Other", "Artist, Someone",
//! "Artist (Remastered)"), so every folder is reduced to a canonical
//! `artist_key` and folders sharing a key are grouped as aliases of the
//! same artist.

pub mod index;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Canonical artist key for a raw folder name.
///
/// Splits on the first `&`, then the first `", "`, then the first `" ("`,
/// keeping the leading segment each time, then trims and lowercases. This
/// collapses collaboration and qualifier variants down to the primary
/// artist. Total: always yields a string, possibly empty.
pub fn artist_key(raw_folder_name: &str) -> String {
    let mut key = raw_folder_name;
    for separator in ["&", ", ", " ("] {
        key = key.split(separator).next().unwrap_or("");
    }
    key.trim().to_lowercase()
}

/// One immediate subdirectory of the library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistFolder {
    pub path: PathBuf,
    pub raw_name: String,
    pub artist_key: String,
}

/// All folders whose names normalize to the same artist key.
///
/// The one-to-many relation is explicit so that pooling files across aliased
/// folders is a visible step rather than an accident of iteration order.
#[derive(Debug, Clone)]
pub struct ArtistGroup {
    pub artist_key: String,
    pub folders: Vec<ArtistFolder>,
}

impl ArtistGroup {
    /// The first-scanned folder; new release folders are created under it.
    pub fn primary(&self) -> &ArtistFolder {
        &self.folders[0]
    }

    /// Entry names of every folder in the group, concatenated.
    ///
    /// Both files and release subfolders count as local content, so no type
    /// filtering is applied.
    pub fn pooled_entries(&self) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        for folder in &self.folders {
            let dir = std::fs::read_dir(&folder.path)
                .with_context(|| format!("Failed to read artist folder: {:?}", folder.path))?;
            for entry in dir {
                let entry = entry
                    .with_context(|| format!("Failed to read entry in {:?}", folder.path))?;
                entries.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(entries)
    }
}

/// Scan the library root for artist folders (immediate subdirectories only).
pub fn scan_artist_folders(root: &Path) -> Result<Vec<ArtistFolder>> {
    let dir = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read library root: {:?}", root))?;

    let mut folders = Vec::new();
    for entry in dir {
        let entry = entry.with_context(|| format!("Failed to read entry in {:?}", root))?;
        if !entry.path().is_dir() {
            continue;
        }
        let raw_name = entry.file_name().to_string_lossy().into_owned();
        folders.push(ArtistFolder {
            path: entry.path(),
            artist_key: artist_key(&raw_name),
            raw_name,
        });
    }

    // read_dir order is platform-dependent; sort so "first occurrence wins"
    // grouping is deterministic across runs.
    folders.sort_by(|a, b| a.raw_name.cmp(&b.raw_name));
    Ok(folders)
}

/// Group folders by artist key, preserving first-occurrence order.
pub fn group_by_artist_key(folders: Vec<ArtistFolder>) -> Vec<ArtistGroup> {
    let mut groups: Vec<ArtistGroup> = Vec::new();
    for folder in folders {
        match groups.iter_mut().find(|g| g.artist_key == folder.artist_key) {
            Some(group) => group.folders.push(folder),
            None => groups.push(ArtistGroup {
                artist_key: folder.artist_key.clone(),
                folders: vec![folder],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artist_key_plain_name() {
        assert_eq!(artist_key("Jane Doe"), "jane doe");
    }

    #[test]
    fn test_artist_key_collapses_collaborators() {
        assert_eq!(artist_key("Artist & Other"), "artist");
        assert_eq!(artist_key("Artist, Someone"), "artist");
        assert_eq!(artist_key("Artist & Other, Third"), "artist");
    }

    #[test]
    fn test_artist_key_strips_parenthetical_qualifier() {
        assert_eq!(artist_key("Artist (Remastered)"), "artist");
    }

    #[test]
    fn test_artist_key_split_order_is_fixed() {
        // The '&' split applies first, then ", ", then " (".
        assert_eq!(artist_key("Artist (Live) & Other"), "artist");
        assert_eq!(artist_key("A, B & C"), "a");
    }

    #[test]
    fn test_artist_key_idempotent_on_bare_token() {
        let key = artist_key("artist");
        assert_eq!(artist_key(&key), key);
    }

    #[test]
    fn test_artist_key_empty_input() {
        assert_eq!(artist_key(""), "");
    }

    #[test]
    fn test_scan_finds_only_directories() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("Jane Doe")).unwrap();
        std::fs::create_dir(root.path().join("Other Artist")).unwrap();
        std::fs::write(root.path().join("stray.txt"), b"x").unwrap();

        let folders = scan_artist_folders(root.path()).unwrap();
        let names: Vec<&str> = folders.iter().map(|f| f.raw_name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "Other Artist"]);
        assert_eq!(folders[0].artist_key, "jane doe");
    }

    #[test]
    fn test_scan_missing_root_errors() {
        assert!(scan_artist_folders(Path::new("/nonexistent/library/root")).is_err());
    }

    #[test]
    fn test_grouping_pools_aliased_folders() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("Artist & Other")).unwrap();
        std::fs::create_dir(root.path().join("Artist, Someone")).unwrap();
        std::fs::create_dir(root.path().join("Unrelated")).unwrap();
        std::fs::write(root.path().join("Artist & Other").join("01. One.flac"), b"x").unwrap();
        std::fs::write(root.path().join("Artist, Someone").join("02. Two.flac"), b"x").unwrap();

        let groups = group_by_artist_key(scan_artist_folders(root.path()).unwrap());
        assert_eq!(groups.len(), 2);

        let artist = &groups[0];
        assert_eq!(artist.artist_key, "artist");
        assert_eq!(artist.folders.len(), 2);
        assert_eq!(artist.primary().raw_name, "Artist & Other");

        let mut entries = artist.pooled_entries().unwrap();
        entries.sort();
        assert_eq!(entries, vec!["01. One.flac", "02. Two.flac"]);
    }

    #[test]
    fn test_pooled_entries_include_release_subfolders() {
        let root = TempDir::new().unwrap();
        let artist_dir = root.path().join("Jane Doe");
        std::fs::create_dir(&artist_dir).unwrap();
        std::fs::create_dir(artist_dir.join("Hit Album (2020) - Album")).unwrap();
        std::fs::write(artist_dir.join("01. Loose Track.mp3"), b"x").unwrap();

        let groups = group_by_artist_key(scan_artist_folders(root.path()).unwrap());
        let mut entries = groups[0].pooled_entries().unwrap();
        entries.sort();
        assert_eq!(entries, vec!["01. Loose Track.mp3", "Hit Album (2020) - Album"]);
    }
}
