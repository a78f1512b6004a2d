use std::{
    ffi::OsStr,
    fs::{
        self,
        File,
    },
    io::BufReader,
    path::{
        Path,
        PathBuf,
    },
};

use serde::de::DeserializeOwned;
use tracing::{
    info,
    warn,
};
pub use wrapped_core::*;

use crate::{
    archive::ExportArchive,
    error::LoadError,
    service::{
        spotify,
        tiktok,
        SpotifyListen,
        SpotifyListenVec,
        TikTokData,
    },
};

pub mod archive;
pub mod de;
pub mod error;
pub mod report;
pub mod service;
pub mod stats;


/// Recognized export files, by file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    SpotifyArchive,
    SpotifyHistory,
    TikTokArchive,
    TikTokUserData,
}

impl ExportKind {
    pub fn of(path: &Path) -> Option<Self> {
        let name = path.file_name().and_then(OsStr::to_str)?;
        if spotify::ARCHIVE_REGEX.is_match(name) {
            Some(Self::SpotifyArchive)
        } else if spotify::HISTORY_FILE_REGEX.is_match(name) {
            Some(Self::SpotifyHistory)
        } else if tiktok::ARCHIVE_REGEX.is_match(name) {
            Some(Self::TikTokArchive)
        } else if tiktok::USER_DATA_REGEX.is_match(name) {
            Some(Self::TikTokUserData)
        } else {
            None
        }
    }

    pub fn is_spotify(self) -> bool { matches!(self, Self::SpotifyArchive | Self::SpotifyHistory) }
}


pub enum ImportData {
    Spotify(Vec<SpotifyListen>),
    TikTok(TikTokData),
}

/// Attempts to load the export at `path` based on file name
///
/// # Errors
///
/// This function will return an error if the file name is not a recognized pattern, the file or
/// archive can't be read, or a required JSON document fails to decode. Inside a Spotify archive, a
/// history file that fails to decode is logged and skipped.
pub fn load_export(path: &Path) -> Result<ImportData, LoadError> {
    match ExportKind::of(path) {
        Some(ExportKind::SpotifyArchive) => load_spotify_archive(path).map(ImportData::Spotify),
        Some(ExportKind::SpotifyHistory) => {
            read_json_file::<SpotifyListenVec>(path).map(|listens| ImportData::Spotify(listens.into_inner()))
        },
        Some(ExportKind::TikTokArchive) => {
            let mut archive = ExportArchive::open(path)?;
            TikTokData::from_archive(&mut archive).map(ImportData::TikTok)
        },
        Some(ExportKind::TikTokUserData) => read_json_file(path).map(|data| {
            ImportData::TikTok(TikTokData {
                source: path.display().to_string(),
                data,
            })
        }),
        None => Err(LoadError::UnrecognizedFile(path.to_owned())),
    }
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let rdr = File::open(path).map(BufReader::new).map_err(LoadError::io(path))?;
    serde_json::from_reader(rdr).map_err(|source| LoadError::Json {
        name: path.display().to_string(),
        source,
    })
}

fn load_spotify_archive(path: &Path) -> Result<Vec<SpotifyListen>, LoadError> {
    let mut archive = ExportArchive::open(path)?;
    let mut listens = Vec::new();
    for entry in archive.require_entries(&spotify::HISTORY_FILE_REGEX)? {
        match archive.read_json::<SpotifyListenVec>(&entry) {
            Ok(v) => {
                info!(entry = %entry, listens = v.len(), "Loaded streaming history");
                listens.extend(v);
            },
            Err(e) => warn!("Skipping {entry}: {e}"),
        }
    }
    Ok(listens)
}


/// Recognized export files directly inside `dir`, sorted by name
///
/// Loose Spotify history files are dropped when a Spotify archive is also present, and only a single
/// TikTok export is kept, preferring archives.
///
/// # Errors
///
/// Fails if `dir` can't be listed or contains no recognized files.
pub fn discover_exports(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut found: Vec<(PathBuf, ExportKind)> = fs::read_dir(dir)
        .map_err(LoadError::io(dir))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| ExportKind::of(&path).map(|kind| (path, kind)))
        .collect();
    found.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let has = |kind: ExportKind| found.iter().any(|&(_, k)| k == kind);
    let skip_loose_spotify = has(ExportKind::SpotifyArchive);
    let tiktok_kind = if has(ExportKind::TikTokArchive) { ExportKind::TikTokArchive } else { ExportKind::TikTokUserData };

    let mut tiktok_kept = false;
    let mut exports = Vec::with_capacity(found.len());
    for (path, kind) in found {
        let skip = match kind {
            ExportKind::SpotifyArchive => false,
            ExportKind::SpotifyHistory => skip_loose_spotify,
            ExportKind::TikTokArchive | ExportKind::TikTokUserData => kind != tiktok_kind || tiktok_kept,
        };
        if skip {
            info!(path = %path.display(), "Skipping duplicate export");
            continue;
        }
        tiktok_kept |= !kind.is_spotify();
        exports.push(path);
    }

    if exports.is_empty() {
        Err(LoadError::NoExports(dir.to_owned()))
    } else {
        Ok(exports)
    }
}
