use std::{
    fs::File,
    io::BufReader,
    path::{
        Path,
        PathBuf,
    },
};

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;
use zip::ZipArchive;

use crate::error::LoadError;


/// A service export as downloaded from the provider; a ZIP with JSON files somewhere inside
pub struct ExportArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl ExportArchive {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(LoadError::io(path))?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(|source| LoadError::Zip {
            path: path.to_owned(),
            source,
        })?;
        debug!(path = %path.display(), entries = zip.len(), "Opened archive");
        Ok(Self {
            path: path.to_owned(),
            zip,
        })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn entry_names(&self) -> Vec<String> { self.zip.file_names().map(str::to_owned).collect() }

    /// Names of all JSON entries whose base name matches `pattern`, in sorted order
    pub fn matching_entries(&self, pattern: &Regex) -> Vec<String> {
        let mut names: Vec<_> = self
            .zip
            .file_names()
            .filter(|name| name.ends_with(".json") && pattern.is_match(base_name(name)))
            .map(str::to_owned)
            .collect();
        names.sort_unstable();
        names
    }

    /// Same as [`Self::matching_entries`] but an empty result is an error
    pub fn require_entries(&self, pattern: &Regex) -> Result<Vec<String>, LoadError> {
        let names = self.matching_entries(pattern);
        if names.is_empty() {
            Err(LoadError::NoMatchingEntries {
                archive: self.path.clone(),
                pattern: pattern.as_str().to_owned(),
                available: self.entry_names(),
            })
        } else {
            Ok(names)
        }
    }

    pub fn read_json<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, LoadError> {
        let entry = self.zip.by_name(name).map_err(|source| LoadError::Zip {
            path: self.path.join(name),
            source,
        })?;
        serde_json::from_reader(BufReader::new(entry)).map_err(|source| LoadError::Json {
            name: name.to_owned(),
            source,
        })
    }
}

/// Entry names always use `/`, regardless of platform
pub(crate) fn base_name(entry: &str) -> &str { entry.rsplit('/').next().unwrap_or(entry) }
