//! Local catalog of promotional links.
//!
//! The catalog is a plain text file with one URL per line. Lines are trimmed
//! and blank ones skipped; nothing else is validated.
use rand::Rng;
use rand::seq::SliceRandom;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use trendpost_common::{Result, SelectedLink, TrendpostError};

/// Default catalog location, relative to the working directory.
pub const DEFAULT_LINKS_PATH: &str = "links.txt";

#[derive(Debug, Clone)]
pub struct LinkCatalog {
    path: PathBuf,
    links: Vec<String>,
}

impl LinkCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TrendpostError::ResourceNotFound(path.to_path_buf()),
            _ => TrendpostError::Io(e),
        })?;

        let catalog = Self::parse(path, &contents);
        if catalog.links.is_empty() {
            return Err(TrendpostError::EmptyCatalog(path.to_path_buf()));
        }
        tracing::debug!(path = %path.display(), links = catalog.len(), "loaded link catalog");
        Ok(catalog)
    }

    /// Build a catalog from file contents without touching the filesystem.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Self {
        let links = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            path: path.into(),
            links,
        }
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Draw one link uniformly at random.
    pub fn pick(&self) -> Result<SelectedLink> {
        self.pick_with(&mut rand::thread_rng())
    }

    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SelectedLink> {
        self.links
            .choose(rng)
            .map(|link| SelectedLink::new(link.as_str()))
            .ok_or_else(|| TrendpostError::EmptyCatalog(self.path.clone()))
    }
}

pub trait LinkPicker: Send + Sync {
    fn pick_random_link(&self) -> Result<SelectedLink>;
}

/// Re-reads the catalog file on every pick.
#[derive(Debug, Clone)]
pub struct FileLinkPicker {
    path: PathBuf,
}

impl FileLinkPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileLinkPicker {
    fn default() -> Self {
        Self::new(DEFAULT_LINKS_PATH)
    }
}

impl LinkPicker for FileLinkPicker {
    fn pick_random_link(&self) -> Result<SelectedLink> {
        let link = LinkCatalog::load(&self.path)?.pick()?;
        tracing::info!("Selected link: {link}");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use std::io::Write;

    fn links_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn blank_lines_and_padding_are_dropped() {
        let catalog = LinkCatalog::parse("links.txt", "  http://a \n\n\t\nhttp://b\r\n");
        assert_eq!(catalog.links(), ["http://a", "http://b"]);
    }

    #[test]
    fn picks_only_catalog_entries() {
        let catalog = LinkCatalog::parse("links.txt", "http://a\nhttp://b\nhttp://c\n");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let link = catalog.pick_with(&mut rng).unwrap();
            assert!(catalog.links().iter().any(|l| l == link.as_str()));
        }
    }

    #[test]
    fn picks_are_roughly_uniform() {
        let catalog = LinkCatalog::parse("links.txt", "http://a\nhttp://b\nhttp://c\nhttp://d\n");
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<String, usize> = HashMap::new();
        let trials = 8_000;
        for _ in 0..trials {
            let link = catalog.pick_with(&mut rng).unwrap();
            *counts.entry(link.as_str().to_string()).or_default() += 1;
        }
        assert_eq!(counts.len(), 4);
        for count in counts.values() {
            // expected 2000 each
            assert!((1700..=2300).contains(count), "skewed counts: {counts:?}");
        }
    }

    #[test]
    fn single_entry_is_always_chosen() {
        let catalog = LinkCatalog::parse("links.txt", "\nhttp://only\n\n");
        assert_eq!(catalog.pick().unwrap().as_str(), "http://only");
    }

    #[test]
    fn missing_file_is_resource_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let err = FileLinkPicker::new(&path).pick_random_link().unwrap_err();
        match err {
            TrendpostError::ResourceNotFound(p) => assert_eq!(p, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_file_is_empty_catalog() {
        let file = links_file("\n   \n\n");
        let err = FileLinkPicker::new(file.path()).pick_random_link().unwrap_err();
        assert!(matches!(err, TrendpostError::EmptyCatalog(_)));
        assert!(err.is_warning());
    }

    #[test]
    fn directory_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LinkCatalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, TrendpostError::Io(_)));
    }

    #[test]
    fn file_picker_reads_links() {
        let file = links_file("http://a\nhttp://b\n");
        let link = FileLinkPicker::new(file.path()).pick_random_link().unwrap();
        assert!(["http://a", "http://b"].contains(&link.as_str()));
    }
}
