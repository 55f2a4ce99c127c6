//! Source references and content access.
//!
//! A bundle entry is either a path relative to the module's basepath or a
//! remote URL. Protocol-relative references (`//host/x.js`) are fetched
//! over plain `http:`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use url::Url;

use crate::freshness::get_mtime;

/// Timeout for a single remote fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to obtain one source file's content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url `{reference}`: {source}")]
    InvalidUrl {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to fetch `{url}`: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch `{url}`: server answered {status}")]
    Status { url: Url, status: reqwest::StatusCode },

    #[error("no content in `{file}`")]
    Empty { file: SourceRef },
}

/// Where a source file lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceRef {
    Local(PathBuf),
    Remote(Url),
}

impl SourceRef {
    /// Parse a configured file reference.
    ///
    /// References starting with `http` are URLs, `//` references get an
    /// `http:` scheme, anything else is joined onto `basepath`.
    pub fn parse(reference: &str, basepath: &Path) -> Result<Self, FetchError> {
        let url = if reference.starts_with("//") {
            format!("http:{reference}")
        } else if reference.starts_with("http") {
            reference.to_owned()
        } else {
            let relative = reference.trim_start_matches(['/', '\\']);
            return Ok(Self::Local(basepath.join(relative)));
        };

        Url::parse(&url)
            .map(Self::Remote)
            .map_err(|source| FetchError::InvalidUrl {
                reference: reference.to_owned(),
                source,
            })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Final path segment, used for `.min.` detection and extension checks.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Local(path) => path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default(),
        }
    }

    /// Lowercased extension of [`file_name`](Self::file_name).
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Content and timestamp access for sources.
///
/// The build reads through this trait so tests can substitute in-memory
/// sources.
pub trait SourceReader: Sync {
    /// Full content of a source. Empty content is an error.
    fn read(&self, source: &SourceRef) -> Result<String, FetchError>;

    /// Modification time, `None` for remote or missing sources.
    fn modified(&self, source: &SourceRef) -> Option<SystemTime>;
}

/// Reads local files from disk and remote files over HTTP.
///
/// The HTTP client is created on first remote fetch.
#[derive(Default)]
pub struct FsReader {
    client: OnceLock<reqwest::blocking::Client>,
}

impl FsReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self, url: &Url) -> Result<&reqwest::blocking::Client, FetchError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("rebundle/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;
        Ok(self.client.get_or_init(|| client))
    }

    fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let http = |source| FetchError::Http {
            url: url.clone(),
            source,
        };
        let response = self.client(url)?.get(url.clone()).send().map_err(http)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: response.status(),
            });
        }
        let bytes = response.bytes().map_err(http)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl SourceReader for FsReader {
    fn read(&self, source: &SourceRef) -> Result<String, FetchError> {
        let content = match source {
            SourceRef::Local(path) => {
                let bytes = fs::read(path).map_err(|e| FetchError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                String::from_utf8_lossy(&bytes).into_owned()
            }
            SourceRef::Remote(url) => self.fetch(url)?,
        };

        if content.is_empty() {
            return Err(FetchError::Empty {
                file: source.clone(),
            });
        }
        Ok(content)
    }

    fn modified(&self, source: &SourceRef) -> Option<SystemTime> {
        match source {
            SourceRef::Local(path) => get_mtime(path),
            SourceRef::Remote(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_local_joins_basepath() {
        let src = SourceRef::parse("vendor/a.js", Path::new("/site/js")).unwrap();
        assert_eq!(src, SourceRef::Local(PathBuf::from("/site/js/vendor/a.js")));

        let src = SourceRef::parse("/b.js", Path::new("/site/js")).unwrap();
        assert_eq!(src, SourceRef::Local(PathBuf::from("/site/js/b.js")));
    }

    #[test]
    fn test_parse_protocol_relative_gets_http() {
        let src = SourceRef::parse("//cdn.example.com/lib.min.js", Path::new("/x")).unwrap();
        let SourceRef::Remote(url) = &src else {
            panic!("expected remote source");
        };
        assert_eq!(url.as_str(), "http://cdn.example.com/lib.min.js");
        assert!(src.is_remote());
        assert_eq!(src.file_name(), "lib.min.js");
        assert_eq!(src.extension().as_deref(), Some("js"));
    }

    #[test]
    fn test_parse_invalid_url() {
        let err = SourceRef::parse("http://", Path::new("/x")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_local_file_name_and_extension() {
        let src = SourceRef::Local(PathBuf::from("/a/b/Style.CSS"));
        assert_eq!(src.file_name(), "Style.CSS");
        assert_eq!(src.extension().as_deref(), Some("css"));
    }

    #[test]
    fn test_fs_reader_reads_local() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "var a;").unwrap();

        let reader = FsReader::new();
        let src = SourceRef::Local(path);
        assert_eq!(reader.read(&src).unwrap(), "var a;");
        assert!(reader.modified(&src).is_some());
    }

    #[test]
    fn test_fs_reader_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        let reader = FsReader::new();

        let missing = SourceRef::Local(dir.path().join("nope.js"));
        assert!(matches!(reader.read(&missing), Err(FetchError::Io { .. })));
        assert!(reader.modified(&missing).is_none());

        let path = dir.path().join("empty.js");
        fs::write(&path, "").unwrap();
        let empty = SourceRef::Local(path);
        assert!(matches!(reader.read(&empty), Err(FetchError::Empty { .. })));
    }

    #[test]
    fn test_remote_has_no_mtime() {
        let src = SourceRef::parse("https://example.com/a.js", Path::new("/")).unwrap();
        assert!(FsReader::new().modified(&src).is_none());
    }
}
