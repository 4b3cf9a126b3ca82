//! Loading templates and variable files from local or remote locations.
//!
//! A location is one of:
//!
//! - `-` for stdin
//! - an `http://` or `https://` URL
//! - a local path
//!
//! Every source is read through the same size limit.

use std::io::{self, Read};

use thiserror::Error;

/// Default size limit for fetched content, in bytes.
pub const DEFAULT_MAX_SIZE: u64 = 512 * 1000;

/// Errors that can occur while fetching content.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read '{uri}': {source}")]
    Io {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("'{uri}' exceeds the maximum size of {limit} bytes")]
    TooLarge { uri: String, limit: u64 },

    #[error("failed to download '{uri}': {source}")]
    Http {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to download '{uri}': server returned {status}")]
    Status {
        uri: String,
        status: reqwest::StatusCode,
    },
}

/// Reads the content at `uri`, failing if it is larger than `max_size`.
pub fn fetch(uri: &str, max_size: u64) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(uri, max_size, "fetching");
    if uri == "-" {
        return read_limited(io::stdin().lock(), uri, max_size);
    }
    if is_remote(uri) {
        return download(uri, max_size);
    }
    let file = std::fs::File::open(uri).map_err(|source| FetchError::Io {
        uri: uri.to_string(),
        source,
    })?;
    read_limited(file, uri, max_size)
}

/// Returns `true` for `http://` and `https://` locations.
pub fn is_remote(uri: &str) -> bool {
    let lower = uri.get(..8).unwrap_or(uri).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn download(uri: &str, max_size: u64) -> Result<Vec<u8>, FetchError> {
    let http_err = |source| FetchError::Http {
        uri: uri.to_string(),
        source,
    };
    let response = reqwest::blocking::get(uri).map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            uri: uri.to_string(),
            status,
        });
    }
    if response.content_length().is_some_and(|len| len > max_size) {
        return Err(FetchError::TooLarge {
            uri: uri.to_string(),
            limit: max_size,
        });
    }
    read_limited(response, uri, max_size)
}

/// Reads all of `reader`, failing once more than `max_size` bytes arrive.
pub fn read_limited<R: Read>(reader: R, uri: &str, max_size: u64) -> Result<Vec<u8>, FetchError> {
    let mut buf = Vec::new();
    reader
        .take(max_size.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|source| FetchError::Io {
            uri: uri.to_string(),
            source,
        })?;
    if buf.len() as u64 > max_size {
        return Err(FetchError::TooLarge {
            uri: uri.to_string(),
            limit: max_size,
        });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello {{{{name}}}}").unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(fetch(path, DEFAULT_MAX_SIZE).unwrap(), b"hello {{name}}");
    }

    #[test]
    fn missing_file_names_the_location() {
        let err = fetch("/definitely/not/here.tpl", DEFAULT_MAX_SIZE).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.tpl"));
    }

    #[test]
    fn content_at_the_limit_is_accepted() {
        let data = vec![b'x'; 16];
        assert_eq!(read_limited(&data[..], "mem", 16).unwrap().len(), 16);
    }

    #[test]
    fn content_over_the_limit_is_rejected() {
        let data = vec![b'x'; 17];
        let err = read_limited(&data[..], "mem", 16).unwrap_err();
        assert!(matches!(err, FetchError::TooLarge { limit: 16, .. }));
    }

    #[test]
    fn remote_detection() {
        assert!(is_remote("http://example.com/t.txt"));
        assert!(is_remote("HTTPS://example.com/t.txt"));
        assert!(!is_remote("./https/t.txt"));
        assert!(!is_remote("-"));
        assert!(!is_remote("h"));
    }
}
