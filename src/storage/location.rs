//! Storage location resolution

use crate::error::{PipelineError, Result};
use std::path::PathBuf;
use url::Url;

/// Resolve a configured location to a local directory.
///
/// Accepts either a `file://` URL or a plain filesystem path. Other URL
/// schemes are rejected since only local backends ship with this crate.
pub fn resolve_location(location: &str) -> Result<PathBuf> {
    let location = location.trim();
    if location.is_empty() {
        return Err(PipelineError::Config("storage location is empty".to_string()));
    }

    match Url::parse(location) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|_| {
            PipelineError::Config(format!("'{}' is not a valid file URL", location))
        }),
        // Windows drive letters parse as a one-letter scheme
        Ok(url) if url.scheme().len() == 1 => Ok(PathBuf::from(location)),
        Ok(url) => Err(PipelineError::Config(format!(
            "unsupported storage scheme '{}' in '{}'",
            url.scheme(),
            location
        ))),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(PathBuf::from(location)),
        Err(e) => Err(PipelineError::Config(format!(
            "invalid storage location '{}': {}",
            location, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        assert_eq!(
            resolve_location("data/lake").unwrap(),
            PathBuf::from("data/lake")
        );
        assert_eq!(
            resolve_location("/var/lib/lake").unwrap(),
            PathBuf::from("/var/lib/lake")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url() {
        assert_eq!(
            resolve_location("file:///var/lib/lake").unwrap(),
            PathBuf::from("/var/lib/lake")
        );
    }

    #[test]
    fn test_rejects_remote_scheme() {
        let err = resolve_location("https://account.blob.core.windows.net/raw").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(resolve_location("  ").is_err());
    }
}
