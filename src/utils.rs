//! Utility functions for URL and path construction

use crate::error::{Error, Result};
use crate::types::{ImageId, Size};
use std::path::{Path, PathBuf};
use url::Url;

/// Extension every saved image gets, whatever the caller asked for
pub const IMAGE_EXTENSION: &str = "jpg";

/// Build the server URL of an image
///
/// Images live under `{api_url}/{size}/{id / image_modulo}/{id}.jpg`.
///
/// # Examples
///
/// ```
/// use mugimugi_image::types::Size;
/// use mugimugi_image::utils::image_url;
///
/// let url = image_url("https://img.example.org/", 2000, 4567, Size::Thumbnail).unwrap();
/// assert_eq!(url.as_str(), "https://img.example.org/tn/2/4567.jpg");
/// ```
pub fn image_url(api_url: &str, image_modulo: u64, id: ImageId, size: Size) -> Result<Url> {
    if image_modulo == 0 {
        return Err(Error::config(
            "image_modulo must be at least 1",
            "image_modulo",
        ));
    }
    let raw = format!(
        "{}/{}/{}/{}.{}",
        api_url.trim_end_matches('/'),
        size.as_str(),
        id / image_modulo,
        id,
        IMAGE_EXTENSION
    );
    Url::parse(&raw).map_err(|e| Error::config(format!("invalid image URL '{raw}': {e}"), "api_url"))
}

/// Destination path an image is written to
///
/// Forces the `.jpg` extension and makes the path absolute against the current
/// directory. The file does not need to exist. If the path cannot be made
/// absolute (an empty path), it is returned relative and the write reports the
/// error.
///
/// # Examples
///
/// ```
/// use mugimugi_image::utils::normalize_image_path;
/// use std::path::Path;
///
/// let path = normalize_image_path(Path::new("/covers/1234.png"));
/// assert_eq!(path, Path::new("/covers/1234.jpg"));
/// ```
#[must_use]
pub fn normalize_image_path(path: &Path) -> PathBuf {
    let with_extension = path.with_extension(IMAGE_EXTENSION);
    std::path::absolute(&with_extension).unwrap_or(with_extension)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_bucket_of_id() {
        let url = image_url("https://img.example.org", 2000, 4567, Size::Big).unwrap();
        assert_eq!(url.as_str(), "https://img.example.org/big/2/4567.jpg");

        let url = image_url("https://img.example.org", 2000, 1999, Size::Sample).unwrap();
        assert_eq!(url.as_str(), "https://img.example.org/sample/0/1999.jpg");

        let url = image_url("https://img.example.org", 2000, 2000, Size::Big).unwrap();
        assert_eq!(url.as_str(), "https://img.example.org/big/1/2000.jpg");
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let url = image_url("http://localhost:9000/images/", 10, 25, Size::Thumbnail).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/images/tn/2/25.jpg");
    }

    #[test]
    fn url_rejects_zero_modulo_and_bad_base() {
        assert!(matches!(
            image_url("https://img.example.org", 0, 1, Size::Big),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            image_url("no scheme", 2000, 1, Size::Big),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn normalize_replaces_or_adds_extension() {
        assert_eq!(
            normalize_image_path(Path::new("/tmp/a.png")),
            Path::new("/tmp/a.jpg")
        );
        assert_eq!(normalize_image_path(Path::new("/tmp/b")), Path::new("/tmp/b.jpg"));
        assert_eq!(
            normalize_image_path(Path::new("/tmp/c.jpg")),
            Path::new("/tmp/c.jpg")
        );
    }

    #[test]
    fn normalize_makes_relative_paths_absolute() {
        let path = normalize_image_path(Path::new("covers/d.gif"));
        assert!(path.is_absolute());
        assert!(path.ends_with("covers/d.jpg"));
    }
}
