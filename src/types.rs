//! Core types for mugimugi-image

use serde::{Deserialize, Serialize};

/// Numeric identifier of an image on the server
pub type ImageId = u64;

/// Image variant served by the image server
///
/// Each variant is stored under its own repository path segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    /// Full-size cover
    #[default]
    Big,
    /// Thumbnail
    #[serde(rename = "tn", alias = "thumbnail")]
    Thumbnail,
    /// Sample page
    Sample,
}

impl Size {
    /// Path segment selecting this variant on the server
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Big => "big",
            Size::Thumbnail => "tn",
            Size::Sample => "sample",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "big" => Ok(Size::Big),
            "tn" | "thumbnail" => Ok(Size::Thumbnail),
            "sample" => Ok(Size::Sample),
            other => Err(format!("unknown image size: {other}")),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_segments() {
        assert_eq!(Size::Big.as_str(), "big");
        assert_eq!(Size::Thumbnail.as_str(), "tn");
        assert_eq!(Size::Sample.to_string(), "sample");
        assert_eq!(Size::default(), Size::Big);
    }

    #[test]
    fn size_parses_segment_and_long_name() {
        assert_eq!("tn".parse::<Size>().unwrap(), Size::Thumbnail);
        assert_eq!("thumbnail".parse::<Size>().unwrap(), Size::Thumbnail);
        assert!("huge".parse::<Size>().is_err());
    }

    #[test]
    fn size_serde_uses_path_segment() {
        assert_eq!(serde_json::to_string(&Size::Thumbnail).unwrap(), "\"tn\"");
        assert_eq!(serde_json::to_string(&Size::Big).unwrap(), "\"big\"");

        let size: Size = serde_json::from_str("\"tn\"").unwrap();
        assert_eq!(size, Size::Thumbnail);
        let size: Size = serde_json::from_str("\"thumbnail\"").unwrap();
        assert_eq!(size, Size::Thumbnail);

        for size in [Size::Big, Size::Thumbnail, Size::Sample] {
            let json = serde_json::to_string(&size).unwrap();
            assert_eq!(json, format!("\"{size}\""));
        }
    }
}
