//! Media helpers: type classification, next-gen image URLs and tag hygiene.
//!
//! The remote asset host does not report a reliable content type, so the
//! gallery derives `mediaType` from the URL's file extension. Anything that
//! is not a known video extension is treated as an image.

use std::str::FromStr;

use crate::models::MediaType;

const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "webm", "ogg"];
const NEXT_GEN_CANDIDATES: [&str; 3] = ["jpg", "jpeg", "png"];

/// Preferred format for rewritten image URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Webp,
    Avif,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Avif => "avif",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(ImageFormat::Webp),
            "avif" => Ok(ImageFormat::Avif),
            other => Err(format!("unsupported image format: {other}")),
        }
    }
}

/// Splits `url` into the part before the query/fragment and the remainder.
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

fn extension(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    Some(ext)
}

/// Classifies a media URL by extension. Unmatched extensions fall back to
/// [`MediaType::Image`].
pub fn classify_media_type(media_url: &str) -> MediaType {
    let (path, _) = split_suffix(media_url.trim());
    match extension(path) {
        Some(ext)
            if VIDEO_EXTENSIONS
                .iter()
                .any(|video| ext.eq_ignore_ascii_case(video)) =>
        {
            MediaType::Video
        }
        _ => MediaType::Image,
    }
}

/// Rewrites `.jpg`/`.jpeg`/`.png` URLs to the preferred next-gen format,
/// keeping any query string. Other URLs are returned unchanged.
pub fn to_next_gen_url(url: &str, format: ImageFormat) -> String {
    let (path, suffix) = split_suffix(url);
    let Some(ext) = extension(path) else {
        return url.to_string();
    };

    if !NEXT_GEN_CANDIDATES
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
    {
        return url.to_string();
    }

    let stem = &path[..path.len() - ext.len()];
    format!("{stem}{}{suffix}", format.as_str())
}

/// Strips quote characters, trims whitespace and drops empty tags.
pub fn sanitize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| {
            tag.as_ref()
                .chars()
                .filter(|c| !matches!(c, '\'' | '"' | '`' | '\u{201C}' | '\u{201D}'))
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parses a comma-separated tag list as sent by upload forms.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    sanitize_tags(raw.split(','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_video_extensions() {
        assert_eq!(classify_media_type("https://cdn.example/a/clip.mp4"), MediaType::Video);
        assert_eq!(classify_media_type("https://cdn.example/a/clip.WEBM"), MediaType::Video);
        assert_eq!(classify_media_type("https://cdn.example/a/clip.ogg"), MediaType::Video);
    }

    #[test]
    fn test_classify_defaults_to_image() {
        assert_eq!(classify_media_type("https://cdn.example/a/photo.png"), MediaType::Image);
        assert_eq!(classify_media_type("https://cdn.example/a/report.pdf"), MediaType::Image);
        assert_eq!(classify_media_type("https://cdn.example/a/no-extension"), MediaType::Image);
        assert_eq!(classify_media_type(""), MediaType::Image);
    }

    #[test]
    fn test_classify_ignores_query_string() {
        assert_eq!(
            classify_media_type("https://cdn.example/clip.mp4?token=abc"),
            MediaType::Video
        );
    }

    #[test]
    fn test_next_gen_url_rewrites_raster_formats() {
        assert_eq!(
            to_next_gen_url("https://cdn.example/p/photo.jpg", ImageFormat::Webp),
            "https://cdn.example/p/photo.webp"
        );
        assert_eq!(
            to_next_gen_url("https://cdn.example/p/photo.PNG?w=300", ImageFormat::Avif),
            "https://cdn.example/p/photo.avif?w=300"
        );
    }

    #[test]
    fn test_next_gen_url_leaves_other_urls() {
        assert_eq!(
            to_next_gen_url("https://cdn.example/p/clip.mp4", ImageFormat::Webp),
            "https://cdn.example/p/clip.mp4"
        );
        assert_eq!(
            to_next_gen_url("https://cdn.example.com/p/", ImageFormat::Webp),
            "https://cdn.example.com/p/"
        );
    }

    #[test]
    fn test_image_format_parsing() {
        assert_eq!("AVIF".parse::<ImageFormat>().unwrap(), ImageFormat::Avif);
        assert_eq!("webp".parse::<ImageFormat>().unwrap(), ImageFormat::Webp);
        assert!("gif".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_sanitize_tags() {
        let tags = sanitize_tags(["  \"youth\" ", "'health'", "", "  ", "`camp`", "\u{201C}water\u{201D}"]);
        assert_eq!(tags, vec!["youth", "health", "camp", "water"]);
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_tag_list("").is_empty());
    }
}
