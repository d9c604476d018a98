use std::path::Path;

/// Content types the server knows by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    TextHtml,
    TextCss,
    TextJavascript,
    ImagePng,
    ImageJpeg,
    ImageIcon,
    OctetStream,
}

impl ContentType {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "html" => ContentType::TextHtml,
            "css" => ContentType::TextCss,
            "js" => ContentType::TextJavascript,
            "png" => ContentType::ImagePng,
            "jpg" | "jpeg" => ContentType::ImageJpeg,
            "ico" => ContentType::ImageIcon,
            _ => ContentType::OctetStream,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(ContentType::OctetStream)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::TextHtml => "text/html",
            ContentType::TextCss => "text/css",
            ContentType::TextJavascript => "text/javascript",
            ContentType::ImagePng => "image/png",
            ContentType::ImageJpeg => "image/jpeg",
            ContentType::ImageIcon => "image/vnd.microsoft.icon",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_extensions() {
        assert_eq!(ContentType::from_path(Path::new("a/index.html")).as_str(), "text/html");
        assert_eq!(ContentType::from_path(Path::new("x.jpeg")), ContentType::ImageJpeg);
        assert_eq!(ContentType::from_path(Path::new("x.jpg")), ContentType::ImageJpeg);
        assert_eq!(
            ContentType::from_path(Path::new("favicon.ico")).as_str(),
            "image/vnd.microsoft.icon"
        );
    }

    #[test]
    fn unknown_or_missing_extension_is_octet_stream() {
        assert_eq!(ContentType::from_path(Path::new("missing.xyz")), ContentType::OctetStream);
        assert_eq!(ContentType::from_path(Path::new("Makefile")), ContentType::OctetStream);
    }
}
