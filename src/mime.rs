//! Content type detection for stored files.
//!
//! The store asks its [`MimeGuesser`] exactly once per content-changing call (`write()`,
//! `update()`) and keeps the answer; reads never re-guess.

/// Best-guess content type for a path and its bytes.
pub trait MimeGuesser: Send + Sync {
    fn guess(&self, path: &str, contents: &[u8]) -> String;
}

impl<F> MimeGuesser for F
where
    F: Fn(&str, &[u8]) -> String + Send + Sync,
{
    fn guess(&self, path: &str, contents: &[u8]) -> String {
        self(path, contents)
    }
}

pub const DEFAULT_MIMETYPE: &str = "text/plain";
pub const BINARY_MIMETYPE: &str = "application/octet-stream";

/// Signature sniffing, then the file extension, then `text/plain`.
///
/// Content the sniffer does not recognise but which is clearly binary (not UTF-8, or has NUL
/// bytes) is reported as `application/octet-stream` regardless of the extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMimeGuesser;

impl MimeGuesser for DefaultMimeGuesser {
    fn guess(&self, path: &str, contents: &[u8]) -> String {
        if let Some(mime) = sniff(contents) {
            return mime.to_string();
        }
        if is_binary(contents) {
            return BINARY_MIMETYPE.to_string();
        }
        by_extension(path).unwrap_or(DEFAULT_MIMETYPE).to_string()
    }
}

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
    (b"\x00asm", "application/wasm"),
];

fn sniff(contents: &[u8]) -> Option<&'static str> {
    if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| contents.starts_with(magic)) {
        return Some(*mime);
    }
    if contents.len() >= 12 && &contents[..4] == b"RIFF" && &contents[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    let head = &contents[..contents.len().min(64)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start().to_ascii_lowercase();
    if text.starts_with("<?xml") {
        Some("application/xml")
    } else if text.starts_with("<!doctype html") || text.starts_with("<html") {
        Some("text/html")
    } else {
        None
    }
}

fn is_binary(contents: &[u8]) -> bool {
    contents.contains(&0) || std::str::from_utf8(contents).is_err()
}

fn by_extension(path: &str) -> Option<&'static str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None; // dotfile such as ".env"
    }
    let mime = match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "rs" => "text/x-rust",
        "php" => "application/x-php",
        "py" => "text/x-python",
        "sh" => "application/x-sh",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(path: &str, contents: &[u8]) -> String {
        DefaultMimeGuesser.guess(path, contents)
    }

    #[test]
    fn test_plain_text_defaults() {
        assert_eq!(guess("file.txt", b"contents"), "text/plain");
        assert_eq!(guess("README", b"hello"), "text/plain");
        assert_eq!(guess("empty", b""), "text/plain");
        assert_eq!(guess(".env", b"KEY=1"), "text/plain");
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(guess("site/style.css", b"body {}"), "text/css");
        assert_eq!(guess("data.JSON", b"{}"), "application/json");
        assert_eq!(guess("dir.d/notes.md", b"# Title"), "text/markdown");
        assert_eq!(guess("archive.tar", b""), "application/x-tar");
    }

    #[test]
    fn test_content_wins_over_extension() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
        assert_eq!(guess("picture.txt", png), "image/png");
        assert_eq!(guess("doc", b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(guess("page.txt", b"  <!DOCTYPE html><html>"), "text/html");
        assert_eq!(guess("feed", b"<?xml version=\"1.0\"?>"), "application/xml");
        assert_eq!(guess("img", b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_unknown_binary() {
        assert_eq!(guess("blob.txt", &[0x00, 0x01, 0x02]), BINARY_MIMETYPE);
        assert_eq!(guess("blob", &[0xfe, 0xfe, 0xfe]), BINARY_MIMETYPE);
    }

    #[test]
    fn test_closure_guesser() {
        let guesser = |path: &str, _: &[u8]| format!("x/{path}");
        assert_eq!(guesser.guess("a", b""), "x/a");
    }
}
