use std::path::Path;

/// Number of leading bytes inspected when sniffing a payload
pub const SNIFF_LEN: usize = 512;

/// Content types accepted by the upload endpoints
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/gif",
    "image/png",
    "application/pdf",
];

/// Longest original extension carried over to a stored name
const MAX_EXTENSION_LEN: usize = 16;

/// Full leading signatures an allowlisted type must carry. `infer` matches
/// shorter prefixes (`GIF`, `%PDF`, four PNG bytes) that plain text can hit.
const SIGNATURES: &[(&str, &[&[u8]])] = &[
    ("image/jpeg", &[b"\xFF\xD8\xFF"]),
    ("image/gif", &[b"GIF87a", b"GIF89a"]),
    ("image/png", &[b"\x89PNG\r\n\x1A\n"]),
    ("application/pdf", &[b"%PDF-"]),
];

/// Infers the MIME type from the leading bytes of `data`.
/// Whatever the client declared is ignored.
pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    let head = &data[..data.len().min(SNIFF_LEN)];
    let detected = infer::get(head)?.mime_type();

    match SIGNATURES.iter().find(|(mime, _)| *mime == detected) {
        Some((_, prefixes)) if !prefixes.iter().any(|p| head.starts_with(*p)) => {
            tracing::debug!("{} prefix without its full signature", detected);
            None
        }
        _ => Some(detected),
    }
}

/// Sniffs `data` and returns its type if it is on the allowlist.
pub fn allowed_content_type(data: &[u8]) -> Result<&'static str, Option<&'static str>> {
    match sniff_content_type(data) {
        Some(detected) if ALLOWED_MIME_TYPES.contains(&detected) => Ok(detected),
        other => Err(other),
    }
}

/// Extension registered for `mime_type`, without the leading dot.
///
/// The subtype itself wins when it is a registered extension (`image/jpeg`
/// gives `jpeg`, not the alphabetically first `jfif`).
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let exts = mime_guess::get_mime_extensions_str(mime_type)?;
    let subtype = mime_type.split_once('/').map(|(_, sub)| sub.trim());

    exts.iter()
        .find(|ext| Some(**ext) == subtype)
        .or_else(|| exts.first())
        .copied()
}

pub fn exceeds_limit(size: usize, max_size: usize) -> bool {
    size > max_size
}

/// Extension of a client-supplied filename, if it is safe to reuse.
///
/// Only the final path component is looked at; the result is lowercased and
/// restricted to short ASCII alphanumeric strings.
pub fn original_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let ext = Path::new(name).extension()?.to_str()?;

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}

/// Checks that a requested download name is a single plain path segment.
pub fn is_valid_requested_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    if name.contains(['/', '\\', '\0']) {
        tracing::warn!("Path traversal attempt detected: {:?}", name);
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_sniff_allowed_types() {
        assert_eq!(allowed_content_type(PNG), Ok("image/png"));
        assert_eq!(allowed_content_type(JPEG), Ok("image/jpeg"));
        assert_eq!(allowed_content_type(b"GIF89a\x01\x00\x01\x00"), Ok("image/gif"));
        assert_eq!(allowed_content_type(b"%PDF-1.7\n%abc"), Ok("application/pdf"));
    }

    #[test]
    fn test_sniff_rejects_others() {
        assert_eq!(allowed_content_type(b"just some text"), Err(None));
        assert_eq!(allowed_content_type(b""), Err(None));

        let mut elf = vec![0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01, 0x01, 0x00];
        elf.resize(64, 0);
        assert!(allowed_content_type(&elf).is_err());
    }

    #[test]
    fn test_sniff_requires_full_signature() {
        assert_eq!(allowed_content_type(b"GIF is a format I like, this is a note\n"), Err(None));
        assert_eq!(allowed_content_type(b"%PDF is how pdfs start; just text"), Err(None));
        assert_eq!(allowed_content_type(b"\x89PNG but no line endings follow"), Err(None));
        assert_eq!(allowed_content_type(b"GIF87a\x01\x00\x01\x00"), Ok("image/gif"));
    }

    #[test]
    fn test_sniff_only_uses_prefix() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.extend_from_slice(PNG);
        assert_eq!(sniff_content_type(&data), None);
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/gif"), Some("gif"));
        assert_eq!(extension_for("application/pdf"), Some("pdf"));
        assert_eq!(extension_for("image/jpeg"), Some("jpeg"));
        assert_eq!(extension_for("application/x-made-up"), None);
    }

    #[test]
    fn test_exceeds_limit() {
        assert!(!exceeds_limit(1024, 1024));
        assert!(exceeds_limit(1025, 1024));
        assert!(!exceeds_limit(0, 1));
    }

    #[test]
    fn test_original_extension() {
        assert_eq!(original_extension("photo.PNG"), Some("png".to_string()));
        assert_eq!(original_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(original_extension("../../etc/passwd"), None);
        assert_eq!(original_extension("..\\dir\\report.pdf"), Some("pdf".to_string()));
        assert_eq!(original_extension("noext"), None);
        assert_eq!(original_extension(".hidden"), None);
        assert_eq!(original_extension("weird.p<h>p"), None);
    }

    #[test]
    fn test_requested_name() {
        assert!(is_valid_requested_name("foo.png"));
        assert!(is_valid_requested_name("files"));
        assert!(!is_valid_requested_name(""));
        assert!(!is_valid_requested_name(".."));
        assert!(!is_valid_requested_name("../secret"));
        assert!(!is_valid_requested_name("a\\b"));
        assert!(!is_valid_requested_name("nul\0byte"));
    }
}
