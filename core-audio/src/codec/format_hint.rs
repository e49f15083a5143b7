//! Probe hints for symphonia's format detection.

use symphonia::core::probe::Hint;

/// Build a probe hint from a MIME type such as `audio/mpeg`.
///
/// Unknown types produce an empty hint and symphonia falls back to sniffing.
pub fn hint_from_mime_type(mime_type: &str) -> Hint {
    let mut hint = Hint::new();
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some(extension) = extension_for_mime_type(&essence) {
        hint.with_extension(extension);
    }
    hint.mime_type(&essence);
    hint
}

/// Build a probe hint from a file name's extension.
pub fn hint_from_file_name(file_name: &str) -> Hint {
    let mut hint = Hint::new();
    if let Some((_, extension)) = file_name.rsplit_once('.') {
        if !extension.is_empty() {
            hint.with_extension(&extension.to_ascii_lowercase());
        }
    }
    hint
}

/// File extension usually paired with a MIME type.
pub fn extension_for_mime_type(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/wav" | "audio/wave" | "audio/x-wav" => Some("wav"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        "audio/ogg" | "audio/vorbis" => Some("ogg"),
        "audio/mp4" | "audio/aac" | "audio/x-m4a" => Some("m4a"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mime_types() {
        assert_eq!(extension_for_mime_type("audio/mpeg"), Some("mp3"));
        assert_eq!(extension_for_mime_type("audio/x-wav"), Some("wav"));
        assert_eq!(extension_for_mime_type("text/plain"), None);
    }

    #[test]
    fn test_hints_do_not_panic_on_odd_input() {
        let _ = hint_from_mime_type("audio/mpeg; charset=binary");
        let _ = hint_from_mime_type("");
        let _ = hint_from_file_name("no_extension");
        let _ = hint_from_file_name("trailing.");
    }
}
