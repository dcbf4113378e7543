use chrono::{DateTime, Utc};
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 16;

/// `{YYYYmmddHHMMSS}_{uuid-v4}{.ext}` derived from the client's file name.
pub fn generate_blob_name(client_name: &str, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%d%H%M%S");
    let id = Uuid::new_v4();
    match sanitized_extension(client_name) {
        Some(ext) => format!("{stamp}_{id}.{ext}"),
        None => format!("{stamp}_{id}"),
    }
}

/// Lower-cased ASCII alphanumeric extension, or `None` when the client name
/// carries nothing usable.
pub fn sanitized_extension(client_name: &str) -> Option<String> {
    // Only the final path component matters; browsers may send full paths.
    let base = client_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(client_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }

    let cleaned: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    (!cleaned.is_empty()).then_some(cleaned)
}

/// A generated name never contains separators or dot segments, so anything
/// that does is not ours.
pub fn is_plain_blob_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
