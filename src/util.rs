use std::io::Write;
use std::path::Path;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Write `bytes` to `path` atomically: write a sibling temp file, flush,
/// then rename over the target. Readers never observe a half-written file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Case-insensitive identity key for a tag name.
pub fn tag_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Strip diacritics: "Électricien" → "Electricien".
pub fn remove_accents(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercase + accent-folded form used for tag search.
pub fn fold_for_search(value: &str) -> String {
    remove_accents(&value.to_lowercase())
}
