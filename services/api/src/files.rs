//! Upload validation, storage and text decoding

use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::info;

/// Extensions accepted by the upload endpoint
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["txt", "pdf", "png", "jpg", "jpeg"];

/// Lower-cased extension of a file name, if any
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Check size and extension of an uploaded file
pub fn validate_upload(filename: &str, size: usize, max_file_size: usize) -> Result<(), String> {
    if size > max_file_size {
        return Err(format!(
            "File size exceeds maximum allowed size of {} bytes",
            max_file_size
        ));
    }

    match extension(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "File type .{} not supported. Allowed types: {}",
            ext,
            allowed_list()
        )),
        None => Err(format!(
            "File has no extension. Allowed types: {}",
            allowed_list()
        )),
    }
}

fn allowed_list() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strip any directory components from a client-supplied file name
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next()?.trim();

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    Some(name.to_string())
}

/// Decode a text file as UTF-8, falling back to Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Write a file into `dir` without overwriting: `name.ext`, `name_1.ext`, `name_2.ext`, ...
pub async fn save_file(dir: &Path, filename: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter = 0u32;
    loop {
        let candidate = match (counter, &ext) {
            (0, _) => dir.join(filename),
            (n, Some(ext)) => dir.join(format!("{}_{}.{}", stem, n, ext)),
            (n, None) => dir.join(format!("{}_{}", stem, n)),
        };

        // create_new makes the existence check and the creation one step
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(mut file) => {
                file.write_all(contents).await?;
                info!("Stored upload at {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_size_and_extension() {
        assert!(validate_upload("notes.TXT", 10, 100).is_ok());
        assert!(validate_upload("photo.jpeg", 100, 100).is_ok());
        assert!(validate_upload("notes.txt", 101, 100).is_err());
        assert!(validate_upload("script.exe", 10, 100).is_err());
        assert!(validate_upload("README", 10, 100).is_err());
    }

    #[test]
    fn strips_directories_from_names() {
        assert_eq!(sanitize_filename("../../etc/passwd"), Some("passwd".to_string()));
        assert_eq!(sanitize_filename("C:\\docs\\a.txt"), Some("a.txt".to_string()));
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".."), None);
    }

    #[test]
    fn decodes_utf8_with_latin1_fallback() {
        assert_eq!(decode_text("héllo".as_bytes()), "héllo");
        assert_eq!(decode_text(&[0x68, 0xE9]), "hé");
    }

    #[tokio::test]
    async fn save_file_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");

        let first = save_file(&uploads, "notes.txt", b"one").await.unwrap();
        let second = save_file(&uploads, "notes.txt", b"two").await.unwrap();
        let third = save_file(&uploads, "notes.txt", b"three").await.unwrap();

        assert_eq!(first, uploads.join("notes.txt"));
        assert_eq!(second, uploads.join("notes_1.txt"));
        assert_eq!(third, uploads.join("notes_2.txt"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&third).unwrap(), b"three");
    }
}
