use std::io::Write;

use tempfile::NamedTempFile;

/// A temp file holding `contents`, removed on drop.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
