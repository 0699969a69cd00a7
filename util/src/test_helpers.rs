use crate::config::AppConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes `contents` to `rubrics.json` inside a fresh temporary directory and
/// points `RUBRIC_PATH` (and the global config) at it for the duration of the test.
///
/// Keep the returned `TempDir` in scope for as long as you need the file; the
/// directory is removed when it is dropped.
pub fn setup_rubric_file(contents: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let path = tmp.path().join("rubrics.json");
    fs::write(&path, contents).expect("failed to write rubric fixture");

    let abs = path.canonicalize().unwrap_or_else(|_| path.clone());
    unsafe {
        std::env::set_var("RUBRIC_PATH", &abs);
    }
    AppConfig::set_rubric_path(Some(abs.to_string_lossy().into_owned()));
    (tmp, abs)
}

/// Clears any rubric override installed by [`setup_rubric_file`].
pub fn clear_rubric_file() {
    unsafe {
        std::env::remove_var("RUBRIC_PATH");
    }
    AppConfig::set_rubric_path(None);
}
