//! Model asset lookup.

use std::path::Path;

use anyhow::{ensure, Result};

/// Fails with a download hint when a model asset is missing.
///
/// # Errors
///
/// Returns an error naming the asset if the file does not exist.
pub fn require_asset(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure!(
        path.is_file(),
        "model asset not found: {} (place the weights bundle next to the binary)",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_asset() {
        let err = require_asset("/nonexistent/face_landmarker.safetensors").unwrap_err();
        assert!(err.to_string().contains("face_landmarker.safetensors"));
    }

    #[test]
    fn test_present_asset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, b"weights").unwrap();

        assert!(require_asset(&path).is_ok());
    }
}
