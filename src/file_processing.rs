/// Ensures an input path exists and is a regular file.
///
/// # Arguments
/// * `path` - Input CSV path.
///
/// # Returns
/// * `anyhow::Result<()>` - Error naming the path if it is missing or a directory.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", path.display()));
    }
    if !path.is_file() {
        return Err(anyhow::anyhow!("Input path is not a file: {}", path.display()));
    }
    anyhow::Ok(())
}

/// Creates the output directory (and its parents) if needed.
pub fn ensure_dir_exists<P: AsRef<std::path::Path>>(dir: P) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("Failed to create output directory {}: {}", dir.display(), e))?;
    }
    anyhow::Ok(())
}
