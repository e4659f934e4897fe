use std::path::PathBuf;

/// Parse a path argument that must name an existing directory.
///
/// # Errors
///
/// Returns an error message if the path is empty, missing, or not a directory.
pub fn parse_directory(s: &str) -> Result<PathBuf, String> {
    if s.is_empty() {
        return Err("Directory cannot be empty".to_string());
    }

    let path = PathBuf::from(s);
    if !path.exists() {
        return Err(format!("Directory does not exist: '{}'", s));
    }
    if !path.is_dir() {
        return Err(format!("Not a directory: '{}'", s));
    }

    Ok(path)
}
