use super::Element;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::Path;

/// Load an element tree from a JSON file.
pub fn load_element(path: &Path) -> Result<Element> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open document at {}", path.display()))?;

    let element: Element = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse document at {}", path.display()))?;

    Ok(element)
}

/// Save an element tree to a JSON file atomically
///
/// The file is either fully replaced or left untouched. Missing parent
/// directories are created.
pub fn save_element(path: &Path, element: &Element) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, element).context("Failed to serialize document")?;

    file.commit().context("Failed to save document")?;

    Ok(())
}
