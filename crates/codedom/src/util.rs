use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling of `path` that receives the payload before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    if name.is_empty() {
        name.push("codedom");
    }
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replaces `path` with `data` in one rename, so readers never observe a
/// half-written file. Missing parent directories are created.  
/// 先寫入同目錄的暫存檔並同步至磁碟，再以 rename 一次取代目標檔案。
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let staging = staging_path(path);
    let mut file = File::create(&staging)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&staging, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replaces_existing_file_and_leaves_no_staging_copy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("tree.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!staging_path(&path).exists());
        assert_eq!(staging_path(&path).file_name().unwrap(), "tree.json.tmp");
    }
}
