use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
    failing_copies: RwLock<Vec<PathBuf>>,
    failing_removes: RwLock<Vec<PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            root,
            failing_copies: RwLock::new(Vec::new()),
            failing_removes: RwLock::new(Vec::new()),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
    }

    /// Make every later `copy_file` from `path` fail
    pub fn fail_copy_from(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.failing_copies.write().unwrap().push(path);
    }

    /// Make every later `remove_file` or `remove_dir_all` of `path` fail
    pub fn fail_remove(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.failing_removes.write().unwrap().push(path);
    }

    fn check_remove(&self, path: &Path) -> Result<()> {
        if self.failing_removes.read().unwrap().iter().any(|p| p == path) {
            return Err(anyhow!("Failed to remove {:?}: injected failure", path));
        }
        Ok(())
    }

    /// Paths of all files strictly below `dir`, relative to it and sorted
    pub fn files_under(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = self.normalize_path(dir.as_ref());
        let files = self.files.read().unwrap();
        let mut found: Vec<String> = files
            .iter()
            .filter(|(_, e)| e.file_type == FileType::File)
            .filter_map(|(p, _)| p.strip_prefix(&dir).ok())
            .map(|rel| rel.to_string_lossy().to_string())
            .collect();
        found.sort();
        found
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();

        if !files.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        let mut entries: Vec<DirEntry> = files
            .iter()
            .filter(|(file_path, _)| file_path.parent() == Some(path.as_path()))
            .map(|(file_path, entry)| DirEntry {
                path: file_path.clone(),
                name: file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string(),
                file_type: entry.file_type,
            })
            .collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();
        if files
            .get(&path)
            .is_some_and(|e| e.file_type != FileType::Directory)
        {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        Self::ensure_parents(&mut files, &path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        self.check_remove(&path)?;
        let mut files = self.files.write().unwrap();
        if !files.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }
        files.retain(|p, _| !p.starts_with(&path));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        self.check_remove(&path)?;
        let mut files = self.files.write().unwrap();
        match files.get(&path) {
            Some(e) if e.file_type != FileType::Directory => {
                files.remove(&path);
                Ok(())
            }
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let from = self.normalize_path(from);
        if self.failing_copies.read().unwrap().contains(&from) {
            return Err(anyhow!("Failed to copy {:?}: injected failure", from));
        }
        let content = self.read_to_string(&from)?;
        let to = self.normalize_path(to);
        let parent_is_dir = to.parent().map(|p| self.is_dir(p)).unwrap_or(false);
        if !parent_is_dir {
            return Err(anyhow!("Parent directory missing for {:?}", to));
        }
        self.files.write().unwrap().insert(
            to,
            MockEntry {
                content: Some(content),
                file_type: FileType::File,
            },
        );
        Ok(())
    }
}
