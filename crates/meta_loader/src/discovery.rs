//! Loading class descriptors from YAML domain documents.

use std::fs;
use std::path::{Path, PathBuf};

use meta_model::{ClassUniverse, DomainDocument};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{LoaderError, LoaderResult};

/// A directory tree of domain documents.
///
/// Every `*.yaml` / `*.yml` file under the root holds a `classes:` list.
#[derive(Debug, Clone)]
pub struct DomainSource {
    root: PathBuf,
}

impl DomainSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Document paths in a stable order.
    pub fn files(&self) -> Vec<PathBuf> {
        if self.root.is_file() {
            return vec![self.root.clone()];
        }
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.is_file() && path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        files.sort();
        files
    }

    /// Read one document.
    pub fn read_document(path: impl AsRef<Path>) -> LoaderResult<DomainDocument> {
        let path = path.as_ref();
        debug!("Reading domain document {:?}", path);

        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| LoaderError::InvalidDocument {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read every document into a universe. A class declared twice keeps
    /// the declaration from the later file.
    pub fn load(&self) -> LoaderResult<ClassUniverse> {
        if !self.root.exists() {
            return Err(LoaderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("domain source not found: {}", self.root.display()),
            )));
        }

        let mut universe = ClassUniverse::new();
        let files = self.files();
        let mut classes = 0;
        for path in &files {
            for class in Self::read_document(path)?.classes {
                if let Some(previous) = universe.register(class) {
                    warn!("Class {} declared more than once; {:?} wins", previous.name, path);
                }
                classes += 1;
            }
        }
        info!("Loaded {} classes from {} document(s)", classes, files.len());
        Ok(universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CUSTOMER: &str = r#"
classes:
  - name: shop.Customer
    sort: entity
    methods:
      - name: getName
        returns: String
"#;

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("customer.yaml"), CUSTOMER).unwrap();
        fs::write(
            dir.path().join("nested/order.yml"),
            "classes:\n  - name: shop.Order\n    sort: entity\n",
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a document").unwrap();

        let source = DomainSource::new(dir.path());
        assert_eq!(source.files().len(), 2);

        let universe = source.load().unwrap();
        assert!(universe.contains("shop.Customer"));
        assert!(universe.contains("shop.Order"));
        assert!(universe.contains("String"));
    }

    #[test]
    fn test_invalid_document() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.yaml"), "classes: [ {name: ").unwrap();

        let err = DomainSource::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDocument { .. }));
    }

    #[test]
    fn test_missing_root() {
        let source = DomainSource::new("/nonexistent/domain");
        assert!(matches!(source.load(), Err(LoaderError::Io(_))));
    }
}
