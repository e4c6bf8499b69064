use crate::storage::Sidecar;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// The images of one directory, in name order, with a cursor.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    images: Vec<PathBuf>,
    index: usize,
}

impl ImageSequence {
    /// Lists the siblings of `current`. `current` is always part of the
    /// sequence even if the directory listing fails.
    pub fn around(current: &Path) -> Self {
        let dir = current
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut images: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image(p))
                .collect(),
            Err(err) => {
                log::warn!("cannot list {}: {err}", dir.display());
                Vec::new()
            }
        };
        let current = dir.join(current.file_name().unwrap_or_default());
        if !images.contains(&current) {
            images.push(current.clone());
        }
        images.sort();
        let index = images.iter().position(|p| *p == current).unwrap_or(0);
        Self { images, index }
    }

    pub fn current(&self) -> &Path {
        &self.images[self.index]
    }

    /// `(zero-based index, count)`.
    pub fn position(&self) -> (usize, usize) {
        (self.index, self.images.len())
    }

    pub fn prev(&self) -> Option<&Path> {
        self.index
            .checked_sub(1)
            .map(|i| self.images[i].as_path())
    }

    pub fn next(&self) -> Option<&Path> {
        self.images.get(self.index + 1).map(PathBuf::as_path)
    }

    /// First later image without human annotations.
    pub fn next_unannotated(&self) -> Option<&Path> {
        self.images[self.index + 1..]
            .iter()
            .find(|p| {
                Sidecar::load(p)
                    .map(|s| !s.is_human_annotated())
                    .unwrap_or(true)
            })
            .map(PathBuf::as_path)
    }

    /// Moves the cursor onto `path` if it belongs to the sequence.
    pub fn go_to(&mut self, path: &Path) -> bool {
        match self.images.iter().position(|p| p == path) {
            Some(i) => {
                self.index = i;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PersistedPoint;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn walks_images_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.png");
        let b = touch(dir.path(), "b.JPG");
        touch(dir.path(), "notes.txt");
        let c = touch(dir.path(), "c.tif");

        let mut seq = ImageSequence::around(&b);
        assert_eq!(seq.position(), (1, 3));
        assert_eq!(seq.prev(), Some(a.as_path()));
        assert_eq!(seq.next(), Some(c.as_path()));

        assert!(seq.go_to(&c));
        assert_eq!(seq.next(), None);
        assert_eq!(seq.current(), c.as_path());
        assert!(!seq.go_to(&dir.path().join("notes.txt")));
    }

    #[test]
    fn skips_annotated_images() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.png");
        let b = touch(dir.path(), "b.png");
        let c = touch(dir.path(), "c.png");
        Sidecar {
            annotations: vec![PersistedPoint { x: 1.0, y: 1.0 }],
            ..Default::default()
        }
        .save(&b)
        .unwrap();

        let seq = ImageSequence::around(&a);
        assert_eq!(seq.next_unannotated(), Some(c.as_path()));
    }
}
