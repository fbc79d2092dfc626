//! Reading and writing corpus documents.
//!
//! Documents are TIGER-style XML: one `<s>` per sentence with a `<graph>` of terminals (and optionally
//! nonterminals) and a `<sem>` layer of frames. See [read] and [write].

use std::path::{Path, PathBuf};

use crate::Error;

pub mod conll;
pub mod heads;
pub mod read;
pub mod write;

pub use read::{parse_document, read_document};
pub use write::{strip_frames, write_document};

/// An explicit list of documents to process, resolved once up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkList {
    paths: Vec<PathBuf>,
}

impl WorkList {
    /// Collects all `*.xml` files directly inside `dir` (not recursing into subdirectories), sorted by path.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let mut paths = Vec::new();

        for entry in fs_err::read_dir(dir.as_ref())? {
            let path = entry?.path();

            if path.is_file() && path.extension().map_or(false, |x| x == "xml") {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(WorkList { paths })
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        WorkList { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(|x| x.as_path())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The path a document is written to in the output directory: same file name, different directory.
    pub fn output_path<P: AsRef<Path>>(path: &Path, out_dir: P) -> PathBuf {
        match path.file_name() {
            Some(name) => out_dir.as_ref().join(name),
            None => out_dir.as_ref().join(path),
        }
    }
}

/// The id of a document read from `path`: its file stem.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default()
}
