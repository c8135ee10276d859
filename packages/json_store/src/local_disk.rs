//! Byte store over a local directory.
//!
//! Each key lives in its own file. The file name is the lowercase hex of the
//! key bytes plus `.rec`. Hex names longer than [`SEGMENT_LEN`] characters
//! are split into nested directories of exactly that many characters, so
//! every path component stays under common file name limits:
//!
//! ```text
//! root/
//!   6b6579.rec            "key"
//!   6161...61/            first 64 bytes of a long key
//!     6262.rec            the rest
//! ```
//!
//! Writes go to a temp file in the target directory and are renamed over the
//! record, so a reader never sees a half-written file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::{fs, io};

use bytes::Bytes;
use kvdoc_ll_store::{LLBatch, LLError, LLOp, LLReader, LLWriter};
use lazy_static::lazy_static;
use regex::Regex;

/// Hex characters per path component.
pub const SEGMENT_LEN: usize = 128;

const RECORD_EXT: &str = "rec";
const TEMP_EXT: &str = "tmp";

lazy_static! {
    static ref RECORD_FILE: Regex = Regex::new(r"^((?:[0-9a-f]{2}){1,64})\.rec$").unwrap();
    static ref SEGMENT_DIR: Regex = Regex::new(r"^(?:[0-9a-f]{2}){64}$").unwrap();
    static ref TEMP_FILE: Regex = Regex::new(r"^(?:[0-9a-f]{2})+\.[0-9]+\.tmp$").unwrap();
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors opening a local store.
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("store root {} is unusable: {error}", path.display())]
    RootPathInvalid {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl From<LocalStoreError> for LLError {
    fn from(e: LocalStoreError) -> Self {
        LLError::transport(e)
    }
}

/// A byte store keeping one file per key under a root directory.
#[derive(Debug)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    /// Open a store rooted at an existing, writable directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let root = root.into();
        let attr = fs::metadata(&root).map_err(|error| LocalStoreError::RootPathInvalid {
            path: root.clone(),
            error,
        })?;

        if !attr.is_dir() {
            return Err(LocalStoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root path must be a directory."),
            });
        }

        if attr.permissions().readonly() {
            return Err(LocalStoreError::RootPathInvalid {
                path: root,
                error: io::Error::other("Root directory must be writable"),
            });
        }

        match root.canonicalize() {
            Ok(root) => {
                tracing::debug!(root = %root.display(), "opened local store");
                Ok(Self { root })
            }
            Err(error) => Err(LocalStoreError::RootPathInvalid { path: root, error }),
        }
    }

    /// Open a store, creating the root directory first if needed.
    pub fn open_or_create(root: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|error| LocalStoreError::RootPathInvalid {
            path: root.clone(),
            error,
        })?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &[u8]) -> Result<PathBuf, LLError> {
        if key.is_empty() {
            return Err(LLError::transport(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty key",
            )));
        }

        let digits = hex::encode(key);
        let mut path = self.root.clone();
        let mut rest = digits.as_str();
        while rest.len() > SEGMENT_LEN {
            let (segment, tail) = rest.split_at(SEGMENT_LEN);
            path.push(segment);
            rest = tail;
        }
        path.push(format!("{rest}.{RECORD_EXT}"));
        Ok(path)
    }

    /// Write `data` next to `target` under a fresh temp name.
    fn stage(target: &Path, data: &[u8]) -> io::Result<PathBuf> {
        use io::Write;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp = target.with_extension(format!("{n}.{TEMP_EXT}"));

        let mut f = fs::File::create(&temp)?;
        let written = f.write_all(data).and_then(|_| f.sync_data());
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        Ok(temp)
    }

    /// Decode a record file's path relative to the root back to key bytes.
    fn key_of(&self, path: &Path) -> Option<Vec<u8>> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut digits = String::new();
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            let name = component.as_os_str().to_str()?;
            if components.peek().is_some() {
                if !SEGMENT_DIR.is_match(name) {
                    return None;
                }
                digits.push_str(name);
            } else {
                digits.push_str(RECORD_FILE.captures(name)?.get(1)?.as_str());
            }
        }
        hex::decode(&digits).ok()
    }
}

impl LLReader for LocalDiskStore {
    fn ll_keys(&mut self) -> Result<Vec<Bytes>, LLError> {
        let mut keys = Vec::new();
        let walker = walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || entry.file_name().to_str().is_some_and(|n| SEGMENT_DIR.is_match(n))
            });

        for entry in walker {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => LLError::from(io),
                None => LLError::corrupt("filesystem loop under store root"),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            match self.key_of(entry.path()) {
                Some(key) => keys.push(Bytes::from(key)),
                None => tracing::debug!(path = %entry.path().display(), "ignoring stray file"),
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn ll_get(&mut self, key: &[u8]) -> Result<Option<Bytes>, LLError> {
        let path = self.record_path(key)?;
        tracing::trace!(path = %path.display(), "reading record");
        match fs::read(&path) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl LLWriter for LocalDiskStore {
    fn ll_put(&mut self, key: &[u8], data: Bytes) -> Result<(), LLError> {
        let path = self.record_path(key)?;
        tracing::trace!(path = %path.display(), len = data.len(), "writing record");
        let temp = Self::stage(&path, &data)?;
        if let Err(e) = fs::rename(&temp, &path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    fn ll_remove(&mut self, key: &[u8]) -> Result<bool, LLError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn ll_clear(&mut self) -> Result<(), LLError> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if entry.file_type()?.is_dir() {
                if SEGMENT_DIR.is_match(name) {
                    fs::remove_dir_all(entry.path())?;
                }
            } else if RECORD_FILE.is_match(name) || TEMP_FILE.is_match(name) {
                fs::remove_file(entry.path())?;
            }
        }
        tracing::debug!(root = %self.root.display(), "cleared local store");
        Ok(())
    }

    /// Stages every put before renaming any of them. If staging fails the
    /// temps are deleted and the store is unchanged.
    fn ll_apply(&mut self, batch: LLBatch) -> Result<(), LLError> {
        let mut steps = Vec::with_capacity(batch.len());
        for op in batch {
            let step = match op {
                LLOp::Put { key, data } => self.record_path(&key).and_then(|target| {
                    let temp = Self::stage(&target, &data)?;
                    Ok(Step::Rename { temp, target })
                }),
                LLOp::Remove { key } => self.record_path(&key).map(Step::Remove),
            };
            match step {
                Ok(step) => steps.push(step),
                Err(e) => {
                    discard(&steps);
                    return Err(e);
                }
            }
        }

        for (i, step) in steps.iter().enumerate() {
            let done = match step {
                Step::Rename { temp, target } => fs::rename(temp, target),
                Step::Remove(path) => match fs::remove_file(path) {
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            if let Err(e) = done {
                tracing::error!(error = %e, step = i, "batch commit failed part way");
                discard(&steps[i..]);
                return Err(e.into());
            }
        }
        Ok(())
    }
}

/// One staged batch operation.
enum Step {
    Rename { temp: PathBuf, target: PathBuf },
    Remove(PathBuf),
}

fn discard(steps: &[Step]) {
    for step in steps {
        if let Step::Rename { temp, .. } = step {
            let _ = fs::remove_file(temp);
        }
    }
}
