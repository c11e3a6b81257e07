use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::{ArtifactSink, ChunkStore};

/// Filesystem-backed store: `<root>/<name>.part<index>` for chunks,
/// `<root>/<name>` for the assembled artifact. Assembly stages into
/// `<root>/<name>.assembling` and publishes with a rename, so a
/// half-written artifact is never visible under the final key.
pub struct FsChunkStore {
    root: PathBuf,
}

impl FsChunkStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn chunk_path(&self, name: &str, index: u32) -> PathBuf {
        self.root.join(format!("{name}.part{index}"))
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn staging_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.assembling"))
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl ChunkStore for FsChunkStore {
    fn put_chunk(&self, name: &str, index: u32, bytes: &[u8]) -> Result<()> {
        fs::write(self.chunk_path(name, index), bytes)?;
        Ok(())
    }

    fn read_chunk(&self, name: &str, index: u32) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(self.chunk_path(name, index))?))
    }

    fn chunk_exists(&self, name: &str, index: u32) -> bool {
        self.chunk_path(name, index).exists()
    }

    fn delete_chunk(&self, name: &str, index: u32) -> Result<()> {
        remove_existing(&self.chunk_path(name, index))
    }

    fn begin_artifact(&self, name: &str) -> Result<Box<dyn ArtifactSink>> {
        let staging = self.staging_path(name);
        let file = File::create(&staging)?;
        Ok(Box::new(FsArtifactSink {
            file,
            staging,
            dest: self.artifact_path(name),
        }))
    }

    fn read_artifact(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(self.artifact_path(name))?))
    }

    fn delete_artifact(&self, name: &str) -> Result<()> {
        remove_existing(&self.artifact_path(name))
    }
}

struct FsArtifactSink {
    file: File,
    staging: PathBuf,
    dest: PathBuf,
}

impl Write for FsArtifactSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl ArtifactSink for FsArtifactSink {
    fn commit(mut self: Box<Self>) -> Result<()> {
        self.file.flush()?;
        fs::rename(&self.staging, &self.dest)?;
        Ok(())
    }
}

impl Drop for FsArtifactSink {
    fn drop(&mut self) {
        // no-op after a successful commit (the rename already consumed it)
        let _ = fs::remove_file(&self.staging);
    }
}
