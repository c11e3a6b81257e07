use crate::error::Result;
use std::io::{Read, Write};

/// Byte-addressable store for upload artifacts.
///
/// Chunk artifacts are keyed by (file name, 1-based index); assembled
/// artifacts live in a separate key space under the bare name.
/// Implementations must make same-key chunk writes idempotent (last write
/// wins) and tolerate deletes of already-missing keys.
pub trait ChunkStore: Send + Sync {
    fn put_chunk(&self, name: &str, index: u32, bytes: &[u8]) -> Result<()>;

    fn read_chunk(&self, name: &str, index: u32) -> Result<Box<dyn Read + Send>>;

    fn chunk_exists(&self, name: &str, index: u32) -> bool;

    fn delete_chunk(&self, name: &str, index: u32) -> Result<()>;

    /// Open a staging sink for the assembled artifact. Nothing becomes
    /// visible under the artifact key until `commit`.
    fn begin_artifact(&self, name: &str) -> Result<Box<dyn ArtifactSink>>;

    fn read_artifact(&self, name: &str) -> Result<Box<dyn Read + Send>>;

    fn delete_artifact(&self, name: &str) -> Result<()>;
}

/// Write half of an in-flight assembled artifact.
pub trait ArtifactSink: Write + Send {
    /// Publish the staged bytes under the artifact key.
    fn commit(self: Box<Self>) -> Result<()>;
}
