use std::io::{Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::color::profile::profile_colors;
use crate::domain::{ChunkRequest, UploadOutcome};
use crate::error::{PrismError, Result};
use crate::hash::sha256;
use crate::session::{Session, SessionMap};
use crate::store::ChunkStore;
use crate::util::sanitize::clean_file_name;

/// Default time-to-live for abandoned upload sessions.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Receives one chunk at a time, persists and verifies it, and on the call
/// that completes the set concatenates the parts into the final artifact,
/// verifies the whole, and profiles its dominant colors.
pub struct Assembler {
    store: Box<dyn ChunkStore>,
    sessions: SessionMap,
    session_ttl: Duration,
}

impl Assembler {
    pub fn new(store: Box<dyn ChunkStore>) -> Self {
        Self::with_ttl(store, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(store: Box<dyn ChunkStore>, session_ttl: Duration) -> Self {
        Self {
            store,
            sessions: SessionMap::new(),
            session_ttl,
        }
    }

    /// Handle one chunk-upload call.
    ///
    /// Validation failures persist nothing; a chunk checksum mismatch
    /// deletes the just-written artifact and leaves session state
    /// untouched, so the caller can simply re-send the same chunk.
    pub fn process_chunk(&self, req: &ChunkRequest) -> Result<UploadOutcome> {
        let name = clean_file_name(&req.file_name)?;
        if req.bytes.is_empty() {
            return Err(PrismError::InvalidInput("empty chunk payload".into()));
        }
        if req.chunk_index == 0 {
            return Err(PrismError::InvalidInput("chunk index must be >= 1".into()));
        }
        if req.total_chunks == 0 {
            return Err(PrismError::InvalidInput(
                "total chunk count must be >= 1".into(),
            ));
        }
        if req.chunk_index > req.total_chunks {
            return Err(PrismError::InvalidInput(format!(
                "chunk index {} out of range 1..={}",
                req.chunk_index, req.total_chunks
            )));
        }
        sha256::validate_digest_shape(&req.checksum)?;
        if let Some(fc) = &req.final_checksum {
            sha256::validate_digest_shape(fc)?;
        }

        // Persist first, then hash what was actually persisted. Retried
        // writes of the same index overwrite (last write wins).
        self.store.put_chunk(&name, req.chunk_index, &req.bytes)?;
        let computed =
            sha256::digest_reader(&mut *self.store.read_chunk(&name, req.chunk_index)?)?;
        if computed != req.checksum {
            self.store.delete_chunk(&name, req.chunk_index)?;
            return Err(PrismError::ChunkChecksum {
                index: req.chunk_index,
            });
        }

        let entry = self.sessions.entry(&name);
        let mut session = lock(&entry)?;

        if session.received.is_empty() {
            session.total = req.total_chunks;
        } else if session.total != req.total_chunks {
            // the freshly persisted chunk is unusable under a conflicting total
            let _ = self.store.delete_chunk(&name, req.chunk_index);
            return Err(PrismError::InvalidInput(format!(
                "total chunk count {} conflicts with active session total {}",
                req.total_chunks, session.total
            )));
        }
        session.received.insert(req.chunk_index);

        if !session.is_complete() {
            return Ok(UploadOutcome::InProgress {
                chunk_index: req.chunk_index,
            });
        }

        // Completion runs under the per-file lock so two requests that both
        // observe a full set cannot assemble (or double-delete parts) twice.
        if let Err(e) = self.assemble(&name, session.total, req.final_checksum.as_deref()) {
            self.reconcile(&name, &mut session);
            return Err(e);
        }
        self.sessions.remove(&name);
        drop(session);

        let mut assembled = Vec::new();
        self.store
            .read_artifact(&name)?
            .read_to_end(&mut assembled)?;
        Ok(UploadOutcome::Complete {
            colors: profile_colors(&assembled),
        })
    }

    /// Fold chunk artifacts 1..=total, in that order, into a staged final
    /// artifact and publish it; then verify the whole against the claimed
    /// final checksum if one was supplied.
    fn assemble(&self, name: &str, total: u32, final_checksum: Option<&str>) -> Result<()> {
        let mut out = self.store.begin_artifact(name)?;
        let mut buf = vec![0u8; 1 << 16];
        for index in 1..=total {
            let mut part = self.store.read_chunk(name, index)?;
            loop {
                let n = part.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n])?;
            }
            // parts are consumed as they fold; a failed assembly is
            // recoverable by re-uploading whatever is now missing
            self.store.delete_chunk(name, index)?;
        }
        out.commit()?;

        if let Some(claimed) = final_checksum {
            let got = sha256::digest_reader(&mut *self.store.read_artifact(name)?)?;
            if got != claimed {
                self.store.delete_artifact(name)?;
                return Err(PrismError::FinalChecksum);
            }
        }
        Ok(())
    }

    /// After a failed assembly, re-derive session membership from what is
    /// still in the store so retried chunks can re-supply the consumed ones.
    fn reconcile(&self, name: &str, session: &mut Session) {
        session.received.retain(|&i| self.store.chunk_exists(name, i));
    }

    /// Drop sessions older than the TTL and delete their leftover chunk
    /// artifacts. Returns the number of sessions reaped.
    pub fn sweep_expired(&self) -> Result<usize> {
        let expired = self.sessions.take_expired(self.session_ttl);
        for (name, total) in &expired {
            for index in 1..=*total {
                self.store.delete_chunk(name, index)?;
            }
        }
        Ok(expired.len())
    }
}

fn lock(entry: &Arc<Mutex<Session>>) -> Result<MutexGuard<'_, Session>> {
    entry
        .lock()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()).into())
}
