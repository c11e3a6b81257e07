use std::path::PathBuf;

use crate::error::Result;
use crate::store::ChunkStore;
use crate::store_fs::FsChunkStore;

pub enum Backend {
    Fs,
}

#[derive(Clone, Debug)]
pub struct StoreParams {
    pub root: PathBuf,
}

pub fn open_store(backend: Backend, p: StoreParams) -> Result<Box<dyn ChunkStore>> {
    match backend {
        Backend::Fs => Ok(Box::new(FsChunkStore::new(&p.root)?)),
    }
}
