use serde::Serialize;

/// One chunk-upload call, as handed over by the boundary.
#[derive(Clone, Debug)]
pub struct ChunkRequest {
    pub file_name: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub checksum: String,
    pub final_checksum: Option<String>,
    pub bytes: Vec<u8>,
}

/// What a single chunk-upload call produced.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadOutcome {
    InProgress { chunk_index: u32 },
    Complete { colors: Vec<ColorResult> },
}

/// One ranked palette entry: `#rrggbb` plus its share of the top-5 sample
/// mass, rounded to two decimals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorResult {
    pub color: String,
    pub percentage: f64,
}
