use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use serde_json::{Value, json};
use tracing::{info, warn};

use prism_core::{ChunkRequest, UploadOutcome};

use crate::AppState;
use crate::error::ApiError;

/// `POST /upload`: one chunk per request, multipart form-data.
///
/// Fields: `file` (chunk bytes), `fileName`, `chunkNumber` (1-based),
/// `totalChunks`, `checksum` (hex SHA-256 of this chunk) and, expected on
/// the last chunk, `finalChecksum` (hex SHA-256 of the whole file).
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut chunk_number: Option<String> = None;
    let mut total_chunks: Option<String> = None;
    let mut checksum: Option<String> = None;
    let mut final_checksum: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("failed to read chunk bytes: {e}"))
                })?;
                bytes = Some(data.to_vec());
            }
            Some("fileName") => file_name = Some(text(field).await?),
            Some("chunkNumber") => chunk_number = Some(text(field).await?),
            Some("totalChunks") => total_chunks = Some(text(field).await?),
            Some("checksum") => checksum = Some(text(field).await?),
            Some("finalChecksum") => final_checksum = Some(text(field).await?),
            _ => {}
        }
    }

    let bytes = bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::bad_request("no chunk bytes provided"))?;
    let file_name = file_name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("file name not provided"))?;
    let chunk_index = parse_count(chunk_number.as_deref(), "chunk number")?;
    let total = parse_count(total_chunks.as_deref(), "total chunk count")?;
    let checksum = checksum.ok_or_else(|| ApiError::bad_request("checksum not provided"))?;

    if final_checksum.is_none() && chunk_index == total {
        warn!(
            file = %file_name,
            "final chunk carried no whole-file checksum; whole-file verification will be skipped"
        );
    }

    let req = ChunkRequest {
        file_name,
        chunk_index,
        total_chunks: total,
        checksum,
        final_checksum,
        bytes,
    };
    let name_for_log = req.file_name.clone();

    // assembly + profiling are blocking CPU/disk work; the completion
    // response waits for the profiler to finish
    let assembler = state.assembler.clone();
    let outcome = tokio::task::spawn_blocking(move || assembler.process_chunk(&req))
        .await
        .map_err(|e| ApiError::internal(format!("upload worker failed: {e}")))??;

    match outcome {
        UploadOutcome::InProgress { chunk_index } => {
            info!(file = %name_for_log, chunk = chunk_index, "chunk accepted");
            Ok(Json(json!({
                "status": "in-progress",
                "chunkIndex": chunk_index,
            })))
        }
        UploadOutcome::Complete { colors } => {
            info!(
                file = %name_for_log,
                palette = colors.len(),
                "upload assembled and profiled"
            );
            Ok(Json(json!({
                "status": "complete",
                "colors": colors,
            })))
        }
    }
}

async fn text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed form field: {e}")))
}

fn parse_count(raw: Option<&str>, what: &str) -> Result<u32, ApiError> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .ok_or_else(|| ApiError::bad_request(format!("invalid or missing {what}")))
}
