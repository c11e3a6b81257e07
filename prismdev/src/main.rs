use clap::{Parser, Subcommand};
use std::path::PathBuf;

use prism_core::error::{PrismError, Result};
use prism_core::hash::sha256::digest_bytes;
use prism_core::{
    Assembler, Backend, ChunkRequest, StoreParams, UploadOutcome, open_store, profile_colors,
};

#[derive(Parser)]
#[command(author, version, about = "prismdev CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file into chunks and feed them through the assembler
    Upload {
        file: PathBuf,

        /// Chunk size in bytes
        #[arg(long, default_value_t = 1024 * 1024)]
        chunk_size: usize,

        /// Directory holding chunk and assembled artifacts
        #[arg(long, default_value = "uploads")]
        store: PathBuf,

        /// Skip whole-file checksum verification
        #[arg(long)]
        skip_final_checksum: bool,
    },

    /// Print the dominant-color palette of an image file
    Profile { image: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            chunk_size,
            store,
            skip_final_checksum,
        } => {
            if chunk_size == 0 {
                return Err(PrismError::InvalidInput("chunk size must be >= 1".into()));
            }
            let data = std::fs::read(&file)?;
            if data.is_empty() {
                return Err(PrismError::InvalidInput(format!(
                    "{} is empty",
                    file.display()
                )));
            }
            let name = file
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("upload.bin")
                .to_string();

            let chunks: Vec<&[u8]> = data.chunks(chunk_size).collect();
            let total = chunks.len() as u32;
            let final_checksum = (!skip_final_checksum).then(|| digest_bytes(&data));

            let assembler = Assembler::new(open_store(Backend::Fs, StoreParams { root: store })?);
            for (i, chunk) in chunks.iter().enumerate() {
                let index = i as u32 + 1;
                let req = ChunkRequest {
                    file_name: name.clone(),
                    chunk_index: index,
                    total_chunks: total,
                    checksum: digest_bytes(chunk),
                    final_checksum: (index == total)
                        .then(|| final_checksum.clone())
                        .flatten(),
                    bytes: chunk.to_vec(),
                };
                match assembler.process_chunk(&req)? {
                    UploadOutcome::InProgress { chunk_index } => {
                        eprintln!("chunk {chunk_index}/{total} accepted");
                    }
                    UploadOutcome::Complete { colors } => {
                        eprintln!("assembled {name} from {total} chunks");
                        print_palette(&colors);
                    }
                }
            }
        }

        Commands::Profile { image } => {
            let bytes = std::fs::read(&image)?;
            print_palette(&profile_colors(&bytes));
        }
    }

    Ok(())
}

fn print_palette(colors: &[prism_core::ColorResult]) {
    if colors.is_empty() {
        println!("(no decodable raster image; palette empty)");
        return;
    }
    for c in colors {
        println!("{} {:.2}%", c.color, c.percentage);
    }
}
