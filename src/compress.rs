//! Streaming deflate of a file into a [`BoundedBuffer`].
//!
//! The output is a zlib-wrapped deflate stream, which is what HTTP calls
//! `Content-Encoding: deflate`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::{Compress, Compression, FlushCompress, Status};
use tracing::{debug, error};

use crate::buffer::BoundedBuffer;
use crate::error::ErrorCode;

/// Input and output chunk size.
pub const CHUNK_SIZE: usize = 4096;

const COMPRESSION_LEVEL: u32 = 9;

/// Compresses the file at `path` and appends the result to `dest`.
///
/// Returns the number of compressed bytes appended. The capacity check is
/// made against the uncompressed file size before anything is written, so
/// `dest` can never overflow halfway through.
pub fn compress(path: &Path, dest: &mut BoundedBuffer) -> Result<usize, ErrorCode> {
    let mut file = File::open(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "cannot open file");
        ErrorCode::FileNotFound
    })?;

    let file_size = file
        .metadata()
        .map_err(|e| {
            error!(path = %path.display(), error = %e, "cannot stat file");
            ErrorCode::InternalServerError
        })?
        .len() as usize;

    if dest.len() + file_size > dest.capacity() {
        error!(
            path = %path.display(),
            file_size,
            remaining = dest.remaining(),
            "file does not fit into the response buffer"
        );
        return Err(ErrorCode::InternalServerError);
    }

    let chunk_size = file_size.min(CHUNK_SIZE);
    let mut input = vec![0u8; chunk_size];
    let mut output = vec![0u8; CHUNK_SIZE];
    let mut stream = Compress::new(Compression::new(COMPRESSION_LEVEL), true);

    let mut left = file_size;
    let mut total = 0;
    loop {
        let n = left.min(chunk_size);
        file.read_exact(&mut input[..n]).map_err(|e| {
            error!(path = %path.display(), error = %e, "read failed");
            ErrorCode::InternalServerError
        })?;
        left -= n;

        let flush = if left == 0 {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };
        total += deflate_chunk(&mut stream, &input[..n], &mut output, flush, dest)?;

        if left == 0 {
            break;
        }
    }

    debug!(path = %path.display(), file_size, compressed = total, "file compressed");
    Ok(total)
}

/// Feeds one input chunk and drains every output segment into `dest`.
fn deflate_chunk(
    stream: &mut Compress,
    chunk: &[u8],
    output: &mut [u8],
    flush: FlushCompress,
    dest: &mut BoundedBuffer,
) -> Result<usize, ErrorCode> {
    let finishing = matches!(flush, FlushCompress::Finish);
    let mut consumed = 0;
    let mut total = 0;

    loop {
        let before_in = stream.total_in();
        let before_out = stream.total_out();

        let status = stream
            .compress(&chunk[consumed..], output, flush)
            .map_err(|e| {
                error!(error = %e, "deflate failed");
                ErrorCode::InternalServerError
            })?;

        let read = (stream.total_in() - before_in) as usize;
        let produced = (stream.total_out() - before_out) as usize;
        consumed += read;

        if produced > 0 {
            dest.write(&output[..produced])?;
            total += produced;
        }

        if finishing {
            if status == Status::StreamEnd {
                break;
            }
        } else if consumed == chunk.len() && produced < output.len() {
            break;
        }

        if read == 0 && produced == 0 && status == Status::BufError {
            error!("deflate made no progress");
            return Err(ErrorCode::InternalServerError);
        }
    }

    Ok(total)
}
