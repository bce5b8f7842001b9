//! Line and stream I/O primitives
// (c) 2025 the mftp developers

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads one text line from `reader`, up to (but not including) a newline.
///
/// The newline is consumed but not returned. Returns `Ok(None)` if the stream
/// is at EOF before any byte is read; an EOF part-way through a line returns
/// the bytes accumulated so far.
///
/// Reads are performed one byte at a time so that no data belonging to the
/// next message is consumed. Accumulating `max` bytes with no newline in
/// sight is an error, never a silent truncation.
pub(crate) async fn read_line<R>(reader: &mut R, max: usize) -> std::io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        let n = reader.read(&mut byte).await?;
        if n == 0 {
            if line.is_empty() {
                return Ok(None);
            }
            break;
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
        if line.len() >= max {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("line exceeded {max} bytes without a newline"),
            ));
        }
    }

    String::from_utf8(line)
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Writes one complete text line (newline included) to `writer` as a single
/// buffer, then flushes.
pub(crate) async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Drains `src` into `dst` until `src` reports EOF, flushing `dst` at the
/// end.
///
/// Returns the number of bytes moved.
pub(crate) async fn stream<R, W>(src: &mut R, dst: &mut W) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tokio::io::copy(src, dst).await
}
