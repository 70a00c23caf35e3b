//! Chunked byte stream over a window of a stored file.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use tokio::io::AsyncReadExt;
use tracing::{error, trace};

use super::MediaReader;

/// Read cursor emitting a fixed window of a file in increasing offset order.
///
/// Yields exactly the declared number of bytes, or ends with an error item if
/// the underlying read fails or the file turns out shorter than declared.
/// Dropping the cursor drops the reader and with it the open file handle, which
/// is how a client disconnect releases resources.
pub struct ReadCursor {
    length: u64,
    chunks: BoxStream<'static, io::Result<Bytes>>,
}

struct CursorState {
    reader: Box<dyn MediaReader>,
    position: u64,
    remaining: u64,
    chunk_size: usize,
}

impl ReadCursor {
    pub(crate) fn new(
        reader: Box<dyn MediaReader>,
        start: u64,
        length: u64,
        chunk_size: usize,
    ) -> Self {
        let state = CursorState {
            reader,
            position: start,
            remaining: length,
            chunk_size: chunk_size.max(1),
        };

        // The state is dropped (closing the reader) as soon as the window is
        // exhausted or a read fails, not when the response finishes sending.
        let chunks = stream::unfold(Some(state), |state| async move {
            let mut state = state?;
            if state.remaining == 0 {
                return None;
            }

            let wanted = state.remaining.min(state.chunk_size as u64) as usize;
            let mut buffer = vec![0u8; wanted];

            match state.reader.read(&mut buffer).await {
                Ok(0) => {
                    error!(
                        "File ended at offset {} with {} bytes still expected",
                        state.position, state.remaining
                    );
                    Some((
                        Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "file shorter than declared length",
                        )),
                        None,
                    ))
                }
                Ok(read) => {
                    buffer.truncate(read);
                    trace!("Read {} bytes at offset {}", read, state.position);
                    state.position += read as u64;
                    state.remaining -= read as u64;
                    let next = (state.remaining > 0).then_some(state);
                    Some((Ok(Bytes::from(buffer)), next))
                }
                Err(e) => {
                    error!("Read failed at offset {}: {}", state.position, e);
                    Some((Err(e), None))
                }
            }
        })
        .boxed();

        Self { length, chunks }
    }

    /// Number of bytes this cursor will emit when read to completion.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl Stream for ReadCursor {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().chunks.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for ReadCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadCursor")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
