use bytes::BytesMut;
use thiserror::Error as ThisError;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio_util::codec::Decoder;
use uuid::Uuid;

use crate::codec::{self, RequestCodec};
use crate::frame::{self, encode_response, Request};

#[derive(Debug, ThisError)]
pub enum Error {
    /// A framing error the connection survives: the handler answers with an
    /// `ERROR: ` line and keeps reading.
    #[error(transparent)]
    Frame(#[from] frame::Error),
    #[error("connection reset by peer")]
    Reset,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<codec::Error> for Error {
    fn from(err: codec::Error) -> Error {
        match err {
            codec::Error::Frame(e) => Error::Frame(e),
            codec::Error::Io(e) => Error::Io(e),
        }
    }
}

/// Buffered frame reader and response-line writer over one TCP stream.
/// Data is read from the socket into the read buffer; when a frame is
/// parsed, the corresponding bytes are removed from the buffer.
pub struct Connection {
    pub id: Uuid,
    stream: BufWriter<TcpStream>,
    buffer: BytesMut,
    codec: RequestCodec,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            stream: BufWriter::new(stream),
            // Frames are at most 258 bytes, 4kb buffers several of them.
            buffer: BytesMut::with_capacity(4096),
            codec: RequestCodec,
        }
    }

    /// Reads the next request frame, waiting for more data on a partial
    /// frame. `Ok(None)` means the peer closed the connection cleanly.
    pub async fn read_frame(&mut self) -> Result<Option<Request>, Error> {
        loop {
            if let Some(request) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(request));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                // EOF in the middle of a frame.
                return Err(Error::Reset);
            }
        }
    }

    /// Writes one CRLF-terminated response line and flushes it.
    pub async fn write_line(&mut self, line: &str) -> Result<(), Error> {
        self.stream.write_all(&encode_response(line)).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
