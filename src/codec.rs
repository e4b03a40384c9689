use std::convert::TryInto;
use std::io::Cursor;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::frame::{self, Request};

/// Stream decoder for request frames. `Connection` drives it directly over
/// its read buffer; an `Incomplete` parse simply means more bytes are needed.
pub struct RequestCodec;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] frame::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Decoder for RequestCodec {
    type Item = Request;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut cursor = Cursor::new(&src[..]);

        let result = match Request::parse(&mut cursor) {
            Ok(request) => Ok(Some(request)),
            Err(frame::Error::Incomplete) => return Ok(None),
            Err(err) => Err(err.into()),
        };

        let position: usize = cursor
            .position()
            .try_into()
            .expect("cursor position is too large");

        // Remove the parsed (or skipped, on a version mismatch) frame from
        // the buffer before reporting the outcome.
        src.advance(position);

        result
    }
}
