use std::io::Cursor;

use bytes::Buf;
use thiserror::Error as ThisError;

/// Wire version every request must carry in its first byte.
pub const PROTOCOL_VERSION: u8 = 1;

/// The argument block length is a single byte, so the combined argument text
/// of a request can never exceed 255 bytes. This is a documented protocol
/// constraint, not an implementation limit.
pub const MAX_ARG_TEXT: usize = u8::MAX as usize;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("unsupported protocol version {0}")]
    BadVersion(u8),
    #[error("argument text exceeds {MAX_ARG_TEXT} bytes")]
    ArgTextTooLong,
}

/// One request as it travels on the wire:
/// `[version:1][opcode:1][arglen:1][argtext:arglen bytes]`, where the
/// argument text is a run of whitespace-separated tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub opcode: u8,
    pub args: Vec<String>,
}

impl Request {
    pub fn new(opcode: u8, args: Vec<String>) -> Request {
        Request { opcode, args }
    }

    /// Parses one frame, advancing the cursor past it. On `Incomplete` the
    /// cursor is left untouched so the caller can retry once more bytes
    /// arrive. A version mismatch still consumes the whole frame, keeping
    /// the stream in sync so the connection can carry on.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Request, Error> {
        if src.remaining() < 3 {
            return Err(Error::Incomplete);
        }

        let buf: &[u8] = *src.get_ref();
        let start = src.position() as usize;
        let (version, opcode, arg_len) = (buf[start], buf[start + 1], buf[start + 2] as usize);

        if src.remaining() < 3 + arg_len {
            return Err(Error::Incomplete);
        }

        let arg_text = &buf[start + 3..start + 3 + arg_len];
        src.set_position((start + 3 + arg_len) as u64);

        if version != PROTOCOL_VERSION {
            return Err(Error::BadVersion(version));
        }

        let args = String::from_utf8_lossy(arg_text)
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(Request { opcode, args })
    }

    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let arg_text = self.args.join(" ");

        if arg_text.len() > MAX_ARG_TEXT {
            return Err(Error::ArgTextTooLong);
        }

        let mut bytes = Vec::with_capacity(3 + arg_text.len());
        bytes.push(PROTOCOL_VERSION);
        bytes.push(self.opcode);
        bytes.push(arg_text.len() as u8);
        bytes.extend_from_slice(arg_text.as_bytes());

        Ok(bytes)
    }
}

/// Responses are unstructured: a single line of text terminated by CRLF.
/// Failure lines carry the `ERROR: ` prefix; that prefix is the only
/// success/failure signal the protocol has.
pub fn encode_response(line: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(line.len() + CRLF.len());
    bytes.extend_from_slice(line.as_bytes());
    bytes.extend_from_slice(CRLF);
    bytes
}
