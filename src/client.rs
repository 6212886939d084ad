//! Async client for the prefix tree service.

use std::fmt;
use std::io;

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::codec::{BytesToType, CodecError, TypeToBytes, DEFAULT_MAX_FRAME_LEN};
use crate::protocol::{Request, Response};

/// Errors that can occur while talking to the server
#[derive(Debug)]
pub enum ClientError {
    /// Could not connect
    Io(io::Error),
    /// A frame could not be encoded or decoded
    Codec(CodecError),
    /// The server closed the connection before answering
    Closed,
    /// The server rejected the request
    Server(String),
    /// The server answered with a response for a different request
    Unexpected(Response),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(e) => write!(f, "connection error: {}", e),
            ClientError::Codec(e) => write!(f, "protocol error: {}", e),
            ClientError::Closed => write!(f, "connection closed by server"),
            ClientError::Server(msg) => write!(f, "{}", msg),
            ClientError::Unexpected(resp) => write!(f, "unexpected response: {:?}", resp),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Io(e) => Some(e),
            ClientError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        ClientError::Io(e)
    }
}

impl From<CodecError> for ClientError {
    fn from(e: CodecError) -> Self {
        ClientError::Codec(e)
    }
}

/// A single connection to the server. Requests are answered in order, one
/// at a time.
pub struct Client {
    resp_rx: FramedRead<OwnedReadHalf, BytesToType<Response>>,
    req_tx: FramedWrite<OwnedWriteHalf, TypeToBytes<Request>>,
}

impl Client {
    /// Connects to a server at `addr`
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ClientError> {
        Client::connect_with_frame_limit(addr, DEFAULT_MAX_FRAME_LEN).await
    }

    /// Connects to a server at `addr`, accepting responses of up to
    /// `max_frame_len` payload bytes. Use this for servers configured with a
    /// larger limit than the default.
    pub async fn connect_with_frame_limit<A: ToSocketAddrs>(
        addr: A,
        max_frame_len: usize,
    ) -> Result<Self, ClientError> {
        let conn = TcpStream::connect(addr).await?;
        let (stream, sink) = conn.into_split();

        Ok(Client {
            resp_rx: FramedRead::new(stream, BytesToType::with_max_frame_len(max_frame_len)),
            req_tx: FramedWrite::new(sink, TypeToBytes::default()),
        })
    }

    /// Sends a raw request and waits for its response.
    ///
    /// `Response::Error` is returned as-is here; the typed helpers below turn
    /// it into [`ClientError::Server`].
    pub async fn request(&mut self, req: Request) -> Result<Response, ClientError> {
        self.req_tx.send(req).await?;
        match self.resp_rx.next().await {
            Some(resp) => Ok(resp?),
            None => Err(ClientError::Closed),
        }
    }

    /// Adds a key, returning whether the tree changed
    pub async fn insert<K: AsRef<[u8]>>(&mut self, key: K) -> Result<bool, ClientError> {
        match self.request(Request::Insert(key.as_ref().to_vec())).await? {
            Response::Insert(changed) => Ok(changed),
            other => Err(unexpected(other)),
        }
    }

    /// Removes a key, returning whether the tree changed
    pub async fn delete<K: AsRef<[u8]>>(&mut self, key: K) -> Result<bool, ClientError> {
        match self.request(Request::Delete(key.as_ref().to_vec())).await? {
            Response::Delete(changed) => Ok(changed),
            other => Err(unexpected(other)),
        }
    }

    /// Returns whether a key is stored
    pub async fn exists<K: AsRef<[u8]>>(&mut self, key: K) -> Result<bool, ClientError> {
        match self.request(Request::Exists(key.as_ref().to_vec())).await? {
            Response::Exists(found) => Ok(found),
            other => Err(unexpected(other)),
        }
    }

    /// Returns every stored key starting with `prefix`, prefix included
    pub async fn complete<K: AsRef<[u8]>>(&mut self, prefix: K) -> Result<Vec<Vec<u8>>, ClientError> {
        match self.request(Request::Complete(prefix.as_ref().to_vec())).await? {
            Response::Complete(keys) => Ok(keys),
            other => Err(unexpected(other)),
        }
    }

    /// Returns every stored key
    pub async fn keys(&mut self) -> Result<Vec<Vec<u8>>, ClientError> {
        match self.request(Request::Keys).await? {
            Response::Keys(keys) => Ok(keys),
            other => Err(unexpected(other)),
        }
    }

    /// Returns the number of stored keys
    pub async fn size(&mut self) -> Result<u64, ClientError> {
        match self.request(Request::Size).await? {
            Response::Size(size) => Ok(size),
            other => Err(unexpected(other)),
        }
    }

    /// Removes every key
    pub async fn reset(&mut self) -> Result<bool, ClientError> {
        match self.request(Request::Reset).await? {
            Response::Reset(ok) => Ok(ok),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(resp: Response) -> ClientError {
    match resp {
        Response::Error(msg) => ClientError::Server(msg),
        other => ClientError::Unexpected(other),
    }
}
