//! TCP service fronting one shared [`PrefixTree`].
//!
//! Every connection speaks the framed protocol from [`codec`]: the client
//! sends a [`Request`], the server answers with exactly one [`Response`], and
//! this repeats until either side hangs up.
//!
//! Replies larger than the server's frame limit are turned into
//! [`Response::Error`] before they are sent, so a big `Keys` or `Complete`
//! answer never costs the client its connection.
//!
//! The tree itself has no synchronization, so all connections go through a
//! single mutex. Operations are short in-memory walks bounded by the key
//! length limit, so holding the lock for the whole operation is fine.
//!
//! [`codec`]: crate::codec

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::runtime::Builder as RuntimeBuilder;
use tokio::spawn;
use tokio::sync::Mutex;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::codec::{payload_len, BytesToType, TypeToBytes, DEFAULT_MAX_FRAME_LEN};
use crate::protocol::{Request, Response};
use crate::PrefixTree;

/// Name of the tokio runtime threads that serve connections
const SERVER_THRD_NAME: &str = "trie-server";

/// Smallest accepted frame limit. Error responses must always fit.
const MIN_FRAME_LEN: usize = 1024;

struct Inner {
    /// The one tree shared by every connection
    tree: Mutex<PrefixTree>,

    /// Largest response payload the server will send
    max_frame_len: usize,
}

/// Serves a shared prefix tree over TCP. Safe to clone and share across
/// threads, as we maintain an Arc to the inner state.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Inner>,
}

impl Default for Server {
    fn default() -> Self {
        Server::new()
    }
}

impl Server {
    /// Creates a server around an empty tree
    pub fn new() -> Self {
        Server::with_tree(PrefixTree::new())
    }

    /// Creates a server around an existing tree
    pub fn with_tree(tree: PrefixTree) -> Self {
        Server::with_frame_limit(tree, DEFAULT_MAX_FRAME_LEN)
    }

    /// Creates a server around an existing tree that answers with at most
    /// `max_frame_len` payload bytes per response. Limits below 1 KiB are
    /// raised to 1 KiB.
    pub fn with_frame_limit(tree: PrefixTree, max_frame_len: usize) -> Self {
        Server {
            inner: Arc::new(Inner {
                tree: Mutex::new(tree),
                max_frame_len: max_frame_len.max(MIN_FRAME_LEN),
            }),
        }
    }

    /// Binds a listener on `addr`
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<TcpListener> {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Accepts connections on `listener` forever, spawning one task per
    /// connection. Only returns if the listener stops yielding connections.
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        let mut listener = TcpListenerStream::new(listener);

        while let Some(conn) = listener.next().await {
            let stream = match conn {
                Ok(stream) => stream,
                Err(e) => {
                    info!("Error accepting connection: {}", e);
                    continue;
                }
            };

            let inner = self.inner.clone();
            spawn(async move {
                inner.handle_connection(stream).await;
            });
        }

        Ok(())
    }

    /// Binds `addr` and serves it on a fresh multi-threaded tokio runtime.
    ///
    /// This function blocks forever unless binding fails.
    pub fn run_blocking(&self, addr: &str) -> io::Result<()> {
        let rt = RuntimeBuilder::new_multi_thread()
            .thread_name(SERVER_THRD_NAME)
            .enable_all()
            .build()?;

        rt.block_on(async {
            let listener = Server::bind(addr).await?;
            self.serve(listener).await
        })
    }

    /// Runs a request against the shared tree, as if it came over the wire
    pub async fn handle_request(&self, req: Request) -> Response {
        self.inner.handle_request(req).await
    }
}

impl Inner {
    /// Main loop for one connection: read a request, answer it, repeat
    async fn handle_connection(&self, conn: TcpStream) {
        let peer = conn
            .peer_addr()
            .map_or_else(|_| "unknown".to_string(), |addr: SocketAddr| addr.to_string());
        info!("Connection from {}", peer);

        // split up the connection and create framed encoders and decoders for
        // each half
        let (stream, sink) = conn.into_split();
        let mut req_rx = FramedRead::new(stream, BytesToType::<Request>::default());
        let mut resp_tx = FramedWrite::new(
            sink,
            TypeToBytes::<Response>::with_max_frame_len(self.max_frame_len),
        );

        loop {
            let req = match req_rx.next().await {
                Some(Ok(req)) => req,
                Some(Err(e)) => {
                    info!("Error reading request from {}: {}", peer, e);
                    break;
                }
                None => {
                    info!("Connection from {} closed", peer);
                    break;
                }
            };

            let resp = self.handle_request(req).await;

            if let Err(e) = resp_tx.send(resp).await {
                info!("Error sending response to {}: {}", peer, e);
                break;
            }
        }
    }

    /// Applies a single request to the tree and builds the response
    async fn handle_request(&self, req: Request) -> Response {
        debug!("Handling {:?}", req);
        let mut tree = self.tree.lock().await;

        let result = match req {
            Request::Insert(key) => tree.add(&key).map(Response::Insert),
            Request::Delete(key) => tree.remove(&key).map(Response::Delete),
            Request::Exists(key) => tree.has(&key).map(Response::Exists),
            Request::Complete(prefix) => tree.matches(&prefix).map(Response::Complete),
            Request::Keys => Ok(Response::Keys(tree.keys())),
            Request::Size => Ok(Response::Size(tree.size() as u64)),
            Request::Reset => Ok(Response::Reset(tree.reset())),
        };
        drop(tree);

        let resp = result.unwrap_or_else(|e| {
            debug!("Rejected request: {}", e);
            Response::Error(e.to_string())
        });
        self.fit_frame(resp)
    }

    /// Replaces a response that would exceed the frame limit with an error
    fn fit_frame(&self, resp: Response) -> Response {
        match payload_len(&resp) {
            Ok(len) if len > self.max_frame_len => {
                info!(
                    "Response of {} bytes exceeds frame limit of {}",
                    len, self.max_frame_len
                );
                Response::Error(format!(
                    "response too large ({} bytes, limit is {})",
                    len, self.max_frame_len
                ))
            }
            _ => resp,
        }
    }
}
