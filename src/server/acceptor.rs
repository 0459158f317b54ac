use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::sync::Notify;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::connection::HttpConnection;

/// Accepts inbound connections until stopped, spawning one
/// [`HttpConnection`] task per accept.
///
/// Stopping is cooperative: [`AcceptorHandle::stop`] raises the flag and
/// wakes the loop. An accept resolving at the same moment may still
/// complete and spawn one final handler; the race is bounded to that
/// single connection. The listening socket is dropped only once the
/// loop has exited.
#[derive(Debug)]
pub struct Acceptor {
    listener: TcpListener,
    stopped: Arc<AtomicBool>,
    wakeup: Arc<Notify>,
    tracker: TaskTracker,
}

impl Acceptor {
    pub fn new(listener: TcpListener) -> Self {
        Self {
            listener,
            stopped: Arc::new(AtomicBool::new(false)),
            wakeup: Arc::new(Notify::new()),
            tracker: TaskTracker::new(),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Control handle that stays usable after the acceptor has moved
    /// into its task.
    pub fn handle(&self) -> AcceptorHandle {
        AcceptorHandle {
            stopped: Arc::clone(&self.stopped),
            wakeup: Arc::clone(&self.wakeup),
            tracker: self.tracker.clone(),
        }
    }

    /// The accept loop. Accept failures are logged and the loop keeps
    /// going; only the stop flag ends it.
    pub async fn run(self) {
        loop {
            select! {
                biased;

                result = self.listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => self.spawn_connection(stream, remote_addr),
                        Err(e) => warn!(cause = %e, "failed to accept"),
                    }
                    if self.stopped.load(Ordering::Relaxed) {
                        break;
                    }
                }

                _ = self.wakeup.notified() => break,
            }
        }
        info!("acceptor stopped, closing listener");
    }

    fn spawn_connection(&self, stream: TcpStream, remote_addr: SocketAddr) {
        debug!(remote = %remote_addr, "accepted connection");
        self.tracker.spawn(async move {
            let (reader, writer) = stream.into_split();
            let connection = HttpConnection::new(reader, writer);
            match connection.process().await {
                Ok(()) => debug!(remote = %remote_addr, "finished process, connection shutdown"),
                Err(e) => warn!(remote = %remote_addr, cause = %e, "connection failed, connection shutdown"),
            }
        });
    }
}

/// Clonable control surface for a running [`Acceptor`].
#[derive(Debug, Clone)]
pub struct AcceptorHandle {
    stopped: Arc<AtomicBool>,
    wakeup: Arc<Notify>,
    tracker: TaskTracker,
}

impl AcceptorHandle {
    /// Raises the stop flag and wakes the accept loop. Does not cancel
    /// an accept already resolving.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
        self.wakeup.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Resolves once every spawned connection task has finished.
    pub async fn drained(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
