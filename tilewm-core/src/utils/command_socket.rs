//! Listens on a Unix socket for control requests, one line each, and answers every one
//! with a single `<status> <message>` line.
use crate::Command;
use crate::errors::{Result, TileError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

/// What a peer can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Re-read the configuration and apply it.
    Reload,
    /// Check the configuration without applying it.
    Validate,
    Command(Command),
}

impl FromStr for Request {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "reload" => Ok(Self::Reload),
            "validate" => Ok(Self::Validate),
            other => other
                .parse()
                .map(Self::Command)
                .map_err(TileError::UnknownRequest),
        }
    }
}

/// The answer to a request. Status 0 means success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: i32,
    pub message: String,
}

impl Reply {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: 1,
            message: message.into(),
        }
    }

    /// Parse a reply line as written by `Display`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let (status, message) = line.trim_end().split_once(' ').unwrap_or((line.trim_end(), ""));
        Some(Self {
            status: status.parse().ok()?,
            message: message.to_string(),
        })
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep the answer on one line whatever the message holds.
        write!(f, "{} {}", self.status, self.message.replace('\n', "; "))
    }
}

/// A request together with the way back to whoever sent it.
#[derive(Debug)]
pub struct PendingRequest {
    pub request: Request,
    responder: oneshot::Sender<Reply>,
}

impl PendingRequest {
    pub fn respond(self, reply: Reply) {
        // The peer may have hung up already, nothing to do then.
        self.responder.send(reply).ok();
    }
}

#[derive(Debug, Default)]
pub struct CommandSocket {
    rx: Option<mpsc::UnboundedReceiver<PendingRequest>>,
    listener: Option<tokio::task::JoinHandle<()>>,
    socket_file: PathBuf,
}

impl Drop for CommandSocket {
    fn drop(&mut self) {
        assert!(
            std::thread::panicking() || self.listener.is_none(),
            "CommandSocket has to be shutdown explicitly before drop"
        );
    }
}

impl CommandSocket {
    /// Bind to the Unix socket and start accepting peers.
    ///
    /// # Errors
    ///
    /// Will error if the socket file cannot be bound, likely a filesystem issue such as
    /// inadequate permissions.
    pub async fn listen(&mut self, socket_file: PathBuf) -> Result<()> {
        self.socket_file = socket_file;
        let listener = match UnixListener::bind(&self.socket_file) {
            Ok(listener) => listener,
            Err(_) => {
                fs::remove_file(&self.socket_file).await?;
                UnixListener::bind(&self.socket_file)?
            }
        };
        let (tx, rx) = mpsc::unbounded_channel();
        self.rx = Some(rx);
        self.listener = Some(tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((peer, _)) => {
                        tokio::spawn(serve_peer(peer, tx.clone()));
                    }
                    Err(e) => tracing::error!("Accept failed = {:?}", e),
                }
            }
        }));
        Ok(())
    }

    /// Explicitly shutdown `CommandSocket` to perform cleanup.
    pub async fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            listener.await.ok();
            fs::remove_file(self.socket_file.as_path()).await.ok();
        }
        self.rx = None;
    }

    /// Wait for the next well formed request. Never resolves when not listening.
    pub async fn read_request(&mut self) -> Option<PendingRequest> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }
}

async fn serve_peer(peer: UnixStream, tx: mpsc::UnboundedSender<PendingRequest>) {
    let (read, mut write) = peer.into_split();
    let mut lines = BufReader::new(read).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match line.parse::<Request>() {
            Ok(request) => {
                let (responder, answer) = oneshot::channel();
                if tx.send(PendingRequest { request, responder }).is_err() {
                    return;
                }
                answer
                    .await
                    .unwrap_or_else(|_| Reply::error("request dropped"))
            }
            Err(err) => {
                tracing::warn!("Rejecting control request `{line}`: {err}");
                Reply::error(err.to_string())
            }
        };
        let mut answer = reply.to_string();
        answer.push('\n');
        if write.write_all(answer.as_bytes()).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::helpers::test::temp_path;

    async fn send(socket_file: &std::path::Path, line: &str) -> String {
        let mut stream = UnixStream::connect(socket_file).await.unwrap();
        stream.write_all(format!("{line}\n").as_bytes()).await.unwrap();
        BufReader::new(stream)
            .lines()
            .next_line()
            .await
            .expect("Read next line")
            .unwrap()
    }

    #[test]
    fn requests_are_parsed() {
        assert_eq!("reload".parse::<Request>().unwrap(), Request::Reload);
        assert_eq!(" validate ".parse::<Request>().unwrap(), Request::Validate);
        assert_eq!(
            "SwitchWorkspace 2".parse::<Request>().unwrap(),
            Request::Command(Command::SwitchWorkspace(1))
        );
        assert!("Frobnicate".parse::<Request>().is_err());
    }

    #[test]
    fn replies_stay_on_one_line() {
        let reply = Reply::error("line 1: fatal: a\nline 2: fatal: b");
        assert_eq!(reply.to_string(), "1 line 1: fatal: a; line 2: fatal: b");
        assert_eq!(Reply::parse("0 ok"), Some(Reply::ok("ok")));
        assert_eq!(Reply::parse("garbage"), None);
    }

    #[tokio::test]
    async fn requests_are_answered() {
        let socket_file = temp_path().await.unwrap();
        let mut socket = CommandSocket::default();
        socket.listen(socket_file.clone()).await.unwrap();

        let peer = tokio::spawn({
            let socket_file = socket_file.clone();
            async move { send(&socket_file, "Quit").await }
        });
        let pending = socket.read_request().await.unwrap();
        assert_eq!(pending.request, Request::Command(Command::Quit));
        pending.respond(Reply::ok("bye"));
        assert_eq!(peer.await.unwrap(), "0 bye");

        socket.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_requests_are_refused_without_reaching_the_manager() {
        let socket_file = temp_path().await.unwrap();
        let mut socket = CommandSocket::default();
        socket.listen(socket_file.clone()).await.unwrap();

        let reply = send(&socket_file, "Frobnicate").await;
        assert!(reply.starts_with("1 "), "got {reply}");

        socket.shutdown().await;
        assert!(!socket_file.exists());
    }
}
