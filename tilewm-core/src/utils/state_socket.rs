//! Publishes the bar snapshot as one JSON line on a Unix socket whenever it changes.
use crate::errors::{Result, TileError};
use crate::models::Handle;
use crate::models::dto::ManagerState;
use crate::state::State;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Peers {
    streams: Vec<Option<UnixStream>>,
    last_state: String,
}

#[derive(Debug, Default)]
pub struct StateSocket {
    peers: Arc<Mutex<Peers>>,
    listener: Option<tokio::task::JoinHandle<()>>,
    socket_file: PathBuf,
}

impl Drop for StateSocket {
    fn drop(&mut self) {
        assert!(
            std::thread::panicking() || self.listener.is_none(),
            "StateSocket has to be shutdown explicitly before drop"
        );
    }
}

impl StateSocket {
    /// Bind the socket, replacing a stale socket file, and start accepting bars.
    ///
    /// # Errors
    ///
    /// Will error if the socket file cannot be bound, likely a filesystem issue such as
    /// incorrect permissions.
    pub async fn listen(&mut self, socket_file: PathBuf) -> Result<()> {
        self.socket_file = socket_file;
        let listener = self.build_listener().await?;
        self.listener = Some(listener);
        Ok(())
    }

    /// Stop accepting bars and remove the socket file.
    pub async fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            listener.await.ok();
            fs::remove_file(self.socket_file.as_path()).await.ok();
        }
    }

    /// Send the snapshot of `state` to every peer, if it differs from the last one sent.
    ///
    /// # Errors
    ///
    /// Will return error if state cannot be serialized.
    pub async fn write_manager_state<H: Handle>(&mut self, state: &State<H>) -> Result<()> {
        if self.listener.is_none() {
            return Ok(());
        }
        let snapshot: ManagerState = state.into();
        let mut json = serde_json::to_string(&snapshot)?;
        json.push('\n');
        let mut peers = self.peers.lock().await;
        if json == peers.last_state {
            return Ok(());
        }
        peers.streams.retain(Option::is_some);
        for peer in &mut peers.streams {
            if peer
                .as_mut()
                .ok_or(TileError::StreamError)?
                .write_all(json.as_bytes())
                .await
                .is_err()
            {
                peer.take();
            }
        }
        peers.last_state = json;
        Ok(())
    }

    async fn build_listener(&self) -> Result<tokio::task::JoinHandle<()>> {
        let peers = self.peers.clone();
        let listener = if let Ok(m) = UnixListener::bind(&self.socket_file) {
            m
        } else {
            fs::remove_file(&self.socket_file).await?;
            UnixListener::bind(&self.socket_file)?
        };

        Ok(tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut peer, _)) => {
                        let mut peers = peers.lock().await;
                        if peer.write_all(peers.last_state.as_bytes()).await.is_ok() {
                            peers.streams.push(Some(peer));
                        }
                    }
                    Err(e) => tracing::error!("Accept failed = {:?}", e),
                }
            }
        }))
    }
}
