use crate::config::Config;
use crate::errors::Result;
use crate::models::{Client, Handle};
use crate::utils::command_socket::CommandSocket;
use crate::utils::state_socket::StateSocket;
use crate::{DisplayServer, Manager};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

/// How often the pointer is sampled while nothing else happens.
const POINTER_POLL_MS: u64 = 50;

impl<H: Handle, C: Config, SERVER: DisplayServer<H>> Manager<H, C, SERVER> {
    /// Run until a quit is requested, with both sockets in the runtime directory.
    ///
    /// # Errors
    ///
    /// Fails if the runtime directory or one of the sockets cannot be created.
    pub async fn event_loop(self) -> Result<()> {
        let state_file = place_runtime_file("current_state.sock")?;
        let command_file = place_runtime_file("command.sock")?;
        self.run(state_file, command_file).await
    }

    async fn run(mut self, state_file: PathBuf, command_file: PathBuf) -> Result<()> {
        let mut state_socket = StateSocket::default();
        state_socket.listen(state_file).await?;
        let mut command_socket = CommandSocket::default();
        if let Err(err) = command_socket.listen(command_file).await {
            state_socket.shutdown().await;
            return Err(err);
        }
        self.register_child_hook();
        tracing::info!("Entering the event loop");

        let mut event_buffer = vec![];
        loop {
            if self.state.mode.is_normal() {
                if let Err(err) = state_socket.write_manager_state(&self.state).await {
                    tracing::warn!("Could not publish the state: {err}");
                }
            }
            self.display_server.flush();

            let mut needs_update = false;
            tokio::select! {
                () = self.display_server.wait_readable(), if event_buffer.is_empty() => {
                    event_buffer.append(&mut self.display_server.get_next_events());
                    continue;
                }
                // Enter notifications are not sent for everything that moves a window under
                // the pointer, so the pointer gets sampled while idle.
                () = timeout(POINTER_POLL_MS), if event_buffer.is_empty()
                    && self.state.focus_follows_mouse => {
                    if let Some(sample) = self.display_server.generate_pointer_sample() {
                        event_buffer.push(sample);
                    }
                    continue;
                }
                Some(pending) = command_socket.read_request(), if event_buffer.is_empty() => {
                    let (reply, changed) = self.request_handler(&pending.request);
                    pending.respond(reply);
                    needs_update = changed;
                }
                else => {
                    for event in event_buffer.drain(..) {
                        needs_update = self.display_event_handler(event) || needs_update;
                    }
                }
            }

            if needs_update {
                let clients: Vec<&Client<H>> = self.state.clients.iter().collect();
                self.display_server
                    .update_windows(&clients, self.state.focused);
            }

            while let Some(act) = self.state.actions.pop_front() {
                if let Some(event) = self.display_server.execute_action(act) {
                    event_buffer.push(event);
                }
            }

            if self.reap_requested.swap(false, Ordering::SeqCst) {
                self.children.remove_finished_children();
            }

            if self.quit_requested {
                break;
            }
        }

        tracing::info!("Leaving the event loop");
        self.display_server.flush();
        state_socket.shutdown().await;
        command_socket.shutdown().await;
        Ok(())
    }
}

fn place_runtime_file<P>(path: P) -> Result<PathBuf>
where
    P: AsRef<Path>,
{
    Ok(xdg::BaseDirectories::with_prefix("tilewm")?.place_runtime_file(path)?)
}

async fn timeout(mills: u64) {
    use tokio::time::{Duration, sleep};
    sleep(Duration::from_millis(mills)).await;
}

#[cfg(test)]
mod tests {
    use crate::Manager;
    use crate::utils::helpers::test::temp_path;
    use std::path::Path;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixStream;

    async fn request(socket_file: &Path, line: &str) -> String {
        let mut stream = loop {
            match UnixStream::connect(socket_file).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
            }
        };
        stream.write_all(format!("{line}\n").as_bytes()).await.unwrap();
        BufReader::new(stream)
            .lines()
            .next_line()
            .await
            .expect("Read next line")
            .unwrap()
    }

    #[tokio::test]
    async fn quit_over_the_command_socket_ends_the_loop() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        let state_file = temp_path().await.unwrap();
        let command_file = temp_path().await.unwrap();

        let (result, replies) = tokio::join!(
            manager.run(state_file.clone(), command_file.clone()),
            async {
                let focus = request(&command_file, "FocusNext").await;
                let bogus = request(&command_file, "Dance").await;
                let quit = request(&command_file, "Quit").await;
                (focus, bogus, quit)
            }
        );
        result.unwrap();
        assert_eq!(replies.0, "0 ok");
        assert!(replies.1.starts_with("1 "));
        assert_eq!(replies.2, "0 ok");
        assert!(!state_file.exists());
        assert!(!command_file.exists());
    }
}
