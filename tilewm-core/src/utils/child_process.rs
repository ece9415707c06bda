//! Launches commands for key bindings and keeps track of them until they exit.
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, atomic::AtomicBool};

pub type ChildID = u32;

/// The processes started by the window manager that have not been reaped yet.
#[derive(Debug, Default)]
pub struct Children {
    inner: HashMap<ChildID, Child>,
}

impl Children {
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `false` if `child` is already known.
    pub fn insert(&mut self, child: Child) -> bool {
        self.inner.insert(child.id(), child).is_none()
    }

    /// Reap and forget every child that has exited.
    pub fn remove_finished_children(&mut self) {
        self.inner
            .retain(|_, child| child.try_wait().map_or(true, |ret| ret.is_none()));
    }
}

/// Register the `SIGCHLD` signal handler. Once the signal is received,
/// the flag will be set true. User needs to manually clear the flag.
pub fn register_child_hook(flag: Arc<AtomicBool>) {
    _ = signal_hook::flag::register(signal_hook::consts::signal::SIGCHLD, flag)
        .map_err(|err| tracing::error!("Cannot register SIGCHLD signal handler: {:?}", err));
}

/// Run `command` through `sh -c` in its own session, detached from our standard streams.
pub fn exec_shell(command: &str, children: &mut Children) -> Option<ChildID> {
    let mut shell = Command::new("sh");
    shell
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    // SAFETY: setsid is async-signal-safe and touches nothing of the parent.
    unsafe {
        shell.pre_exec(|| {
            nix::unistd::setsid().map_err(std::io::Error::from)?;
            Ok(())
        });
    }
    let child = shell
        .spawn()
        .map_err(|err| tracing::error!("Failed to spawn `{command}`: {err}"))
        .ok()?;
    let pid = child.id();
    tracing::debug!("Spawned `{command}` as {pid}");
    children.insert(child);
    Some(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_children_are_reaped() {
        let mut children = Children::default();
        let pid = exec_shell("true", &mut children).expect("sh is available");
        assert!(pid > 0);
        assert_eq!(children.len(), 1);
        let started = std::time::Instant::now();
        while !children.is_empty() && started.elapsed().as_secs() < 5 {
            std::thread::sleep(std::time::Duration::from_millis(10));
            children.remove_finished_children();
        }
        assert!(children.is_empty());
    }

    #[test]
    fn running_children_are_kept() {
        let mut children = Children::default();
        exec_shell("sleep 5", &mut children).expect("sh is available");
        children.remove_finished_children();
        assert_eq!(children.len(), 1);
    }
}
