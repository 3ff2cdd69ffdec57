use super::event::{Command, Envelope};
use super::orchestrator::Orchestrator;
use super::state::SessionSnapshot;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

/// Cloneable handle to a running voice session.
///
/// Every call returns immediately; progress is observed through snapshots.
#[derive(Clone)]
pub struct VoiceSession {
    commands: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl VoiceSession {
    /// Move the orchestrator onto its own task
    pub fn spawn(orchestrator: Orchestrator) -> Self {
        let commands = orchestrator.sender();
        let snapshots = orchestrator.subscribe();
        let task = tokio::spawn(orchestrator.run());

        Self {
            commands,
            snapshots,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    pub fn start_interaction(&self) {
        self.send(Command::Start);
    }

    pub fn stop_interaction(&self) {
        self.send(Command::Stop);
    }

    /// Tear the session down (e.g. the hosting view went away)
    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    /// Tear down and wait for the session task to exit
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown);

        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.await.context("Voice session task panicked")?;
        }

        Ok(())
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &self,
        timeout: Duration,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = tokio::time::timeout(timeout, snapshots.wait_for(predicate))
            .await
            .context("Timed out waiting for voice session state")?
            .context("Voice session task has stopped")?;

        Ok(snapshot.clone())
    }

    fn send(&self, command: Command) {
        if self.commands.send(Envelope::Command(command)).is_err() {
            warn!("Voice session task has stopped, ignoring {:?}", command);
        }
    }
}
