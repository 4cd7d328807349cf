//! Channel-based front for session commands.
//!
//! Each `start_*` function runs the corresponding synchronous command on
//! a blocking task and returns the receiving end of an event channel:
//! progress events while the batch runs, then exactly one terminal event
//! (report, cancellation, or failure), after which the channel closes.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use mediasift_core::{Error, ProgressEvent, ProgressSink, Result};

use crate::{CheckReport, ConflictPolicy, DeleteReport, LoadReport, Session};

/// Channel buffer size for session event streams.
pub const SESSION_CHANNEL_SIZE: usize = 100;

/// Events streamed while a session command runs.
#[derive(Debug)]
pub enum SessionEvent {
    /// One file was processed.
    Progress(ProgressEvent),
    /// A load batch finished.
    Loaded(LoadReport),
    /// A duplicate check finished.
    Checked(CheckReport),
    /// A deletion batch finished.
    Deleted(DeleteReport),
    /// The operation was cancelled before completion.
    Cancelled,
    /// The operation failed outright.
    Failed(String),
}

/// A session shared with background tasks.
pub type SharedSession = Arc<Mutex<Session>>;

/// Wrap a session for use with the `start_*` functions.
pub fn shared(session: Session) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Forwards progress events into the event channel.
struct ChannelSink {
    tx: mpsc::Sender<SessionEvent>,
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        // Runs on a blocking task; a dropped receiver just means nobody
        // is watching anymore.
        let _ = self.tx.blocking_send(SessionEvent::Progress(event));
    }
}

/// Start a load batch; events arrive on the returned receiver.
pub fn start_load_files(
    session: SharedSession,
    paths: Vec<PathBuf>,
    policy: ConflictPolicy,
    cancel: CancellationToken,
) -> mpsc::Receiver<SessionEvent> {
    spawn_command(session, cancel, move |session, sink, cancel| {
        session
            .load_files(&paths, policy, sink, cancel)
            .map(SessionEvent::Loaded)
    })
}

/// Start a duplicate check; events arrive on the returned receiver.
pub fn start_check_duplicates(
    session: SharedSession,
    cancel: CancellationToken,
) -> mpsc::Receiver<SessionEvent> {
    spawn_command(session, cancel, |session, sink, cancel| {
        session.check_duplicates(sink, cancel).map(SessionEvent::Checked)
    })
}

/// Start a deletion batch; events arrive on the returned receiver.
pub fn start_delete_duplicates(
    session: SharedSession,
    cancel: CancellationToken,
) -> mpsc::Receiver<SessionEvent> {
    spawn_command(session, cancel, |session, sink, cancel| {
        session.delete_duplicates(sink, cancel).map(SessionEvent::Deleted)
    })
}

/// Run one command on a blocking task, streaming progress and a single
/// terminal event through the channel.
fn spawn_command<F>(
    session: SharedSession,
    cancel: CancellationToken,
    command: F,
) -> mpsc::Receiver<SessionEvent>
where
    F: FnOnce(&mut Session, &dyn ProgressSink, &CancellationToken) -> Result<SessionEvent>
        + Send
        + 'static,
{
    let (tx, rx) = mpsc::channel(SESSION_CHANNEL_SIZE);

    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let sink = ChannelSink { tx: progress_tx };
            let mut session = session.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            command(&mut session, &sink, &cancel)
        })
        .await;

        let terminal = match outcome {
            Ok(Ok(event)) => event,
            Ok(Err(Error::Cancelled)) => SessionEvent::Cancelled,
            Ok(Err(e)) => SessionEvent::Failed(e.to_string()),
            Err(e) => SessionEvent::Failed(format!("Task failed: {e}")),
        };
        let _ = tx.send(terminal).await;
    });

    rx
}
