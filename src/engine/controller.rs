//! Chat session controller
//!
//! Owns the session store and the engine state. User actions run
//! synchronously under the engine lock; the request and the reveal run as
//! background tasks that feed their outcomes back through [`transition`].
//! Those tasks only hold a weak reference, so once the controller is gone
//! their results are dropped on the floor.

use super::reveal::{self, RevealOutcome};
use super::{transition, Effect, EngineState, Event, TransitionError, TransitionResult};
use crate::config::ClientConfig;
use crate::remote::{AssistantClient, DispatchError, HttpAssistantClient, LoggingClient, TurnRequest};
use crate::session::{Attachment, Draft, MessageLog, SessionStore, SessionUpdate, Species};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

/// Why `submit_turn` did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("Draft has no text and no image")]
    EmptyDraft,
    #[error("A turn is already in progress")]
    Busy,
    #[error("Session is closed")]
    Closed,
    #[error("No Tokio runtime to run the turn on")]
    NoRuntime,
}

impl From<TransitionError> for SubmitRejected {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Busy | TransitionError::StaleOutcome { .. } => SubmitRejected::Busy,
            TransitionError::Closed => SubmitRejected::Closed,
            TransitionError::EmptyDraft => SubmitRejected::EmptyDraft,
        }
    }
}

struct Engine {
    state: EngineState,
    next_turn: u64,
}

struct Shared {
    session_id: String,
    store: SessionStore,
    client: Arc<dyn AssistantClient>,
    reveal_interval: Duration,
    /// Runtime the controller was built on, if any
    runtime: Option<Handle>,
    engine: Mutex<Engine>,
    /// Parent of every per-task token; fired on teardown
    cancel: CancellationToken,
    busy_tx: watch::Sender<bool>,
}

/// Drives one conversation
///
/// Turns run on the Tokio runtime the controller was built on, or else on
/// the one `submit_turn` is called from. Dropping the controller tears the
/// session down.
pub struct ChatController {
    shared: Arc<Shared>,
}

impl ChatController {
    pub fn new(store: SessionStore, client: impl AssistantClient + 'static, config: &ClientConfig) -> Self {
        let (busy_tx, _) = watch::channel(false);
        let shared = Shared {
            session_id: uuid::Uuid::new_v4().to_string(),
            store,
            client: Arc::new(client),
            reveal_interval: config.reveal_interval,
            runtime: Handle::try_current().ok(),
            engine: Mutex::new(Engine {
                state: EngineState::Idle,
                next_turn: 1,
            }),
            cancel: CancellationToken::new(),
            busy_tx,
        };
        tracing::info!(session_id = %shared.session_id, endpoint = %shared.client.endpoint(), "Chat session started");
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Build a session against the configured HTTP endpoint, seeded with the greeting
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unexpected`] if the HTTP client cannot be built.
    pub fn connect(config: &ClientConfig) -> Result<Self, DispatchError> {
        let http: Arc<dyn AssistantClient> = Arc::new(HttpAssistantClient::new(config)?);
        Ok(Self::new(
            SessionStore::with_greeting(config.greeting.clone()),
            LoggingClient::new(http),
            config,
        ))
    }

    // ------------------------------------------------------------------
    // Write entry points
    // ------------------------------------------------------------------

    /// Start a turn from the current draft
    ///
    /// Returns the turn number. The draft is cleared and the user message
    /// appended before this returns; the reply arrives in the background.
    ///
    /// # Errors
    ///
    /// Nothing happens and the draft is untouched when the draft is empty,
    /// a turn is already in progress, the session is closed, or there is no
    /// runtime to run the turn on.
    pub fn submit_turn(&self) -> Result<u64, SubmitRejected> {
        let Some(runtime) = self.shared.runtime() else {
            tracing::error!(session_id = %self.shared.session_id, "Submit outside a Tokio runtime");
            return Err(SubmitRejected::NoRuntime);
        };
        let mut engine = self.shared.lock_engine();

        if let Err(e) = engine.state.accepts_submit() {
            tracing::debug!(session_id = %self.shared.session_id, state = engine.state.name(), "Rejecting submit");
            return Err(e.into());
        }
        let Some(draft) = self.shared.store.take_draft_if_ready() else {
            return Err(SubmitRejected::EmptyDraft);
        };

        let turn = engine.next_turn;
        engine.next_turn += 1;

        let result = transition(&engine.state, Event::Submit { turn, draft })?;
        self.shared.apply(&mut engine, result, Some(&runtime));
        Ok(turn)
    }

    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.shared.store.set_draft_text(text);
    }

    pub fn set_draft_species(&self, species: Species) {
        self.shared.store.set_draft_species(species);
    }

    pub fn set_draft_attachment(&self, attachment: Option<Attachment>) {
        self.shared.store.set_draft_attachment(attachment);
    }

    /// Tear the session down: abandon the request, stop the reveal
    pub fn close(&self) {
        self.shared.handle_event(Event::Teardown);
    }

    // ------------------------------------------------------------------
    // Read entry points
    // ------------------------------------------------------------------

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.lock_engine().state.is_busy()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.lock_engine().state
    }

    #[must_use]
    pub fn messages(&self) -> MessageLog {
        self.shared.store.messages()
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.shared.store.draft()
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.shared.session_id
    }

    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionUpdate> {
        self.shared.store.subscribe()
    }

    #[must_use]
    pub fn update_stream(&self) -> UnboundedReceiverStream<SessionUpdate> {
        self.shared.store.update_stream()
    }

    /// Follows the busy flag, for enabling and disabling input
    #[must_use]
    pub fn busy_watch(&self) -> watch::Receiver<bool> {
        self.shared.busy_tx.subscribe()
    }

    /// Resolve once no turn is in progress
    pub async fn wait_until_idle(&self) {
        let mut busy = self.busy_watch();
        // The sender lives as long as `self`
        let _ = busy.wait_for(|busy| !*busy).await;
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        self.shared.handle_event(Event::Teardown);
    }
}

impl Shared {
    fn lock_engine(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    fn handle_event(self: &Arc<Self>, event: Event) {
        let runtime = self.runtime();
        let mut engine = self.lock_engine();
        match transition(&engine.state, event) {
            Ok(result) => self.apply(&mut engine, result, runtime.as_ref()),
            Err(e) => tracing::debug!(session_id = %self.session_id, error = %e, "Event ignored"),
        }
    }

    /// Switch state and execute effects, still holding the engine lock
    ///
    /// Effects that start a task are skipped with an error log when there is
    /// no runtime; `submit_turn` checks for one before any state changes.
    fn apply(self: &Arc<Self>, engine: &mut Engine, result: TransitionResult, runtime: Option<&Handle>) {
        let previous = std::mem::replace(&mut engine.state, result.new_state);
        if previous != engine.state {
            tracing::debug!(
                session_id = %self.session_id,
                from = previous.name(),
                to = engine.state.name(),
                "Engine state changed"
            );
        }

        let mut last_appended = None;
        for effect in result.effects {
            match effect {
                Effect::AppendMessage { message } => {
                    last_appended = Some(self.store.append_message(message));
                }
                Effect::Dispatch { turn, request } => match runtime {
                    Some(runtime) => self.spawn_dispatch(runtime, turn, request),
                    None => tracing::error!(session_id = %self.session_id, turn, "No runtime to dispatch on"),
                },
                Effect::StartReveal { turn, text } => {
                    let index = last_appended.unwrap_or_else(|| self.store.len().saturating_sub(1));
                    match runtime {
                        Some(runtime) => self.spawn_reveal(runtime, turn, index, text),
                        None => tracing::error!(session_id = %self.session_id, turn, "No runtime to reveal on"),
                    }
                }
                Effect::CancelInFlight => {
                    tracing::info!(session_id = %self.session_id, "Chat session closed");
                    self.cancel.cancel();
                }
            }
        }

        let busy = engine.state.is_busy();
        self.busy_tx.send_if_modified(|current| {
            let changed = *current != busy;
            *current = busy;
            changed
        });
    }

    fn spawn_dispatch(self: &Arc<Self>, runtime: &Handle, turn: u64, request: TurnRequest) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let client = Arc::clone(&self.client);
        let cancel = self.cancel.child_token();
        let session_id = self.session_id.clone();

        tracing::info!(
            session_id = %session_id,
            turn,
            species = %request.species,
            has_image = request.attachment.is_some(),
            "Dispatching turn"
        );

        runtime.spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!(session_id = %session_id, turn, "Abandoned in-flight request");
                    return;
                }
                result = client.send_turn(&request) => result,
            };

            let event = match result {
                Ok(reply) => Event::ReplyReceived { turn, reply },
                Err(error) => {
                    tracing::warn!(session_id = %session_id, turn, kind = error.kind(), error = %error, "Turn failed");
                    Event::DispatchFailed { turn, error }
                }
            };

            if let Some(shared) = weak.upgrade() {
                shared.handle_event(event);
            }
        });
    }

    fn spawn_reveal(self: &Arc<Self>, runtime: &Handle, turn: u64, index: usize, text: String) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let cancel = self.cancel.child_token();
        let interval = self.reveal_interval;
        let session_id = self.session_id.clone();

        runtime.spawn(async move {
            let outcome = reveal::run(&text, interval, &cancel, |prefix| {
                let Some(shared) = weak.upgrade() else {
                    return false;
                };
                match shared.store.update_message_text(index, prefix) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(session_id = %session_id, turn, error = %e, "Reveal target moved");
                        false
                    }
                }
            })
            .await;

            match outcome {
                RevealOutcome::Completed { chars } | RevealOutcome::Aborted { chars } => {
                    tracing::debug!(session_id = %session_id, turn, chars, "Reveal finished");
                    if let Some(shared) = weak.upgrade() {
                        shared.handle_event(Event::RevealFinished { turn });
                    }
                }
                RevealOutcome::Cancelled { chars } => {
                    tracing::debug!(session_id = %session_id, turn, chars, "Reveal cancelled");
                }
            }
        });
    }
}
