use crate::{
    backend::GenerationInvoker,
    error::{GateError, Result},
    models::{GeneratedImage, GenerationRequest, Prompt},
    notify::Notifier,
    session::SessionGate,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const GENERATED_NOTICE: &str = "Image generated";

/// Which screen the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Submitting(GenerationRequest),
    Ready(GeneratedImage),
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        match self {
            ViewState::Idle => Phase::Idle,
            ViewState::Submitting(_) => Phase::Submitting,
            ViewState::Ready(_) => Phase::Ready,
        }
    }
}

/// Owns the prompt submission lifecycle and the single live [`GeneratedImage`].
///
/// `Idle -> Submitting -> Ready`, and `Submitting -> Idle` when generation fails. While a
/// request is `Submitting` every further `submit` is refused, so at most one generation is
/// in flight. The state lock is never held across an `.await`.
pub struct RequestController {
    state: Mutex<ViewState>,
    invoker: Arc<dyn GenerationInvoker>,
    session: Arc<dyn SessionGate>,
    notifier: Arc<dyn Notifier>,
}

/// Puts the controller back to `Idle` if a submission future is dropped before it resolves.
struct InFlight<'a> {
    state: &'a Mutex<ViewState>,
    armed: bool,
}

impl InFlight<'_> {
    fn settle(mut self, next: ViewState) {
        *lock(self.state) = next;
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Generation abandoned before completion");
            *lock(self.state) = ViewState::Idle;
        }
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RequestController {
    pub fn new(
        invoker: Arc<dyn GenerationInvoker>,
        session: Arc<dyn SessionGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: Mutex::new(ViewState::Idle),
            invoker,
            session,
            notifier,
        }
    }

    pub fn state(&self) -> ViewState {
        lock(&self.state).clone()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.state).phase()
    }

    /// The submit control should be disabled while this is true.
    pub fn is_submitting(&self) -> bool {
        self.phase() == Phase::Submitting
    }

    /// Snapshot of the live image; only present once generation has completed.
    pub fn current_image(&self) -> Option<GeneratedImage> {
        match &*lock(&self.state) {
            ViewState::Ready(image) => Some(image.clone()),
            _ => None,
        }
    }

    pub async fn submit(&self, text: &str) -> Result<GeneratedImage> {
        if !self.session.is_authenticated() {
            let err = GateError::Unauthenticated;
            self.notifier.error(&err.to_string());
            self.session.prompt_login();
            return Err(err.into());
        }

        let prompt = Prompt::new(text).map_err(|err| {
            self.notifier.error(&err.to_string());
            err
        })?;

        let (mut request, in_flight) = {
            let mut state = lock(&self.state);
            match &*state {
                ViewState::Idle => {}
                ViewState::Submitting(_) => {
                    log::warn!("Submission ignored: a generation is already in flight");
                    return Err(GateError::Busy.into());
                }
                ViewState::Ready(_) => return Err(GateError::NotIdle.into()),
            }
            let request = GenerationRequest::new(prompt).submitting();
            *state = ViewState::Submitting(request.clone());
            (
                request,
                InFlight {
                    state: &self.state,
                    armed: true,
                },
            )
        };

        log::info!("🎨 Generating image for prompt: {}", request.prompt);
        let outcome = self.invoker.generate(&request.prompt).await;
        request.finish(outcome.is_ok());
        log::debug!("Generation finished with status {:?}", request.status);

        match outcome {
            Ok(image) => {
                in_flight.settle(ViewState::Ready(image.clone()));
                self.notifier.success(GENERATED_NOTICE);
                Ok(image)
            }
            Err(err) => {
                in_flight.settle(ViewState::Idle);
                log::error!("Generation failed: {}", err);
                self.notifier.error(&err.message);
                Err(err.into())
            }
        }
    }

    /// Drops the current image so a new prompt can be entered. Local only.
    pub fn reset(&self) -> Result<()> {
        let mut state = lock(&self.state);
        match &*state {
            ViewState::Ready(_) => {
                *state = ViewState::Idle;
                Ok(())
            }
            _ => Err(GateError::NotReady.into()),
        }
    }
}
