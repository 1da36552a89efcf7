//! Analysis session orchestration.
//!
//! One [`Orchestrator`] owns one session record: the selected image, the
//! session credential, the latest results and the phase of the state machine
//!
//! ```text
//! Idle ──select──▶ Previewing ──analyze──▶ Analyzing ──▶ Succeeded | Failed
//!                      ▲                                      │
//!                      └──────────────select──────────────────┘
//! ```
//!
//! The record sits behind a mutex that is never held across an `.await`.
//! Every run is tagged with a generation number; a completion whose tag no
//! longer matches the session (a newer image was selected, another run
//! started, or the session ended) is discarded without touching state.

use crate::{
    credential::Credential,
    error::AppError,
    image_utils::{encode_image, validate_image_size, ImageInfo, SelectedImage},
    metrics,
    models::{
        gemini::ModelReply,
        material::{AnalysisResult, MaterialItem},
    },
    normalizer::normalize_with_strategy,
    pricing::{compute_breakdown, CostBreakdown},
    providers::VisionProvider,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Previewing,
    Analyzing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    fn success(message: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.to_string(),
            at: Utc::now(),
        }
    }

    fn error(err: &AppError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.user_message(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    phase: Phase,
    image: Option<SelectedImage>,
    credential: Option<Credential>,
    materials: AnalysisResult,
    generation: u64,
    notice: Option<Notice>,
}

/// How a run that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Results replaced with this many items (possibly zero)
    Succeeded { items: usize },
    /// A newer selection or run took over; the reply was dropped
    Superseded,
}

/// Presentation snapshot. The breakdown is recomputed for every snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub loading: bool,
    pub image: Option<ImageInfo>,
    pub has_credential: bool,
    pub materials: Vec<MaterialItem>,
    pub breakdown: CostBreakdown,
    pub notice: Option<Notice>,
}

pub struct Orchestrator {
    state: Mutex<SessionState>,
    provider: Arc<dyn VisionProvider>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            provider,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Select a new image. Oversized images are rejected and leave the session untouched.
    pub fn select_image(&self, image: SelectedImage) -> Result<(), AppError> {
        let mut state = self.lock();

        if let Err(err) = validate_image_size(image.size()) {
            warn!(file = %image.file_name, size = image.size(), "Rejected oversized image");
            metrics::record_rejection("image_too_large");
            state.notice = Some(Notice::error(&err));
            return Err(err);
        }

        info!(
            file = %image.file_name,
            mime_type = %image.mime_type,
            size = image.size(),
            "Image selected"
        );
        state.generation += 1;
        state.image = Some(image);
        state.phase = Phase::Previewing;
        state.notice = None;
        Ok(())
    }

    /// Store the session credential. Blank keys are rejected.
    pub fn submit_credential(&self, key: &str) -> Result<(), AppError> {
        let mut state = self.lock();
        match Credential::new(key) {
            Ok(credential) => {
                info!(key = %credential, "Credential submitted");
                state.credential = Some(credential);
                Ok(())
            }
            Err(err) => {
                metrics::record_rejection("missing_credential");
                state.notice = Some(Notice::error(&err));
                Err(err)
            }
        }
    }

    /// Analyze the selected image with the session credential.
    ///
    /// Validation failures return before any network activity. Transport
    /// failures move the session to `Failed` and keep the previous results.
    pub async fn analyze(&self) -> Result<AnalysisOutcome, AppError> {
        let (generation, image, credential) = {
            let mut state = self.lock();

            if state.phase == Phase::Analyzing {
                return Err(AppError::AnalysisInProgress);
            }

            let Some(image) = state.image.clone() else {
                let err = AppError::NoImageSelected;
                metrics::record_rejection("no_image_selected");
                state.notice = Some(Notice::error(&err));
                return Err(err);
            };

            let Some(credential) = state.credential.clone() else {
                let err = AppError::MissingCredential;
                metrics::record_rejection("missing_credential");
                state.phase = Phase::Previewing;
                state.notice = Some(Notice::error(&err));
                return Err(err);
            };

            state.generation += 1;
            state.phase = Phase::Analyzing;
            state.notice = None;
            (state.generation, image, credential)
        };

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            %run_id,
            generation,
            provider = self.provider.name(),
            size = image.size(),
            "Starting analysis"
        );

        let mut cancel_guard = CancelGuard {
            orchestrator: self,
            generation,
            run_id,
            started,
            armed: true,
        };
        let result = self.run(image, &credential).await;
        cancel_guard.armed = false;
        let elapsed = started.elapsed();

        let mut state = self.lock();
        if state.generation != generation {
            info!(%run_id, generation, current = state.generation, "Discarding superseded analysis");
            metrics::record_analysis(self.provider.name(), "superseded", elapsed);
            return Ok(AnalysisOutcome::Superseded);
        }

        let failure = match result {
            Ok(ModelReply::Recognized(text)) => {
                let (items, strategy) = normalize_with_strategy(&text);
                let count = items.len();
                info!(
                    %run_id,
                    items = count,
                    strategy = strategy.as_str(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Analysis complete"
                );
                debug!(%run_id, reply = %text, "Model reply");
                metrics::record_items(strategy.as_str(), count);
                metrics::record_analysis(self.provider.name(), "succeeded", elapsed);

                state.materials = items;
                state.phase = Phase::Succeeded;
                state.notice = Some(Notice::success("Analysis complete!"));
                return Ok(AnalysisOutcome::Succeeded { items: count });
            }
            Ok(ModelReply::Malformed) => AppError::MalformedResponse,
            Err(err) => err,
        };

        warn!(%run_id, error = %failure, "Analysis failed");
        metrics::record_analysis(self.provider.name(), "failed", elapsed);
        state.phase = Phase::Failed;
        state.notice = Some(Notice::error(&failure));
        Err(failure)
    }

    /// Record an upload that was refused before it could become a [`SelectedImage`].
    /// The session keeps its current image and phase.
    pub fn reject_upload(&self, err: AppError) -> AppError {
        let reason = match err {
            AppError::ImageTooLarge { .. } => "image_too_large",
            _ => "invalid_upload",
        };
        warn!(error = %err, "Rejected upload");
        metrics::record_rejection(reason);
        self.lock().notice = Some(Notice::error(&err));
        err
    }

    /// Select an image and analyze it right away, as the upload form does.
    pub async fn select_and_analyze(
        &self,
        image: SelectedImage,
    ) -> Result<AnalysisOutcome, AppError> {
        self.select_image(image)?;
        self.analyze().await
    }

    /// Forget the credential, image and results. Runs in flight are discarded.
    pub fn end_session(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = SessionState {
            generation,
            ..SessionState::default()
        };
        info!("Session ended");
    }

    pub fn view(&self) -> SessionView {
        let state = self.lock();
        SessionView {
            phase: state.phase,
            loading: state.phase == Phase::Analyzing,
            image: state.image.as_ref().map(SelectedImage::info),
            has_credential: state.credential.is_some(),
            materials: state.materials.clone(),
            breakdown: compute_breakdown(&state.materials),
            notice: state.notice.clone(),
        }
    }

    /// Encode off the async executor, then call the provider.
    async fn run(
        &self,
        image: SelectedImage,
        credential: &Credential,
    ) -> Result<ModelReply, AppError> {
        let encoded = tokio::task::spawn_blocking(move || encode_image(&image)).await?;
        self.provider.describe_image(credential, &encoded).await
    }
}

/// Puts a run that was dropped mid-flight back to `Previewing`, unless a
/// newer selection or run already owns the session.
struct CancelGuard<'a> {
    orchestrator: &'a Orchestrator,
    generation: u64,
    run_id: Uuid,
    started: Instant,
    armed: bool,
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.orchestrator.lock();
        if state.generation != self.generation || state.phase != Phase::Analyzing {
            return;
        }

        warn!(run_id = %self.run_id, generation = self.generation, "Analysis cancelled by caller");
        metrics::record_analysis(
            self.orchestrator.provider.name(),
            "cancelled",
            self.started.elapsed(),
        );
        state.phase = Phase::Previewing;
        state.notice = None;
    }
}
