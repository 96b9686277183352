//! Easel is the canvas session core of a prompt-driven drawing app.
//!
//! A session binds a vector-canvas editor to a single named drawing frame and
//! moves generated images through it:
//!
//! 1. **Export**: render the frame plus its unlocked contents to PNG ([`export_snapshot`]).
//! 2. **Stage**: place a candidate temporarily, capture it, and remove it again ([`stage_candidate`]).
//! 3. **Reveal**: animate a before/after comparison the user can drag ([`RevealController`]).
//! 4. **Commit**: replace the frame's contents with the accepted image ([`commit_candidate`]).
//! 5. **Persist**: debounce edits into project saves and restore once on load ([`AutosaveProtocol`]).
//!
//! Everything is single-threaded and tick-driven. Nothing sleeps: callers pass
//! the current [`Millis`] into `tick`/`poll` style operations, which keeps the
//! timing contracts testable with a [`ManualClock`].
//!
//! The editor is reached only through the [`CanvasEditor`] trait.
//! [`MemoryCanvas`] is a complete in-memory implementation with a CPU
//! rasterizer, used by the `easel` binary and the tests.
#![forbid(unsafe_code)]

mod animation;
mod canvas;
mod foundation;
mod prompt;
mod service;
mod session;

pub use animation::ease::Ease;
pub use animation::timer::SingleSlotTimer;
pub use canvas::editor::{
    CanvasEditor, ChangeKind, ChangeSource, ListenerId, StoreChange, StoreListener,
};
pub use canvas::memory::{Camera, MemoryCanvas};
pub use canvas::model::{
    Document, DocumentSnapshot, ImageAsset, NewImageAsset, NewShape, Shape, ShapeKind,
};
pub use canvas::raster::{Pixmap, render_shapes};
pub use foundation::clock::{Clock, ManualClock, SystemClock};
pub use foundation::config::{
    API_URL_ENV, AutosaveConfig, DEFAULT_USER_ID, EaselConfig, FrameConfig, PromptConfig,
    RevealConfig, ServiceConfig, StagingConfig,
};
pub use foundation::core::{AssetId, Millis, Point, Rect, Rgba8, ShapeId, Size, Vec2};
pub use foundation::error::{EaselError, EaselResult};
pub use prompt::request::build_generation_request;
pub use prompt::transcript::{PromptMode, PromptSession, SpeechResult, Transcripts};
pub use service::generation::{
    GenerateImageRequest, GenerateImageResponse, GenerationKind, GenerationService,
};
#[cfg(feature = "http")]
pub use service::http::HttpBackend;
pub use service::projects::{
    MemoryProjectStore, NewProject, Project, ProjectList, ProjectStore, ProjectUpdate,
};
pub use session::autosave::{AutosaveOutcome, AutosaveProtocol};
pub use session::candidate::CandidateImage;
pub use session::commit::commit_candidate;
pub use session::export::{Snapshot, export_snapshot};
pub use session::placement::{Placement, fit_and_center};
pub use session::region::{Region, ResolvedRegion, find_frame, find_or_create_frame};
pub use session::reveal::{
    PendingStage, RevealController, RevealEvent, RevealOverlay, RevealPhase, SessionId,
};
pub use session::staging::stage_candidate;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;
