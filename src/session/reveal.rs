use std::fmt;

use tracing::{debug, warn};

use crate::{
    animation::ease::Ease,
    canvas::editor::CanvasEditor,
    foundation::{
        config::{RevealConfig, StagingConfig},
        core::{Millis, Point, Rect, ShapeId},
        error::{EaselError, EaselResult},
    },
    session::{
        candidate::CandidateImage,
        commit::commit_candidate,
        export::{Snapshot, export_snapshot},
        region::Region,
        staging::stage_candidate,
    },
};

/// Identity of one reveal session. Results tagged with an id that is no
/// longer current are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    /// No session.
    Idle,
    /// Before image captured and shown; waiting for the staged after image.
    Priming,
    /// Both images available; position animates or follows the pointer.
    Revealing,
}

/// Terminal transitions reported back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealEvent {
    Completed { session: SessionId, shape: ShapeId },
    Cancelled { session: SessionId },
}

/// Staging work the caller must run for a freshly primed session, then hand
/// back through [`RevealController::complete_staging`].
#[derive(Clone, Debug)]
pub struct PendingStage {
    pub session: SessionId,
    pub candidate: CandidateImage,
}

/// What the before/after overlay should display right now.
#[derive(Clone, Copy, Debug)]
pub struct RevealOverlay<'a> {
    pub session: SessionId,
    pub phase: RevealPhase,
    pub before: &'a Snapshot,
    pub after: Option<&'a Snapshot>,
    /// 0 shows only the before image, 100 only the after image.
    pub position: f64,
    pub dragging: bool,
    /// Screen-space bounds of the drawing area, if it could be resolved.
    pub geometry: Option<Rect>,
}

#[derive(Debug)]
struct Offer {
    candidate: CandidateImage,
    used: bool,
}

#[derive(Debug)]
struct Session {
    id: SessionId,
    candidate: CandidateImage,
    before: Snapshot,
    after: Option<Snapshot>,
    position: f64,
    dragging: bool,
    dragged: bool,
    revealing_since: Option<Millis>,
    geometry: Option<Rect>,
}

/// Before/after reveal state machine for generated candidates.
///
/// `Idle -> Priming -> Revealing -> Idle`, where the final step is either a
/// completion (commit) or a cancellation. All time is passed in explicitly;
/// the embedding loop calls [`RevealController::tick`] each frame.
#[derive(Debug)]
pub struct RevealController {
    region: Region,
    reveal: RevealConfig,
    staging: StagingConfig,
    offer: Option<Offer>,
    session: Option<Session>,
    next_session: u64,
}

impl RevealController {
    pub fn new(region: Region, reveal: RevealConfig, staging: StagingConfig) -> Self {
        Self {
            region,
            reveal,
            staging,
            offer: None,
            session: None,
            next_session: 0,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn phase(&self) -> RevealPhase {
        match &self.session {
            None => RevealPhase::Idle,
            Some(s) if s.after.is_none() => RevealPhase::Priming,
            Some(_) => RevealPhase::Revealing,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Make `candidate` available for review, replacing any previous one.
    pub fn offer(&mut self, candidate: CandidateImage) -> EaselResult<()> {
        if self.session.is_some() {
            return Err(EaselError::validation("a reveal is already in progress"));
        }
        self.offer = Some(Offer {
            candidate,
            used: false,
        });
        Ok(())
    }

    pub fn candidate(&self) -> Option<&CandidateImage> {
        self.offer.as_ref().map(|o| &o.candidate)
    }

    /// True when an unused candidate is waiting and no session is running.
    pub fn can_review(&self) -> bool {
        self.session.is_none() && self.offer.as_ref().is_some_and(|o| !o.used)
    }

    /// Dismiss the offered candidate without reviewing it.
    pub fn reject(&mut self) -> EaselResult<()> {
        if self.session.is_some() {
            return Err(EaselError::validation("cannot reject during a reveal"));
        }
        if let Some(offer) = &mut self.offer {
            offer.used = true;
        }
        Ok(())
    }

    pub fn overlay(&self) -> Option<RevealOverlay<'_>> {
        let s = self.session.as_ref()?;
        Some(RevealOverlay {
            session: s.id,
            phase: self.phase(),
            before: &s.before,
            after: s.after.as_ref(),
            position: s.position,
            dragging: s.dragging,
            geometry: s.geometry,
        })
    }

    /// Capture the before image and open a session in `Priming`.
    ///
    /// Nothing is created when the capture fails.
    #[tracing::instrument(skip_all)]
    pub fn begin<E: CanvasEditor + ?Sized>(&mut self, editor: &E) -> EaselResult<PendingStage> {
        if self.session.is_some() {
            return Err(EaselError::validation("a reveal is already in progress"));
        }
        let candidate = match &self.offer {
            Some(offer) if !offer.used => offer.candidate.clone(),
            _ => return Err(EaselError::validation("no candidate to review")),
        };
        let before = export_snapshot(editor, &self.region)?
            .ok_or_else(|| EaselError::not_ready("drawing area not found"))?;
        let geometry = self.screen_geometry(editor);

        self.next_session += 1;
        let id = SessionId(self.next_session);
        self.session = Some(Session {
            id,
            candidate: candidate.clone(),
            before,
            after: None,
            position: 0.0,
            dragging: false,
            dragged: false,
            revealing_since: None,
            geometry,
        });
        debug!(session = %id, "reveal priming");
        Ok(PendingStage {
            session: id,
            candidate,
        })
    }

    /// Run the staging step for `pending` against this controller's region.
    pub fn stage<E: CanvasEditor + ?Sized>(
        &self,
        editor: &mut E,
        pending: &PendingStage,
    ) -> EaselResult<Option<Snapshot>> {
        stage_candidate(editor, &self.region, &pending.candidate, &self.staging)
    }

    /// Deliver a staging result. Starts the reveal at `now` on success.
    ///
    /// Results for a session that was cancelled or replaced are dropped with
    /// [`EaselError::StaleSession`]. A failed or empty staging destroys the
    /// session.
    pub fn complete_staging(
        &mut self,
        session: SessionId,
        staged: EaselResult<Option<Snapshot>>,
        now: Millis,
    ) -> EaselResult<()> {
        match &self.session {
            Some(s) if s.id == session && s.after.is_none() => {}
            _ => {
                debug!(%session, "discarding stale staging result");
                return Err(EaselError::StaleSession(session.0));
            }
        }

        let after = match staged {
            Ok(Some(after)) => after,
            Ok(None) => {
                self.session = None;
                return Err(EaselError::not_ready("drawing area not found"));
            }
            Err(err) => {
                self.session = None;
                warn!(%session, error = %err, "staging failed");
                return Err(err);
            }
        };

        if let Some(s) = &mut self.session {
            s.after = Some(after);
            s.revealing_since = Some(now);
        }
        debug!(%session, "revealing");
        Ok(())
    }

    /// Prime, stage and start revealing in one synchronous step.
    pub fn accept<E: CanvasEditor + ?Sized>(
        &mut self,
        editor: &mut E,
        now: Millis,
    ) -> EaselResult<SessionId> {
        let pending = self.begin(&*editor)?;
        let staged = self.stage(editor, &pending);
        self.complete_staging(pending.session, staged, now)?;
        Ok(pending.session)
    }

    /// Advance the automatic sweep. Completes once the sweep has held at 100
    /// for the grace period. Does nothing while priming or once dragged.
    pub fn tick<E: CanvasEditor + ?Sized>(
        &mut self,
        editor: &mut E,
        now: Millis,
    ) -> EaselResult<Option<RevealEvent>> {
        let Some(s) = &mut self.session else {
            return Ok(None);
        };
        let Some(start) = s.revealing_since else {
            return Ok(None);
        };
        if s.dragging || s.dragged {
            return Ok(None);
        }

        let elapsed = now.since(start);
        let t = Ease::progress(elapsed, self.reveal.duration_ms);
        s.position = s.position.max(100.0 * self.reveal.ease.apply(t));

        let due = self
            .reveal
            .duration_ms
            .saturating_add(self.reveal.completion_grace_ms);
        if elapsed >= due {
            return self.complete(editor).map(Some);
        }
        Ok(None)
    }

    /// Take manual control of the position. Automatic animation never resumes.
    pub fn drag_start(&mut self) -> bool {
        match &mut self.session {
            Some(s) if s.after.is_some() => {
                s.dragging = true;
                s.dragged = true;
                true
            }
            _ => false,
        }
    }

    /// Follow the pointer horizontally across `overlay`, clamped to `[0, 100]`.
    pub fn drag_to(&mut self, pointer: Point, overlay: Rect) -> Option<f64> {
        let s = self.session.as_mut().filter(|s| s.dragging)?;
        if overlay.width() <= 0.0 {
            return None;
        }
        let pos = ((pointer.x - overlay.x0) * 100.0 / overlay.width()).clamp(0.0, 100.0);
        s.position = pos;
        Some(pos)
    }

    /// Release the drag; completes when released at or past the threshold.
    pub fn drag_end<E: CanvasEditor + ?Sized>(
        &mut self,
        editor: &mut E,
    ) -> EaselResult<Option<RevealEvent>> {
        let Some(s) = self.session.as_mut().filter(|s| s.dragging) else {
            return Ok(None);
        };
        s.dragging = false;
        if s.position >= self.reveal.complete_threshold {
            return self.complete(editor).map(Some);
        }
        debug!(session = %s.id, position = s.position, "drag released below threshold");
        Ok(None)
    }

    /// Abandon the current session without touching the canvas.
    pub fn cancel(&mut self) -> Option<RevealEvent> {
        let s = self.session.take()?;
        debug!(session = %s.id, "reveal cancelled");
        Some(RevealEvent::Cancelled { session: s.id })
    }

    fn complete<E: CanvasEditor + ?Sized>(&mut self, editor: &mut E) -> EaselResult<RevealEvent> {
        let Some(s) = self.session.take() else {
            return Err(EaselError::validation("no active reveal"));
        };
        let shape = commit_candidate(editor, &self.region, &s.candidate, &self.staging)?;
        if let Some(offer) = &mut self.offer
            && offer.candidate == s.candidate
        {
            offer.used = true;
        }
        debug!(session = %s.id, %shape, "reveal completed");
        Ok(RevealEvent::Completed {
            session: s.id,
            shape,
        })
    }

    fn screen_geometry<E: CanvasEditor + ?Sized>(&self, editor: &E) -> Option<Rect> {
        let page = editor.page_bounds(&self.region.container())?;
        let p0 = editor.page_to_screen(Point::new(page.x0, page.y0));
        let p1 = editor.page_to_screen(Point::new(page.x1, page.y1));
        Some(Rect::from_points(p0, p1))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/reveal.rs"]
mod tests;
