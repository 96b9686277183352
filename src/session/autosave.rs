use std::{cell::RefCell, rc::Rc};

use tracing::{debug, info, warn};

use crate::{
    animation::timer::SingleSlotTimer,
    canvas::{
        editor::{CanvasEditor, ChangeSource, ListenerId, StoreChange},
        model::DocumentSnapshot,
    },
    foundation::{
        config::{AutosaveConfig, FrameConfig},
        core::Millis,
        error::{EaselError, EaselResult},
    },
    service::projects::{Project, ProjectStore},
    session::region::{Region, find_or_create_frame},
};

/// Result of one [`AutosaveProtocol::poll`].
#[derive(Debug)]
pub enum AutosaveOutcome {
    /// No save was due.
    Idle,
    /// A save was due but restore has not completed yet.
    Suppressed,
    Saved(Project),
    /// Persistence failed. Not retried; the next edit re-arms the timer.
    Failed(EaselError),
}

#[derive(Debug, Default)]
struct SaveState {
    timer: SingleSlotTimer,
    restored: bool,
}

/// Debounced autosave plus one-shot restore for a canvas session.
///
/// The store listener and [`AutosaveProtocol::poll`] share one state cell, so
/// a fire always sees the latest deadline and restore flag.
#[derive(Debug)]
pub struct AutosaveProtocol {
    state: Rc<RefCell<SaveState>>,
    listener: Option<ListenerId>,
    region: Region,
}

impl AutosaveProtocol {
    /// Subscribe to user-originated changes on `editor`.
    pub fn attach<E: CanvasEditor + ?Sized>(
        editor: &mut E,
        region: Region,
        cfg: &AutosaveConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(SaveState::default()));
        let shared = Rc::clone(&state);
        let debounce_ms = cfg.debounce_ms;
        let listener = editor.listen(Box::new(move |change: &StoreChange| {
            if change.source == ChangeSource::User {
                shared.borrow_mut().timer.arm(change.at, debounce_ms);
            }
        }));
        Self {
            state,
            listener: Some(listener),
            region,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn is_restored(&self) -> bool {
        self.state.borrow().restored
    }

    /// When the pending save fires, if one is armed.
    pub fn deadline(&self) -> Option<Millis> {
        self.state.borrow().timer.deadline()
    }

    /// Merge the persisted document into the editor, once per session.
    ///
    /// The load is tagged remote so it does not arm a save. Afterwards the
    /// drawing frame is looked up again and the shared region is rebound to
    /// it. Returns `false` when restore had already happened.
    #[tracing::instrument(skip_all)]
    pub fn restore<E: CanvasEditor + ?Sized>(
        &mut self,
        editor: &mut E,
        snapshot: Option<&DocumentSnapshot>,
        frame: &FrameConfig,
    ) -> EaselResult<bool> {
        if self.is_restored() {
            return Ok(false);
        }
        let Some(snapshot) = snapshot else {
            debug!("no persisted document, starting fresh");
            self.state.borrow_mut().restored = true;
            return Ok(true);
        };
        let container = self.region.container();
        if editor.shape(&container).is_none() {
            return Err(EaselError::not_ready(format!(
                "drawing area '{container}' not found"
            )));
        }

        editor.load_remote(snapshot)?;
        let restored = find_or_create_frame(editor, frame)?.container();
        if restored != container {
            debug!(from = %container, to = %restored, "rebinding drawing area");
            self.region.rebind(restored);
        }
        self.state.borrow_mut().restored = true;
        info!("restored persisted document");
        Ok(true)
    }

    /// Fire the pending save if it is due at `now`.
    pub fn poll<E: CanvasEditor + ?Sized, S: ProjectStore + ?Sized>(
        &mut self,
        editor: &E,
        store: &S,
        project_id: &str,
        user_id: &str,
        now: Millis,
    ) -> AutosaveOutcome {
        let restored = {
            let mut state = self.state.borrow_mut();
            if !state.timer.fire_if_due(now) {
                return AutosaveOutcome::Idle;
            }
            state.restored
        };
        if !restored {
            debug!("save suppressed until restore completes");
            return AutosaveOutcome::Suppressed;
        }

        let saved = editor
            .serialize_document()
            .and_then(|snapshot| store.save_snapshot(project_id, user_id, snapshot));
        match saved {
            Ok(project) => {
                debug!(project = %project.id, "autosaved");
                AutosaveOutcome::Saved(project)
            }
            Err(err) => {
                warn!(error = %err, "autosave failed");
                AutosaveOutcome::Failed(err)
            }
        }
    }

    /// Unsubscribe and drop any pending save.
    pub fn teardown<E: CanvasEditor + ?Sized>(&mut self, editor: &mut E) {
        if let Some(id) = self.listener.take() {
            editor.unlisten(id);
        }
        self.state.borrow_mut().timer.disarm();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/autosave.rs"]
mod tests;
