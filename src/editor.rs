use crate::config::EditorConfig;
use crate::model::{AnnotationPoint, AnnotationSet, PersistedPoint, StomaId};
use crate::payload::{SaveAction, SavePayload};
use crate::surface::{Confirm, Marker, MarkerSurface};

pub const DISCARD_CHANGES_MESSAGE: &str =
    "You have unsaved annotation changes. Discard them and leave this image?";

/// What a primary press landed on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PressTarget {
    Marker(StomaId),
    /// Surface background, in surface-local coordinates.
    Surface { x: f32, y: f32 },
}

/// Whether a press was consumed before reaching the surface-level handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFlow {
    Handled,
    Propagate,
}

/// Point editor for a single image. One instance per loaded image.
pub struct Editor<S> {
    points: AnnotationSet,
    next_id: u32,
    dirty: bool,
    readonly: bool,
    config: EditorConfig,
    surface: S,
}

impl<S: MarkerSurface> Editor<S> {
    pub fn new(config: EditorConfig, surface: S) -> Self {
        Self {
            points: AnnotationSet::new(),
            next_id: 0,
            dirty: false,
            readonly: false,
            config,
            surface,
        }
    }

    /// Read-only editors ignore presses and refuse to save.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Hydrates from persisted points, assigning fresh ids in order, and
    /// renders them.
    pub fn load(&mut self, persisted: &[PersistedPoint]) {
        for p in persisted {
            let id = self.allocate_id();
            self.points.push(AnnotationPoint { id, x: p.x, y: p.y });
        }
        self.dirty = false;
        log::debug!("hydrated {} points", persisted.len());
        self.render();
    }

    pub fn add(&mut self, x: f32, y: f32) -> StomaId {
        let id = self.allocate_id();
        self.points.push(AnnotationPoint { id, x, y });
        self.dirty = true;
        log::debug!("added stoma {id} at ({x}, {y})");
        self.render();
        id
    }

    /// Unknown ids are a no-op.
    pub fn remove(&mut self, id: StomaId) {
        if self.points.remove(id).is_none() {
            log::debug!("ignoring removal of unknown stoma {id}");
            return;
        }
        self.surface.remove_marker(id);
        self.dirty = true;
        log::debug!("removed stoma {id}");
    }

    /// Creates markers for points that have none. Existing markers are left
    /// alone.
    pub fn render(&mut self) {
        for point in self.points.iter() {
            if self.surface.has_marker(point.id) {
                continue;
            }
            self.surface.add_marker(Marker {
                id: point.id,
                cx: point.x,
                cy: point.y,
                r: self.config.display_radius,
                class: self.config.marker_class.clone(),
            });
        }
    }

    /// Routes a primary press. A press on a marker removes it and is never
    /// seen by the add handler.
    pub fn press(&mut self, target: PressTarget) -> EventFlow {
        if self.readonly {
            return match target {
                PressTarget::Marker(_) => EventFlow::Handled,
                PressTarget::Surface { .. } => EventFlow::Propagate,
            };
        }
        match target {
            PressTarget::Marker(id) => {
                self.remove(id);
                EventFlow::Handled
            }
            PressTarget::Surface { x, y } => {
                self.add(x, y);
                EventFlow::Propagate
            }
        }
    }

    /// Primary press at surface-local `(x, y)`. The marker under the pointer
    /// gets the press first; the background add runs only when the marker
    /// handler let it through.
    pub fn press_at(&mut self, x: f32, y: f32) -> EventFlow {
        if let Some(id) = self.surface.marker_at(x, y) {
            if self.press(PressTarget::Marker(id)) == EventFlow::Handled {
                return EventFlow::Handled;
            }
        }
        self.press(PressTarget::Surface { x, y })
    }

    pub fn serialize(&self) -> SavePayload {
        SavePayload::new(&self.points.to_persisted(), self.config.margin)
    }

    /// Payload for the save form. The submission always proceeds and the
    /// dirty flag is left as is. Read-only editors have nothing to submit.
    pub fn try_save(&self, action: SaveAction) -> Option<SavePayload> {
        if self.readonly {
            log::warn!("refusing to save a read-only dataset");
            return None;
        }
        let payload = self.serialize().with_action(action);
        log::info!(
            "submitting {} annotations (margin {})",
            self.points.len(),
            payload.margin
        );
        Some(payload)
    }

    /// Returns whether navigation may proceed.
    pub fn confirm_navigate_away(&self, prompt: &mut impl Confirm) -> bool {
        if !self.dirty {
            return true;
        }
        prompt.confirm(DISCARD_CHANGES_MESSAGE)
    }

    pub fn points(&self) -> &AnnotationSet {
        &self.points
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn allocate_id(&mut self) -> StomaId {
        self.next_id += 1;
        StomaId(self.next_id)
    }
}
