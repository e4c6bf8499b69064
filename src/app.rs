use eframe::egui;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use stomata_annotate::config::EditorConfig;
use stomata_annotate::editor::{Editor, EventFlow};
use stomata_annotate::navigation::ImageSequence;
use stomata_annotate::payload::SaveAction;
use stomata_annotate::storage::{HttpFormTarget, Sidecar, SidecarTarget, SubmitTarget};
use stomata_annotate::surface::{Confirm, MarkerLayer};

const MARKER_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 0);

// ── Session options ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub config: EditorConfig,
    pub readonly: bool,
    pub differential: bool,
    /// Base URL of the annotation server; saves go to the sidecar when unset.
    pub server: Option<String>,
}

/// Native OK/Cancel dialog.
pub struct DialogConfirm;

impl Confirm for DialogConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title("Unsaved annotations")
            .set_description(message)
            .set_buttons(rfd::MessageButtons::OkCancel)
            .show()
            == rfd::MessageDialogResult::Ok
    }
}

// ── Page: one image and its editor ──────────────────────────────────────────

struct Page {
    image_path: PathBuf,
    texture: Option<egui::TextureHandle>,
    image_size: (f32, f32),
    raw_image: Option<DynamicImage>,
    editor: Editor<MarkerLayer>,
}

impl Page {
    fn open(image_path: PathBuf, options: &SessionOptions) -> Self {
        let raw_image = match image::open(&image_path) {
            Ok(img) => Some(img),
            Err(err) => {
                log::error!("cannot decode {}: {err}", image_path.display());
                None
            }
        };
        let image_size = raw_image
            .as_ref()
            .map(|img| (img.width() as f32, img.height() as f32))
            .unwrap_or((800.0, 600.0));

        let sidecar = Sidecar::load(&image_path).unwrap_or_else(|err| {
            log::warn!("ignoring unreadable annotations for {}: {err}", image_path.display());
            Sidecar::default()
        });
        let mut editor = Editor::new(options.config.clone(), MarkerLayer::new())
            .readonly(options.readonly);
        editor.load(sidecar.hydration_points(options.differential));

        Self {
            image_path,
            texture: None,
            image_size,
            raw_image,
            editor,
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(ref img) = self.raw_image {
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
        }
    }

    fn sample_id(&self) -> String {
        self.image_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

enum Action {
    Save(SaveAction),
    Goto(PathBuf),
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct AnnotateApp {
    options: SessionOptions,
    sequence: ImageSequence,
    page: Page,
    status: Option<String>,
}

impl AnnotateApp {
    pub fn new(image_path: PathBuf, options: SessionOptions) -> Self {
        let sequence = ImageSequence::around(&image_path);
        let page = Page::open(sequence.current().to_path_buf(), &options);
        Self {
            options,
            sequence,
            page,
            status: None,
        }
    }

    fn open(&mut self, path: &Path) {
        self.sequence.go_to(path);
        self.page = Page::open(path.to_path_buf(), &self.options);
        self.status = None;
    }

    fn navigate(&mut self, path: PathBuf) {
        if self.page.editor.confirm_navigate_away(&mut DialogConfirm) {
            self.open(&path);
        }
    }

    fn save(&mut self, action: SaveAction) {
        let Some(payload) = self.page.editor.try_save(action) else {
            self.status = Some("Dataset is read-only.".to_string());
            return;
        };
        let mut target: Box<dyn SubmitTarget> = match &self.options.server {
            Some(base) => Box::new(HttpFormTarget::new(
                base,
                &self.page.sample_id(),
                self.options.differential,
                &self.page.image_path,
            )),
            None => Box::new(SidecarTarget::new(&self.page.image_path)),
        };
        if let Err(err) = target.submit(&payload) {
            log::error!("save failed: {err}");
            self.status = Some(format!("Save failed: {err}"));
            return;
        }

        // A completed submission leaves the page; the in-memory state goes.
        let next = match action {
            SaveAction::Save => Some(self.page.image_path.clone()),
            SaveAction::SaveAndContinue => self.sequence.next_unannotated().map(Path::to_path_buf),
        };
        match next {
            Some(path) => self.open(&path),
            None => {
                let current = self.page.image_path.clone();
                self.open(&current);
                self.status = Some("No more images to annotate.".to_string());
            }
        }
    }

    fn toolbar(&self, ui: &mut egui::Ui) -> Option<Action> {
        let mut action = None;
        let editor = &self.page.editor;
        ui.horizontal(|ui| {
            let writable = !editor.is_readonly();
            if ui.add_enabled(writable, egui::Button::new("Save")).clicked() {
                action = Some(Action::Save(SaveAction::Save));
            }
            if ui
                .add_enabled(writable, egui::Button::new("Save & continue"))
                .clicked()
            {
                action = Some(Action::Save(SaveAction::SaveAndContinue));
            }
            ui.separator();
            if let Some(prev) = self.sequence.prev() {
                if ui.button("Prev").clicked() {
                    action = Some(Action::Goto(prev.to_path_buf()));
                }
            }
            if let Some(next) = self.sequence.next() {
                if ui.button("Next").clicked() {
                    action = Some(Action::Goto(next.to_path_buf()));
                }
            }
            let (index, count) = self.sequence.position();
            ui.label(format!("{} / {}", index + 1, count));
            ui.separator();
            ui.label(format!("Stomata: {}", editor.points().len()));
            if editor.is_dirty() {
                ui.colored_label(egui::Color32::from_rgb(255, 140, 0), "unsaved");
            }
            if editor.is_readonly() {
                ui.label("read-only");
            }
            if let Some(ref status) = self.status {
                ui.separator();
                ui.label(status);
            }
        });
        action
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (w, h) = self.page.image_size;
        let (response, painter) =
            ui.allocate_painter(egui::vec2(w, h), egui::Sense::click());
        let rect = response.rect;

        if let Some(ref tex) = self.page.texture {
            painter.image(
                tex.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));
        }

        for marker in self.page.editor.surface().iter() {
            painter.circle_stroke(
                rect.min + egui::vec2(marker.cx, marker.cy),
                marker.r,
                egui::Stroke::new(2.0, MARKER_COLOR),
            );
        }

        let pressed = ctx.input(|i| i.pointer.primary_pressed());
        if !pressed || !response.hovered() {
            return;
        }
        let Some(pos) = ctx.input(|i| i.pointer.interact_pos()) else {
            return;
        };
        if !rect.contains(pos) {
            return;
        }
        let local = pos - rect.min;
        if self.page.editor.press_at(local.x, local.y) == EventFlow::Handled {
            log::trace!("press at ({}, {}) taken by a marker", local.x, local.y);
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.page.ensure_texture(ctx);

        if ctx.input(|i| i.viewport().close_requested())
            && !self.page.editor.confirm_navigate_away(&mut DialogConfirm)
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        let mut action = None;
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
            action = Some(Action::Save(SaveAction::Save));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if let Some(a) = self.toolbar(ui) {
                action = Some(a);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.canvas(ui, ctx);
            });
        });

        match action {
            Some(Action::Save(save)) => self.save(save),
            Some(Action::Goto(path)) => self.navigate(path),
            None => {}
        }
    }
}
