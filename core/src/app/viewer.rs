use crate::app::state::ViewerState;
use crate::cache::Memo;
use crate::meta::{MetaStore, NoduleRecord, ScanRecord};
use crate::render::{overlay_nodules, render_slice};
use crate::types::{Window, DEFAULT_WINDOW};
use crate::volume::VolumeStore;
use eframe::egui;
use image::RgbaImage;
use log::{error, warn};
use ndarray::Array3;
use std::sync::Arc;

/// Display edge of a nodule thumbnail in points
const NODULE_THUMB_SIZE: f32 = 128.0;

/// Cache key for a fully composited slice frame
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SliceKey {
    patient: String,
    z: usize,
    window: Window,
    overlay: bool,
}

/// Main viewer application
///
/// Owns the metadata tables, the volume cache, and the UI state. Rendered
/// frames are memoized by [`SliceKey`]; only the frame currently on screen
/// is uploaded as a GPU texture, and it is re-uploaded whenever the key
/// changes.
pub struct ViewerApp {
    meta: MetaStore,
    volumes: VolumeStore,
    state: ViewerState,
    frames: Memo<SliceKey, RgbaImage>,
    nodule_textures: Memo<(String, u32), egui::TextureHandle>,
    texture: Option<(SliceKey, egui::TextureHandle)>,
    load_error: Option<String>,
}

impl ViewerApp {
    /// Creates the viewer positioned on the startup patient
    ///
    /// Falls back to the first listed patient when `initial_patient` is
    /// absent or unknown. A missing CT volume leaves the viewer in an error
    /// state with the patient selector still usable.
    pub fn new(meta: MetaStore, volumes: VolumeStore, initial_patient: Option<&str>) -> Self {
        let patient_id = {
            let patients = meta.patients();
            if patients.is_empty() {
                warn!("No patients listed in scan metadata");
            }
            match initial_patient {
                Some(requested) if patients.contains(&requested) => requested.to_string(),
                Some(requested) => {
                    warn!(
                        "Patient '{}' not found in metadata, using first listed",
                        requested
                    );
                    patients.first().map(|p| p.to_string()).unwrap_or_default()
                }
                None => patients.first().map(|p| p.to_string()).unwrap_or_default(),
            }
        };

        let mut app = Self {
            meta,
            volumes,
            state: ViewerState::new(patient_id.clone()),
            frames: Memo::new(),
            nodule_textures: Memo::new(),
            texture: None,
            load_error: None,
        };
        app.select_patient(&patient_id);
        app
    }

    /// Creates a viewer stuck on a startup failure
    ///
    /// Used when the metadata tables cannot be loaded: the window opens and
    /// shows the message instead of exiting silently, but with no patients
    /// to pick there is nothing further to interact with.
    pub fn startup_error(message: impl Into<String>, volumes: VolumeStore) -> Self {
        Self {
            meta: MetaStore::from_records(Vec::new(), Vec::new()),
            volumes,
            state: ViewerState::new(""),
            frames: Memo::new(),
            nodule_textures: Memo::new(),
            texture: None,
            load_error: Some(message.into()),
        }
    }

    /// Switches to a patient and recenters the slice slider
    fn select_patient(&mut self, patient_id: &str) {
        self.state.patient_id = patient_id.to_string();
        self.load_error = None;
        match self.volumes.ct_volume(patient_id) {
            Ok(volume) => self.state.reset_for_depth(volume.dim().2),
            Err(e) => {
                error!("{}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Returns the current CT volume unless the patient is in an error state
    fn current_volume(&mut self) -> Option<Arc<Array3<f32>>> {
        if self.load_error.is_some() {
            return None;
        }
        let patient_id = self.state.patient_id.clone();
        match self.volumes.ct_volume(&patient_id) {
            Ok(volume) => Some(volume),
            Err(e) => {
                error!("{}", e);
                self.load_error = Some(e.to_string());
                None
            }
        }
    }

    /// Renders (or fetches) the composited frame for a slice key
    fn render_frame(&mut self, key: &SliceKey) -> Option<Arc<RgbaImage>> {
        if let Some(frame) = self.frames.get(key) {
            return Some(frame);
        }
        let volume = self.current_volume()?;
        let base = match render_slice(&volume, key.z, key.window) {
            Ok(base) => base,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        let frame = if key.overlay {
            let mask = self.volumes.mask_volume(&key.patient);
            overlay_nodules(&base, &mask, key.z)
        } else {
            base
        };
        Some(self.frames.get_or_insert_with(key.clone(), || frame))
    }

    /// Keeps the on-screen texture in sync with the UI state
    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.load_error.is_some() {
            self.texture = None;
            return;
        }
        let key = SliceKey {
            patient: self.state.patient_id.clone(),
            z: self.state.slice_index(),
            window: self.state.window,
            overlay: self.state.show_overlay,
        };
        if matches!(&self.texture, Some((current, _)) if *current == key) {
            return;
        }
        match self.render_frame(&key) {
            Some(frame) => {
                let texture =
                    ctx.load_texture("ct_slice", color_image(&frame), egui::TextureOptions::NEAREST);
                self.texture = Some((key, texture));
            }
            None => self.texture = None,
        }
    }

    /// Returns the thumbnail texture for a nodule, rendering it on first use
    ///
    /// Thumbnails always show the middle slice of the crop under the default
    /// lung window, independent of the main view's controls.
    fn nodule_texture(&mut self, ctx: &egui::Context, nodule_id: u32) -> Arc<egui::TextureHandle> {
        let patient = self.state.patient_id.clone();
        let volumes = &mut self.volumes;
        self.nodule_textures
            .get_or_insert_with((patient.clone(), nodule_id), || {
                let volume = volumes.nodule_volume(&patient, nodule_id);
                let z = volume.dim().2 / 2;
                let frame = match render_slice(&volume, z, DEFAULT_WINDOW) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Could not render thumbnail for nodule {}: {}", nodule_id, e);
                        RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]))
                    }
                };
                ctx.load_texture(
                    format!("nodule_{}_{}", patient, nodule_id),
                    color_image(&frame),
                    egui::TextureOptions::NEAREST,
                )
            })
    }

    fn render_side_panel(&mut self, ctx: &egui::Context) {
        let patients: Vec<String> = self.meta.patients().iter().map(|p| p.to_string()).collect();
        let scan: Option<ScanRecord> = self.meta.scan_for(&self.state.patient_id).cloned();
        let depth = self.current_volume().map(|v| v.dim().2);
        if let Some(depth) = depth {
            self.state.clamp_slice(depth);
        }
        let mut selected: Option<String> = None;

        egui::SidePanel::left("patient_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Patient Information");
                ui.add_space(4.0);
                if patients.is_empty() {
                    ui.label("No patients available.");
                    return;
                }

                egui::ComboBox::from_label("Patient ID")
                    .selected_text(self.state.patient_id.clone())
                    .show_ui(ui, |ui| {
                        for patient in &patients {
                            if ui
                                .selectable_label(*patient == self.state.patient_id, patient)
                                .clicked()
                            {
                                selected = Some(patient.clone());
                            }
                        }
                    });

                ui.add_space(4.0);
                match &scan {
                    Some(scan) => {
                        ui.label(format!("Diagnosis: {}", scan.diagnosis));
                        ui.label(format!("Diagnosis Method: {}", scan.diagnosis_method));
                    }
                    None => {
                        ui.label("No scan metadata for this patient.");
                    }
                }

                // Display controls disappear while the scan cannot be shown
                if let Some(depth) = depth {
                    ui.separator();
                    ui.heading("Display");
                    ui.add_space(4.0);
                    ui.checkbox(&mut self.state.show_overlay, "Show nodule overlay");
                    ui.add(egui::Slider::new(&mut self.state.slice, 1..=depth).text("Slice"));
                    ui.horizontal(|ui| {
                        ui.label("Window level:");
                        ui.add(egui::DragValue::new(&mut self.state.window.level));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Window width:");
                        ui.add(egui::DragValue::new(&mut self.state.window.width));
                    });
                    ui.label(self.state.window.to_string());
                }
            });

        if let Some(patient) = selected {
            if patient != self.state.patient_id {
                self.select_patient(&patient);
            }
        }
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        self.ensure_texture(ctx);
        let nodules: Vec<NoduleRecord> = self
            .meta
            .nodules_for(&self.state.patient_id)
            .into_iter()
            .cloned()
            .collect();
        let load_error = self.load_error.clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("CT Scan");
            ui.add_space(4.0);
            if let Some(message) = &load_error {
                ui.colored_label(egui::Color32::RED, message);
                return;
            }
            if let Some((_, texture)) = &self.texture {
                let size = texture.size_vec2();
                ui.add(egui::Image::new((texture.id(), size)).max_width(ui.available_width()));
            }

            ui.separator();
            ui.heading("Detected Nodules");
            ui.add_space(4.0);
            if nodules.is_empty() {
                ui.label("No nodules found for this patient.");
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for nodule in &nodules {
                    self.nodule_row(ui, nodule);
                    ui.add_space(8.0);
                }
            });
        });
    }

    fn nodule_row(&mut self, ui: &mut egui::Ui, nodule: &NoduleRecord) {
        let texture = self.nodule_texture(ui.ctx(), nodule.nodule_id);
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.image((
                    texture.id(),
                    egui::vec2(NODULE_THUMB_SIZE, NODULE_THUMB_SIZE),
                ));
                ui.label(format!("Nodule #{}", nodule.nodule_id));
            });
            ui.add_space(12.0);
            ui.vertical(|ui| {
                ui.label(format!("Diameter: {:.2} mm", nodule.diameter));
                ui.label(format!("Surface Area: {:.2} mm²", nodule.surface_area));
                ui.label(format!("Volume: {:.2} mm³", nodule.volume));
                ui.label(format!("Pred. Malignancy: {}", nodule.rating().label()));
            });
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_side_panel(ctx);
        self.render_central_panel(ctx);
    }
}

/// Converts a rendered frame into an egui texture image
fn color_image(frame: &RgbaImage) -> egui::ColorImage {
    let size = [frame.width() as usize, frame.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw())
}
