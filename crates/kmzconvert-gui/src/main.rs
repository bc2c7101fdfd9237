use anyhow::{Context, Result};
use eframe::egui;
use kmzconvert_core::batch::{BatchOutcome, BatchProcessor, BatchStatus};
use kmzconvert_core::geom::BBox2;
use kmzconvert_core::metrics::{close_ring, MetricsConfig};
use kmzconvert_core::model::{Coordinate, ReportRow};
use kmzconvert_core::report::{BatchReport, PRIVACY_NOTICE};
use kmzconvert_core::source::InputFile;
use kmzconvert_export_xlsx::{export_xlsx, ExportConfig, DEFAULT_FILE_NAME};
use kmzconvert_import_kml::KmlReader;
use std::path::{Path, PathBuf};

fn main() -> eframe::Result {
    if let Err(e) = kmzconvert_core::logging::init_logging("info") {
        eprintln!("logging disabled: {e}");
    }
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "kmzconvert",
        native_options,
        Box::new(|cc| Ok(Box::new(KmzConvertApp::new(cc)))),
    )
}

struct KmzConvertApp {
    files: Vec<InputFile>,
    outcome: Option<BatchOutcome>,
    selected: Option<usize>,

    keep_degenerate: bool,
    saved_path: Option<PathBuf>,

    zoom: f32,
    pan: egui::Vec2,

    status: String,
}

impl KmzConvertApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            files: Vec::new(),
            outcome: None,
            selected: None,
            keep_degenerate: false,
            saved_path: None,
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            status: "Add KML/KMZ files to begin.".to_string(),
        }
    }

    fn pick_inputs(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("KML / KMZ", &["kml", "kmz"])
            .pick_files();
        if let Some(paths) = picked {
            for path in paths {
                self.files.push(InputFile::from_path(path));
            }
            self.status = format!("{} file(s) loaded.", self.files.len());
        }
    }

    fn clear(&mut self) {
        self.files.clear();
        self.outcome = None;
        self.selected = None;
        self.saved_path = None;
        self.status = "Cleared.".to_string();
    }

    fn run_transform(&mut self) {
        if self.files.is_empty() {
            self.status = "Add at least one file before transforming.".to_string();
            return;
        }
        let cfg = MetricsConfig {
            reject_degenerate: !self.keep_degenerate,
        };
        let outcome = BatchProcessor::new(KmlReader, cfg).process(&self.files);
        self.status = match outcome.status() {
            BatchStatus::HasData => format!(
                "Converted {} of {} file(s).",
                outcome.rows.len(),
                outcome.files_total()
            ),
            BatchStatus::NoValidData => "No valid data was produced.".to_string(),
        };
        self.selected = if outcome.rows.is_empty() { None } else { Some(0) };
        self.saved_path = None;
        self.zoom = 1.0;
        self.pan = egui::Vec2::ZERO;
        self.outcome = Some(outcome);
    }

    fn save_xlsx(&mut self) {
        let Some(outcome) = &self.outcome else {
            self.status = "Nothing to save yet.".to_string();
            return;
        };
        let target = rfd::FileDialog::new()
            .add_filter("Excel workbook", &["xlsx"])
            .set_file_name(DEFAULT_FILE_NAME)
            .save_file();
        let Some(path) = target else {
            return;
        };
        // A failed export leaves the preview table untouched.
        match export_xlsx(&outcome.rows, &path, &ExportConfig::default()) {
            Ok(()) => {
                self.status = format!("Saved {}", path.display());
                self.saved_path = Some(path);
            }
            Err(e) => {
                self.status = format!("Failed to save spreadsheet: {e:#}");
            }
        }
    }

    fn save_report(&mut self) {
        let Some(outcome) = &self.outcome else {
            return;
        };
        let target = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("report.json")
            .save_file();
        let Some(path) = target else {
            return;
        };
        self.status = match write_json(&path, outcome) {
            Ok(()) => format!("Wrote report: {}", path.display()),
            Err(e) => format!("Failed to write report: {e:#}"),
        };
    }

    fn handle_file_drop(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        for file in dropped {
            if let Some(path) = file.path {
                self.files.push(InputFile::from_path(path));
            } else if let Some(bytes) = file.bytes {
                self.files.push(InputFile::from_bytes(file.name, bytes.to_vec()));
            }
        }
        self.status = format!("{} file(s) loaded.", self.files.len());
    }
}

impl eframe::App for KmzConvertApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_file_drop(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Add KML/KMZ…").clicked() {
                    self.pick_inputs();
                }
                if ui.button("Clear").clicked() {
                    self.clear();
                }
                ui.separator();
                ui.checkbox(&mut self.keep_degenerate, "Keep degenerate polygons");
                ui.separator();
                let can_transform = !self.files.is_empty();
                if ui
                    .add_enabled(can_transform, egui::Button::new("Transform"))
                    .clicked()
                {
                    self.run_transform();
                }
                let can_save = self
                    .outcome
                    .as_ref()
                    .is_some_and(|o| o.status() == BatchStatus::HasData);
                if ui
                    .add_enabled(can_save, egui::Button::new("Save .xlsx…"))
                    .clicked()
                {
                    self.save_xlsx();
                }
                if ui
                    .add_enabled(self.outcome.is_some(), egui::Button::new("Save report.json…"))
                    .clicked()
                {
                    self.save_report();
                }
            });
            ui.label(format!("{} file(s) loaded.", self.files.len()));
            ui.small(PRIVACY_NOTICE);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if let Some(p) = &self.saved_path {
                    if ui.button("Open spreadsheet").clicked() {
                        let _ = open::that(p);
                    }
                    if let Some(dir) = p.parent() {
                        if ui.button("Open folder").clicked() {
                            let _ = open::that(dir);
                        }
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                cols[0].heading("Results");
                cols[0].separator();
                draw_results(&mut cols[0], self);

                cols[1].heading("Polygon preview");
                cols[1].separator();
                draw_preview(&mut cols[1], self);
            });
        });
    }
}

fn draw_results(ui: &mut egui::Ui, app: &mut KmzConvertApp) {
    let Some(outcome) = &app.outcome else {
        ui.label("No results yet. Click “Transform”.");
        return;
    };

    egui::ScrollArea::vertical().show(ui, |ui| {
        if outcome.rows.is_empty() {
            ui.label("No valid data was produced.");
        } else {
            egui::Grid::new("rows").striped(true).show(ui, |ui| {
                ui.strong("File");
                ui.strong("Points");
                ui.strong("Centroid (lat, lon)");
                ui.strong("Area (ha)");
                ui.end_row();

                for (idx, row) in outcome.rows.iter().enumerate() {
                    let selected = app.selected == Some(idx);
                    if ui.selectable_label(selected, &row.source_filename).clicked() {
                        app.selected = Some(idx);
                        app.zoom = 1.0;
                        app.pan = egui::Vec2::ZERO;
                    }
                    ui.label(row.coordinates.len().to_string());
                    ui.monospace(&row.centroid);
                    ui.label(format!("{:.1}", row.area_hectares));
                    ui.end_row();
                }
            });
        }

        if !outcome.errors.is_empty() {
            ui.separator();
            ui.strong("Files ignored or failed");
            for err in &outcome.errors {
                ui.colored_label(egui::Color32::from_rgb(0xC0, 0x39, 0x2B), err.to_string());
            }
        }

        ui.separator();
        ui.collapsing("Raw report.json", |ui| {
            if let Ok(json) = serde_json::to_string_pretty(&BatchReport::from_outcome(outcome)) {
                ui.monospace(json);
            }
        });
    });
}

fn draw_preview(ui: &mut egui::Ui, app: &mut KmzConvertApp) {
    let Some(row) = selected_row(app) else {
        ui.label("Select a converted file.");
        return;
    };
    let ring = close_ring(&row.coordinates);
    let Some(extents) = BBox2::from_coords(&ring) else {
        ui.label("No extents.");
        return;
    };

    ui.label(format!(
        "{}: {:.1} ha, centroid {}",
        row.source_filename, row.area_hectares, row.centroid
    ));

    let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());
    let painter = ui.painter_at(rect);

    if response.dragged() {
        app.pan += response.drag_delta();
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.0 {
            let factor = (scroll / 200.0).exp();
            app.zoom = (app.zoom * factor).clamp(0.1, 30.0);
        }
    }

    let transform = WorldToScreen::new(rect, extents, app.pan, app.zoom);
    let points: Vec<egui::Pos2> = ring.iter().map(|c| transform.point(*c)).collect();

    painter.add(egui::Shape::closed_line(
        points.clone(),
        egui::Stroke::new(1.5, egui::Color32::from_rgb(0x31, 0xA3, 0x54)),
    ));
    if let Some(first) = points.first() {
        painter.circle_filled(*first, 3.0, egui::Color32::from_rgb(0xE3, 0x4A, 0x33));
    }
}

fn selected_row(app: &KmzConvertApp) -> Option<ReportRow> {
    let outcome = app.outcome.as_ref()?;
    outcome.rows.get(app.selected?).cloned()
}

fn write_json(path: &Path, outcome: &BatchOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(&BatchReport::from_outcome(outcome))
        .context("serialize json")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct WorldToScreen {
    rect: egui::Rect,
    center: Coordinate,
    scale: f32,
    pan: egui::Vec2,
}

impl WorldToScreen {
    fn new(rect: egui::Rect, world: BBox2, pan: egui::Vec2, zoom: f32) -> Self {
        let center = world.center();
        let world_w = world.width().max(1e-9) as f32;
        let world_h = world.height().max(1e-9) as f32;
        let sx = rect.width() / world_w;
        let sy = rect.height() / world_h;
        let scale = (sx.min(sy) * 0.9).max(1e-3) * zoom;
        Self {
            rect,
            center,
            scale,
            pan,
        }
    }

    /// Longitude maps to screen x, latitude to screen y (north up).
    fn point(&self, c: Coordinate) -> egui::Pos2 {
        let dx = (c.lon - self.center.lon) as f32;
        let dy = (c.lat - self.center.lat) as f32;
        let x = self.rect.center().x + self.pan.x + dx * self.scale;
        let y = self.rect.center().y + self.pan.y - dy * self.scale;
        egui::pos2(x, y)
    }
}
