/*!
 * Interactive viewer for NYC property-sale averages by zipcode.
 *
 * All years are joined up front; the window then shows one rendered map with
 * a year slider, a hover tooltip (zipcode and average sale) and an export
 * button writing the current figure to PNG or SVG.
 *
 * Usage: `nycmap-gui [config.json]`
 */

use anyhow::Result;
use eframe::egui;
use nyc_sales_map::palette::build_palette;
use nyc_sales_map::viz::{self, ColorScale, FigureLayout};
use nyc_sales_map::{MapApp, MapConfig, YearSeries};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let cfg = match std::env::args_os().nth(1) {
        Some(path) => MapConfig::from_json_file(PathBuf::from(path))?,
        None => MapConfig::default(),
    };
    let series = YearSeries::from_config(&cfg)?;
    let scale = Arc::new(ColorScale::from_config(&cfg, build_palette()?)?);
    let layout = FigureLayout::with_map_size(cfg.map_width, cfg.map_height);
    let app = MapApp::new(series, scale, layout)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                layout.width() as f32 + 40.0,
                layout.height() as f32 + 120.0,
            ])
            .with_min_inner_size([400.0, 400.0])
            .with_title("NYC Property Sales"),
        ..Default::default()
    };

    eframe::run_native(
        "NYC Property Sales",
        options,
        Box::new(|_cc| Ok(Box::new(MapWindow::new(app)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Window state around the live map.
struct MapWindow {
    app: MapApp,
    texture: Option<egui::TextureHandle>,
    /// Year the texture was rendered for.
    texture_year: Option<i32>,
    status_message: String,
    error_message: String,
}

impl MapWindow {
    fn new(app: MapApp) -> Self {
        Self {
            app,
            texture: None,
            texture_year: None,
            status_message: String::new(),
            error_message: String::new(),
        }
    }

    /// Re-render the figure when the live year changed since the last frame.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let year = self.app.source().year;
        if self.texture.is_some() && self.texture_year == Some(year) {
            return;
        }
        let layout = self.app.figure().layout;
        let rendered = self
            .app
            .current()
            .map_err(anyhow::Error::from)
            .and_then(|entry| viz::render_to_rgb(self.app.figure(), &entry.geometry));
        match rendered {
            Ok(rgb) => {
                let image = egui::ColorImage::from_rgb(
                    [layout.width() as usize, layout.height() as usize],
                    &rgb,
                );
                self.texture = Some(ctx.load_texture("map", image, egui::TextureOptions::LINEAR));
                self.texture_year = Some(year);
            }
            Err(err) => {
                log::error!("rendering {year} failed: {err:#}");
                self.error_message = format!("Failed to render {year}: {err}");
                self.texture_year = Some(year);
            }
        }
    }

    fn export(&mut self) {
        let year = self.app.source().year;
        let start_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let Some(path) = rfd::FileDialog::new()
            .set_directory(start_dir)
            .set_file_name(format!("nyc_sales_{year}.png"))
            .add_filter("PNG image", &["png"])
            .add_filter("SVG image", &["svg"])
            .save_file()
        else {
            return;
        };
        let result = self
            .app
            .current()
            .map_err(anyhow::Error::from)
            .and_then(|entry| viz::render_to_path(self.app.figure(), &entry.geometry, &path));
        match result {
            Ok(()) => {
                self.error_message.clear();
                self.status_message = format!("Saved {}", path.display());
            }
            Err(err) => {
                self.status_message.clear();
                self.error_message = format!("Failed to export: {err}");
            }
        }
    }
}

impl eframe::App for MapWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let slider = self.app.slider();
                let mut year = slider.value;
                let response = ui.add(
                    egui::Slider::new(&mut year, slider.range.start..=slider.range.end)
                        .step_by(slider.step as f64)
                        .text("Year"),
                );
                if response.changed()
                    && let Err(err) = self.app.on_year_change(year)
                {
                    self.error_message = err.to_string();
                }

                ui.add_space(20.0);
                if ui.button("Export…").clicked() {
                    self.export();
                }
            });

            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
            ui.add_space(6.0);
        });

        self.refresh_texture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                let Some(texture) = &self.texture else {
                    ui.spinner();
                    return;
                };
                let image = egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture))
                    .sense(egui::Sense::hover());
                let response = ui.add(image);

                // Displayed size may differ from the rendered size; map back to figure pixels.
                let tooltip = response.hover_pos().and_then(|pos| {
                    let rect = response.rect;
                    let [w, h] = texture.size();
                    let px = (pos.x - rect.left()) as f64 * w as f64 / rect.width() as f64;
                    let py = (pos.y - rect.top()) as f64 * h as f64 / rect.height() as f64;
                    self.app.tooltip_at_pixel(px, py)
                });
                if let Some(tip) = tooltip {
                    response.on_hover_text_at_pointer(tip.lines().join("\n"));
                }
            });
        });
    }
}
