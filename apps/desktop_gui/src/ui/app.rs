//! App shell: portfolio header, project cards with image carousels, status bar.

use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};

use carousel_core::{apply_ops, CarouselEvent, CarouselSurface};
use shared::domain::{CarouselId, ProjectId};
use shared::manifest::{Portfolio, Project, ProjectPeriod};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::ViewerSettings;
use crate::controller::events::{
    describe_portfolio_failure, err_label, CardBinding, UiErrorContext, UiEvent,
};
use crate::controller::orchestration::dispatch_backend_command;
use crate::media::SlideImage;

pub(crate) const SETTINGS_STORAGE_KEY: &str = "folio.viewer.settings";

const CAROUSEL_HEIGHT: f32 = 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PersistedViewerPrefs {
    pub text_scale: f32,
    pub dark_mode: bool,
}

impl Default for PersistedViewerPrefs {
    fn default() -> Self {
        Self {
            text_scale: 1.0,
            dark_mode: true,
        }
    }
}

impl PersistedViewerPrefs {
    fn clamped(self) -> Self {
        Self {
            text_scale: self.text_scale.clamp(0.8, 1.4),
            dark_mode: self.dark_mode,
        }
    }
}

/// Slide and indicator state for one card, mutated only by controller ops.
#[derive(Debug)]
pub(crate) struct CarouselVisuals {
    hidden: Vec<bool>,
    opacity: Vec<f32>,
    indicator_current: Vec<bool>,
}

impl CarouselVisuals {
    fn new(slide_count: usize) -> Self {
        Self {
            hidden: vec![true; slide_count],
            opacity: vec![0.0; slide_count],
            indicator_current: vec![false; slide_count],
        }
    }

    fn visible_slide(&self) -> Option<usize> {
        self.hidden.iter().position(|hidden| !hidden)
    }

    fn opacity_of(&self, index: usize) -> f32 {
        self.opacity.get(index).copied().unwrap_or(0.0)
    }

    fn is_current_indicator(&self, index: usize) -> bool {
        self.indicator_current.get(index).copied().unwrap_or(false)
    }
}

impl CarouselSurface for CarouselVisuals {
    fn set_slide_hidden(&mut self, index: usize, hidden: bool) {
        if let Some(slot) = self.hidden.get_mut(index) {
            *slot = hidden;
        }
    }

    fn set_slide_opacity(&mut self, index: usize, opacity: f32) {
        if let Some(slot) = self.opacity.get_mut(index) {
            *slot = opacity;
        }
    }

    fn set_indicator_current(&mut self, index: usize, current: bool) {
        if let Some(slot) = self.indicator_current.get_mut(index) {
            *slot = current;
        }
    }
}

enum SlideImageSlot {
    NotRequested,
    Loading,
    Ready {
        image: SlideImage,
        texture: Option<egui::TextureHandle>,
    },
    Failed(String),
}

struct ProjectCard {
    project: Project,
    binding: CardBinding,
    visuals: CarouselVisuals,
    hovered: bool,
    slides: Vec<SlideImageSlot>,
}

struct PortfolioHeader {
    title: String,
    owner: String,
    tagline: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

pub struct PortfolioApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    settings: ViewerSettings,

    header: Option<PortfolioHeader>,
    cards: Vec<ProjectCard>,
    cards_by_carousel: HashMap<CarouselId, usize>,

    status: String,
    status_banner: Option<StatusBanner>,

    prefs: PersistedViewerPrefs,
    applied_prefs: Option<PersistedViewerPrefs>,
    settings_open: bool,
}

impl PortfolioApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: ViewerSettings,
        persisted: Option<PersistedViewerPrefs>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            settings,
            header: None,
            cards: Vec::new(),
            cards_by_carousel: HashMap::new(),
            status: "Loading portfolio...".to_string(),
            status_banner: None,
            prefs: persisted.unwrap_or_default().clamped(),
            applied_prefs: None,
            settings_open: false,
        };
        let cmd = BackendCommand::LoadPortfolio {
            manifest_path: app.settings.portfolio_path.clone(),
        };
        dispatch_backend_command(&app.cmd_tx, cmd, &mut app.status);
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::PortfolioLoaded { portfolio, cards } => {
                    self.install_portfolio(portfolio, cards);
                }
                UiEvent::Surface { carousel_id, ops } => {
                    if let Some(&index) = self.cards_by_carousel.get(&carousel_id) {
                        if let Some(card) = self.cards.get_mut(index) {
                            apply_ops(&mut card.visuals, &ops);
                        }
                    }
                }
                UiEvent::SlideImageLoaded {
                    project_id,
                    slide,
                    image,
                } => {
                    if let Some(slot) = self.slide_slot_mut(project_id, slide) {
                        *slot = SlideImageSlot::Ready {
                            image,
                            texture: None,
                        };
                    }
                }
                UiEvent::SlideImageFailed {
                    project_id,
                    slide,
                    reason,
                } => {
                    if let Some(slot) = self.slide_slot_mut(project_id, slide) {
                        *slot = SlideImageSlot::Failed(reason);
                    }
                }
                UiEvent::Error(err) => {
                    self.status = if err.context() == UiErrorContext::PortfolioLoad {
                        describe_portfolio_failure(err.message())
                    } else {
                        format!("{} error: {}", err_label(err.category()), err.message())
                    };
                    self.status_banner = Some(StatusBanner {
                        severity: StatusBannerSeverity::Error,
                        message: self.status.clone(),
                    });
                }
            }
        }
    }

    fn slide_slot_mut(
        &mut self,
        project_id: ProjectId,
        slide: usize,
    ) -> Option<&mut SlideImageSlot> {
        self.cards
            .iter_mut()
            .find(|card| card.binding.project_id == project_id)
            .and_then(|card| card.slides.get_mut(slide))
    }

    fn install_portfolio(&mut self, portfolio: Portfolio, bindings: Vec<CardBinding>) {
        self.header = Some(PortfolioHeader {
            title: portfolio.title,
            owner: portfolio.owner,
            tagline: portfolio.tagline,
        });
        self.cards.clear();
        self.cards_by_carousel.clear();
        for (project, binding) in portfolio.projects.into_iter().zip(bindings) {
            if let Some(carousel_id) = binding.carousel_id {
                self.cards_by_carousel.insert(carousel_id, self.cards.len());
            }
            self.cards.push(ProjectCard {
                visuals: CarouselVisuals::new(binding.slide_count),
                slides: (0..binding.slide_count)
                    .map(|_| SlideImageSlot::NotRequested)
                    .collect(),
                hovered: false,
                project,
                binding,
            });
        }
        self.status = format!("Loaded {} project(s)", self.cards.len());
        self.status_banner = None;
    }

    fn apply_prefs_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_prefs == Some(self.prefs) {
            return;
        }
        let mut style = egui::Style::default();
        style.visuals = if self.prefs.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        for font_id in style.text_styles.values_mut() {
            font_id.size *= self.prefs.text_scale;
        }
        ctx.set_style(style);
        self.applied_prefs = Some(self.prefs);
    }

    fn show_header_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("portfolio_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.vertical(|ui| match &self.header {
                    Some(header) => {
                        ui.heading(&header.title);
                        ui.horizontal(|ui| {
                            ui.strong(&header.owner);
                            if let Some(tagline) = &header.tagline {
                                ui.weak(format!("· {tagline}"));
                            }
                        });
                    }
                    None => {
                        ui.heading("Portfolio");
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.settings_open = true;
                    }
                    if ui.button("Open...").clicked() {
                        self.open_manifest_dialog();
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn open_manifest_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Portfolio manifest", &["toml"])
            .pick_file()
        {
            self.settings.portfolio_path = path.clone();
            self.status = format!("Loading {}", path.display());
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::LoadPortfolio {
                    manifest_path: path,
                },
                &mut self.status,
            );
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
            });
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::new()
                .fill(fill)
                .stroke(stroke)
                .corner_radius(egui::CornerRadius::same(8))
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_cards(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            if self.cards.is_empty() {
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.weak("No projects loaded yet.");
                });
                return;
            }
            egui::ScrollArea::vertical()
                .id_salt("project_cards_scroll")
                .auto_shrink(false)
                .show(ui, |ui| {
                    for index in 0..self.cards.len() {
                        self.show_project_card(ui, index);
                        ui.add_space(14.0);
                    }
                });
        });
    }

    fn show_project_card(&mut self, ui: &mut egui::Ui, index: usize) {
        let mut commands: Vec<BackendCommand> = Vec::new();

        {
            let card = &mut self.cards[index];
            let frame = egui::Frame::new()
                .fill(ui.visuals().faint_bg_color)
                .stroke(egui::Stroke::new(
                    1.0,
                    ui.visuals().widgets.noninteractive.bg_stroke.color,
                ))
                .corner_radius(egui::CornerRadius::same(10))
                .inner_margin(egui::Margin::symmetric(14, 12));

            let response = frame
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.heading(&card.project.title);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if let Some(period) = &card.project.period {
                                ui.weak(period_label(period));
                            }
                        });
                    });
                    if !card.project.summary.is_empty() {
                        ui.label(&card.project.summary);
                    }
                    if !card.project.links.is_empty() {
                        ui.horizontal_wrapped(|ui| {
                            for link in &card.project.links {
                                ui.hyperlink_to(&link.label, link.url.as_str());
                            }
                        });
                    }
                    if card.binding.slide_count > 0 {
                        ui.add_space(8.0);
                        show_carousel(ui, card, &mut commands);
                    }
                })
                .response;

            // The whole card is the hover target that drives auto-advance.
            if let Some(carousel_id) = card.binding.carousel_id {
                let hovered = response.contains_pointer();
                if hovered != card.hovered {
                    card.hovered = hovered;
                    let event = if hovered {
                        CarouselEvent::PointerEnter
                    } else {
                        CarouselEvent::PointerLeave
                    };
                    commands.push(BackendCommand::CarouselInput { carousel_id, event });
                }
            }
        }

        for cmd in commands {
            dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        }
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.settings_open {
            return;
        }

        egui::Window::new("Viewer Settings")
            .open(&mut self.settings_open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add(
                    egui::Slider::new(&mut self.prefs.text_scale, 0.8..=1.4)
                        .text("Text scale")
                        .step_by(0.05),
                );
                ui.checkbox(&mut self.prefs.dark_mode, "Dark mode");
                if ui.button("Reset to defaults").clicked() {
                    self.prefs = PersistedViewerPrefs::default();
                }
            });
    }
}

fn show_carousel(ui: &mut egui::Ui, card: &mut ProjectCard, commands: &mut Vec<BackendCommand>) {
    let visible = card.visuals.visible_slide().unwrap_or(0);

    // Request the visible slide eagerly and the next one ahead of the
    // auto-advance.
    request_slide_image(card, visible, commands);
    if card.binding.slide_count > 1 {
        request_slide_image(card, (visible + 1) % card.binding.slide_count, commands);
    }

    let slide_size = egui::vec2(ui.available_width(), CAROUSEL_HEIGHT);

    match &mut card.slides[visible] {
        SlideImageSlot::Ready { image, texture } => {
            let texture = texture.get_or_insert_with(|| {
                let color = egui::ColorImage::from_rgba_unmultiplied(
                    [image.width, image.height],
                    &image.rgba,
                );
                ui.ctx().load_texture(
                    format!("slide:{}:{}", card.binding.project_id.0, visible),
                    color,
                    egui::TextureOptions::LINEAR,
                )
            });
            let opacity = card.visuals.opacity_of(visible).clamp(0.0, 1.0);
            let tint = egui::Color32::from_white_alpha((opacity * 255.0).round() as u8);
            ui.vertical_centered(|ui| {
                ui.add(
                    egui::Image::new(&*texture)
                        .fit_to_exact_size(slide_size)
                        .tint(tint),
                );
            });
        }
        SlideImageSlot::NotRequested | SlideImageSlot::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(CAROUSEL_HEIGHT / 2.0 - 10.0);
                ui.spinner();
                ui.add_space(CAROUSEL_HEIGHT / 2.0 - 10.0);
            });
        }
        SlideImageSlot::Failed(reason) => {
            let reason = reason.clone();
            ui.vertical_centered(|ui| {
                ui.add_space(CAROUSEL_HEIGHT / 2.0 - 10.0);
                ui.weak(format!("image unavailable: {reason}"));
                ui.add_space(CAROUSEL_HEIGHT / 2.0 - 10.0);
            });
        }
    }

    if !card.binding.controls_bound && !card.binding.indicators_bound {
        return;
    }
    let carousel_id = match card.binding.carousel_id {
        Some(carousel_id) => carousel_id,
        None => return,
    };

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        if card.binding.controls_bound && ui.button("<").on_hover_text("Previous slide").clicked()
        {
            commands.push(BackendCommand::CarouselInput {
                carousel_id,
                event: CarouselEvent::PrevPressed,
            });
        }
        if card.binding.indicators_bound {
            for dot in 0..card.binding.slide_count {
                let current = card.visuals.is_current_indicator(dot);
                let color = if current {
                    ui.visuals().strong_text_color()
                } else {
                    ui.visuals().weak_text_color()
                };
                let label = egui::RichText::new("●")
                    .size(if current { 12.0 } else { 9.0 })
                    .color(color);
                if ui
                    .selectable_label(current, label)
                    .on_hover_text(format!("Slide {}", dot + 1))
                    .clicked()
                {
                    commands.push(BackendCommand::CarouselInput {
                        carousel_id,
                        event: CarouselEvent::IndicatorPressed(dot),
                    });
                }
            }
        }
        if card.binding.controls_bound && ui.button(">").on_hover_text("Next slide").clicked() {
            commands.push(BackendCommand::CarouselInput {
                carousel_id,
                event: CarouselEvent::NextPressed,
            });
        }
    });
}

fn request_slide_image(card: &mut ProjectCard, slide: usize, commands: &mut Vec<BackendCommand>) {
    let Some(slot) = card.slides.get_mut(slide) else {
        return;
    };
    if !matches!(slot, SlideImageSlot::NotRequested) {
        return;
    }
    if let Some(path) = card.project.images.get(slide) {
        commands.push(BackendCommand::FetchSlideImage {
            project_id: card.binding.project_id,
            slide,
            path: path.clone(),
        });
        *slot = SlideImageSlot::Loading;
    }
}

fn period_label(period: &ProjectPeriod) -> String {
    let start = period.start.format("%b %Y");
    match period.end {
        Some(end) => format!("{start} - {}", end.format("%b %Y")),
        None => format!("{start} - present"),
    }
}

impl eframe::App for PortfolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_prefs_if_needed(ctx);

        self.show_header_panel(ctx);
        self.show_status_bar(ctx);
        self.show_cards(ctx);
        self.show_settings_window(ctx);

        // Hover-edge detection needs a frame even when the pointer rests.
        if self.cards.iter().any(|card| card.hovered) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.prefs) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::SurfaceOp;

    #[test]
    fn visuals_track_controller_ops() {
        let mut visuals = CarouselVisuals::new(3);
        assert_eq!(visuals.visible_slide(), None);

        apply_ops(
            &mut visuals,
            &[
                SurfaceOp::SlideHidden {
                    index: 0,
                    hidden: true,
                },
                SurfaceOp::SlideHidden {
                    index: 1,
                    hidden: false,
                },
                SurfaceOp::SlideHidden {
                    index: 2,
                    hidden: true,
                },
                SurfaceOp::SlideOpacity {
                    index: 1,
                    opacity: 1.0,
                },
                SurfaceOp::IndicatorCurrent {
                    index: 1,
                    current: true,
                },
            ],
        );

        assert_eq!(visuals.visible_slide(), Some(1));
        assert_eq!(visuals.opacity_of(1), 1.0);
        assert!(visuals.is_current_indicator(1));
        assert!(!visuals.is_current_indicator(0));
    }

    #[test]
    fn visuals_ignore_out_of_range_ops() {
        let mut visuals = CarouselVisuals::new(1);
        apply_ops(
            &mut visuals,
            &[SurfaceOp::SlideOpacity {
                index: 9,
                opacity: 1.0,
            }],
        );
        assert_eq!(visuals.opacity_of(9), 0.0);
    }

    #[test]
    fn period_labels_cover_open_and_closed_ranges() {
        let closed = ProjectPeriod {
            start: chrono::NaiveDate::from_ymd_opt(2023, 5, 1).expect("date"),
            end: chrono::NaiveDate::from_ymd_opt(2024, 2, 1),
        };
        assert_eq!(period_label(&closed), "May 2023 - Feb 2024");

        let open = ProjectPeriod {
            start: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"),
            end: None,
        };
        assert_eq!(period_label(&open), "Jun 2024 - present");
    }

    #[test]
    fn prefs_clamp_text_scale() {
        let prefs = PersistedViewerPrefs {
            text_scale: 9.0,
            dark_mode: false,
        }
        .clamped();
        assert_eq!(prefs.text_scale, 1.4);
        assert!(!prefs.dark_mode);
    }
}
