//! Backend worker: owns the tokio runtime, the per-carousel controller tasks,
//! and slide image decoding.

use std::{collections::HashMap, path::Path, thread};

use anyhow::Context as _;
use carousel_core::{spawn_carousel, CarouselHandle, SurfaceUpdate};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{CarouselId, ProjectId};
use shared::manifest::Portfolio;
use tokio::sync::mpsc;

use crate::backend_bridge::commands::BackendCommand;
use crate::config::ViewerSettings;
use crate::controller::events::{CardBinding, UiError, UiErrorContext, UiEvent};
use crate::media::{self, SlideImage};

pub fn launch(
    settings: ViewerSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    repaint: egui::Context,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(run_worker(settings, cmd_rx, ui_tx, repaint));
    });
}

async fn run_worker(
    settings: ViewerSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    repaint: egui::Context,
) {
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel::<SurfaceUpdate>();

    // Forward controller render updates to the UI thread and wake it.
    {
        let ui_tx = ui_tx.clone();
        let repaint = repaint.clone();
        tokio::spawn(async move {
            while let Some(update) = updates_rx.recv().await {
                let _ = ui_tx.try_send(UiEvent::Surface {
                    carousel_id: update.carousel_id,
                    ops: update.ops,
                });
                repaint.request_repaint();
            }
        });
    }

    let mut carousels: HashMap<CarouselId, CarouselHandle> = HashMap::new();
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::LoadPortfolio { manifest_path } => {
                match load_portfolio(&manifest_path).await {
                    Ok(portfolio) => {
                        // Previous controllers stop when their handles drop.
                        carousels.clear();
                        let cards = plan_bindings(&portfolio);
                        for binding in &cards {
                            if let Some(carousel_id) = binding.carousel_id {
                                let handle = spawn_carousel(
                                    carousel_id,
                                    binding.slide_count,
                                    settings.timing,
                                    updates_tx.clone(),
                                );
                                carousels.insert(carousel_id, handle);
                            }
                        }
                        tracing::info!(
                            projects = portfolio.projects.len(),
                            carousels = carousels.len(),
                            "portfolio loaded"
                        );
                        let _ = ui_tx.try_send(UiEvent::PortfolioLoaded { portfolio, cards });
                    }
                    Err(err) => {
                        tracing::warn!("portfolio load failed: {err:#}");
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                            UiErrorContext::PortfolioLoad,
                            format!("{err:#}"),
                        )));
                    }
                }
                repaint.request_repaint();
            }
            BackendCommand::CarouselInput { carousel_id, event } => {
                match carousels.get(&carousel_id) {
                    Some(handle) => {
                        if !handle.send(event) {
                            tracing::warn!(carousel = carousel_id.0, "carousel task is gone");
                        }
                    }
                    None => {
                        tracing::warn!(carousel = carousel_id.0, "input for unknown carousel")
                    }
                }
            }
            BackendCommand::FetchSlideImage {
                project_id,
                slide,
                path,
            } => {
                let ui_tx = ui_tx.clone();
                let repaint = repaint.clone();
                tokio::spawn(async move {
                    let event = match load_slide_image(&path).await {
                        Ok(image) => UiEvent::SlideImageLoaded {
                            project_id,
                            slide,
                            image,
                        },
                        Err(reason) => {
                            tracing::warn!(
                                project = project_id.0,
                                slide,
                                "slide image failed: {reason}"
                            );
                            UiEvent::SlideImageFailed {
                                project_id,
                                slide,
                                reason,
                            }
                        }
                    };
                    let _ = ui_tx.try_send(event);
                    repaint.request_repaint();
                });
            }
        }
    }
}

/// One-time scan over the loaded portfolio: one controller per card that has
/// at least one slide. Cards without images stay static, and manifest flags
/// drop the indicator/control bindings.
pub(crate) fn plan_bindings(portfolio: &Portfolio) -> Vec<CardBinding> {
    portfolio
        .projects
        .iter()
        .enumerate()
        .map(|(index, project)| {
            let slide_count = project.images.len();
            let has_slides = slide_count > 0;
            CardBinding {
                project_id: ProjectId(index as i64),
                carousel_id: has_slides.then_some(CarouselId(index as i64)),
                slide_count,
                indicators_bound: has_slides && project.indicators,
                controls_bound: has_slides && project.controls,
            }
        })
        .collect()
}

async fn load_portfolio(path: &Path) -> anyhow::Result<Portfolio> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read portfolio manifest '{}'", path.display()))?;
    let mut portfolio = Portfolio::from_toml_str(&raw)?;
    if let Some(base) = path.parent() {
        portfolio.resolve_image_paths(base);
    }
    Ok(portfolio)
}

async fn load_slide_image(path: &Path) -> Result<SlideImage, String> {
    if !media::is_supported_image(path) {
        return Err(format!("unsupported image type: {}", path.display()));
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| format!("failed to read '{}': {err}", path.display()))?;
    media::decode_slide_image(&bytes)
}
