//! UI/backend events and error modeling for the viewer controller layer.

use carousel_core::SurfaceOp;
use shared::domain::{CarouselId, ProjectId};
use shared::manifest::Portfolio;

use crate::media::SlideImage;

/// What the startup scan discovered for one project card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardBinding {
    pub project_id: ProjectId,
    /// `None` when the card has no slides; no controller is constructed and
    /// the card renders statically.
    pub carousel_id: Option<CarouselId>,
    pub slide_count: usize,
    pub indicators_bound: bool,
    pub controls_bound: bool,
}

pub enum UiEvent {
    Info(String),
    PortfolioLoaded {
        portfolio: Portfolio,
        cards: Vec<CardBinding>,
    },
    Surface {
        carousel_id: CarouselId,
        ops: Vec<SurfaceOp>,
    },
    SlideImageLoaded {
        project_id: ProjectId,
        slide: usize,
        image: SlideImage,
    },
    SlideImageFailed {
        project_id: ProjectId,
        slide: usize,
        reason: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Manifest,
    Media,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    PortfolioLoad,
}

/// Friendlier wording for the most common manifest failures.
pub fn describe_portfolio_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("no such file") || lower.contains("not found") {
        "Portfolio manifest not found; check the --portfolio path or folio.toml.".to_string()
    } else if lower.contains("parse") || lower.contains("invalid") {
        format!("Portfolio manifest is invalid: {message}")
    } else {
        format!("Portfolio load error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("manifest")
            || lower.contains("portfolio")
            || lower.contains("toml")
        {
            UiErrorCategory::Manifest
        } else if lower.contains("image") || lower.contains("decode") || lower.contains("unsupported")
        {
            UiErrorCategory::Media
        } else {
            UiErrorCategory::Internal
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Manifest => "Portfolio",
        UiErrorCategory::Media => "Image",
        UiErrorCategory::Internal => "Unexpected",
    }
}
