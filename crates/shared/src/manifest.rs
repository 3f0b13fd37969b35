//! Portfolio manifest model.
//!
//! The viewer consumes the page structure it does not own as a TOML manifest:
//! portfolio metadata plus one `[[project]]` table per project card. Dates
//! are quoted ISO strings (`"2023-05-01"`), image paths are resolved against
//! the manifest's own directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use url::Url;

use crate::error::ManifestError;

#[derive(Debug, Clone, Deserialize)]
pub struct Portfolio {
    pub title: String,
    pub owner: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default, rename = "project")]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub period: Option<ProjectPeriod>,
    #[serde(default)]
    pub links: Vec<ProjectLink>,
    #[serde(default)]
    pub images: Vec<PathBuf>,
    /// Render indicator dots under the carousel.
    #[serde(default = "default_true")]
    pub indicators: bool,
    /// Render previous/next controls next to the carousel.
    #[serde(default = "default_true")]
    pub controls: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProjectPeriod {
    pub start: NaiveDate,
    /// `None` means the project is ongoing.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectLink {
    pub label: String,
    pub url: Url,
}

fn default_true() -> bool {
    true
}

impl Portfolio {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = std::fs::read_to_string(path)?;
        let mut portfolio = Self::from_toml_str(&raw)?;
        if let Some(base) = path.parent() {
            portfolio.resolve_image_paths(base);
        }
        Ok(portfolio)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ManifestError> {
        let portfolio: Portfolio = toml::from_str(raw)?;
        portfolio.validate()?;
        Ok(portfolio)
    }

    /// Join relative image paths onto `base` (normally the manifest's
    /// directory). Absolute paths are left untouched.
    pub fn resolve_image_paths(&mut self, base: &Path) {
        for project in &mut self.projects {
            for image in &mut project.images {
                if image.is_relative() {
                    *image = base.join(&*image);
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.title.trim().is_empty() {
            return Err(ManifestError::Validation(
                "portfolio title must not be empty".to_string(),
            ));
        }
        for (index, project) in self.projects.iter().enumerate() {
            if project.title.trim().is_empty() {
                return Err(ManifestError::Validation(format!(
                    "project #{} has an empty title",
                    index + 1
                )));
            }
            if let Some(period) = &project.period {
                if let Some(end) = period.end {
                    if end < period.start {
                        return Err(ManifestError::Validation(format!(
                            "project '{}' ends before it starts",
                            project.title
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
