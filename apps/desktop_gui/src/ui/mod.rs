//! UI layer for the desktop viewer: app shell and project-card widgets.

pub mod app;
