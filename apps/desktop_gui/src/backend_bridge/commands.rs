//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use carousel_core::CarouselEvent;
use shared::domain::{CarouselId, ProjectId};

pub enum BackendCommand {
    LoadPortfolio {
        manifest_path: PathBuf,
    },
    CarouselInput {
        carousel_id: CarouselId,
        event: CarouselEvent,
    },
    FetchSlideImage {
        project_id: ProjectId,
        slide: usize,
        path: PathBuf,
    },
}
