//! Tokio driver: one task per carousel, selecting over its event channel and
//! the earliest armed deadline.

use shared::domain::CarouselId;
use tokio::{
    sync::mpsc::{self, error::SendError},
    task::JoinHandle,
    time::Instant,
};
use tracing::debug;

use crate::{
    surface::{BufferSurface, SurfaceOp},
    CarouselController, CarouselEvent, CarouselTiming,
};

/// Rendering updates emitted by a controller task toward the viewer.
#[derive(Debug, Clone)]
pub struct SurfaceUpdate {
    pub carousel_id: CarouselId,
    pub ops: Vec<SurfaceOp>,
}

/// Owning handle for one carousel task. Dropping the handle stops the task.
pub struct CarouselHandle {
    carousel_id: CarouselId,
    events: mpsc::UnboundedSender<CarouselEvent>,
    task: JoinHandle<()>,
}

impl CarouselHandle {
    pub fn carousel_id(&self) -> CarouselId {
        self.carousel_id
    }

    /// Queue an event for the controller. Returns false once the task is gone.
    pub fn send(&self, event: CarouselEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

impl Drop for CarouselHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_carousel(
    carousel_id: CarouselId,
    slide_count: usize,
    timing: CarouselTiming,
    updates: mpsc::UnboundedSender<SurfaceUpdate>,
) -> CarouselHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_carousel(
        carousel_id,
        slide_count,
        timing,
        events_rx,
        updates,
    ));
    CarouselHandle {
        carousel_id,
        events: events_tx,
        task,
    }
}

async fn run_carousel(
    carousel_id: CarouselId,
    slide_count: usize,
    timing: CarouselTiming,
    mut events: mpsc::UnboundedReceiver<CarouselEvent>,
    updates: mpsc::UnboundedSender<SurfaceUpdate>,
) {
    let mut controller = CarouselController::new(slide_count, timing);
    let mut buffer = BufferSurface::new();

    controller.sync_surface(Instant::now(), &mut buffer);
    if flush(carousel_id, &mut buffer, &updates).is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => controller.handle(event, Instant::now(), &mut buffer),
                None => break,
            },
            _ = sleep_until_deadline(controller.next_deadline()) => {
                controller.fire_due(Instant::now(), &mut buffer);
            }
        }
        if flush(carousel_id, &mut buffer, &updates).is_err() {
            break;
        }
    }
    debug!(carousel = carousel_id.0, "carousel task stopped");
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

fn flush(
    carousel_id: CarouselId,
    buffer: &mut BufferSurface,
    updates: &mpsc::UnboundedSender<SurfaceUpdate>,
) -> Result<(), SendError<SurfaceUpdate>> {
    if buffer.is_empty() {
        return Ok(());
    }
    updates.send(SurfaceUpdate {
        carousel_id,
        ops: buffer.drain(),
    })
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
