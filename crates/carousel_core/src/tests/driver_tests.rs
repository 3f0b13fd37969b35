use super::*;
use tokio::time::{advance, timeout, Duration};

/// Wait for the next update that changes which slide is shown, skipping
/// reveal-only batches.
async fn recv_shown(updates: &mut mpsc::UnboundedReceiver<SurfaceUpdate>) -> usize {
    loop {
        let update = updates.recv().await.expect("carousel task alive");
        let mut shown = None;
        for op in &update.ops {
            if let SurfaceOp::SlideHidden {
                index,
                hidden: false,
            } = op
            {
                shown = Some(*index);
            }
        }
        if let Some(index) = shown {
            return index;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn hover_advances_circularly_every_period() {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let handle = spawn_carousel(CarouselId(1), 3, CarouselTiming::default(), updates_tx);
    let start = Instant::now();

    assert_eq!(recv_shown(&mut updates).await, 0);
    assert!(handle.send(CarouselEvent::PointerEnter));

    assert_eq!(recv_shown(&mut updates).await, 1);
    assert_eq!(recv_shown(&mut updates).await, 2);
    assert_eq!(recv_shown(&mut updates).await, 0);
    assert_eq!(start.elapsed(), Duration::from_millis(6000));
}

#[tokio::test(start_paused = true)]
async fn manual_next_pauses_then_resumes_from_new_index() {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let handle = spawn_carousel(CarouselId(2), 3, CarouselTiming::default(), updates_tx);
    let start = Instant::now();

    assert_eq!(recv_shown(&mut updates).await, 0);
    assert!(handle.send(CarouselEvent::PointerEnter));
    assert_eq!(recv_shown(&mut updates).await, 1);
    assert_eq!(start.elapsed(), Duration::from_millis(2000));

    assert!(handle.send(CarouselEvent::NextPressed));
    assert_eq!(recv_shown(&mut updates).await, 2);
    assert_eq!(start.elapsed(), Duration::from_millis(2000));

    // Resume one-shot at +1000ms re-arms the advance, which fires at +3000ms.
    assert_eq!(recv_shown(&mut updates).await, 0);
    assert_eq!(start.elapsed(), Duration::from_millis(5000));
}

#[tokio::test(start_paused = true)]
async fn pointer_leave_wins_over_pending_resume() {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let handle = spawn_carousel(CarouselId(3), 3, CarouselTiming::default(), updates_tx);
    let start = Instant::now();

    assert_eq!(recv_shown(&mut updates).await, 0);
    assert!(handle.send(CarouselEvent::PointerEnter));
    assert!(handle.send(CarouselEvent::NextPressed));
    assert_eq!(recv_shown(&mut updates).await, 1);

    assert!(handle.send(CarouselEvent::PointerLeave));
    assert_eq!(recv_shown(&mut updates).await, 0);
    assert_eq!(start.elapsed(), Duration::from_millis(500));

    // Auto-advance must not restart once the pointer is confirmed outside.
    let further = timeout(Duration::from_secs(30), recv_shown(&mut updates)).await;
    assert!(further.is_err());
}

#[tokio::test(start_paused = true)]
async fn reentry_before_reset_keeps_current_slide() {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let handle = spawn_carousel(CarouselId(4), 3, CarouselTiming::default(), updates_tx);
    let start = Instant::now();

    assert_eq!(recv_shown(&mut updates).await, 0);
    assert!(handle.send(CarouselEvent::PointerEnter));
    assert_eq!(recv_shown(&mut updates).await, 1);

    assert!(handle.send(CarouselEvent::PointerLeave));
    advance(Duration::from_millis(300)).await;
    assert!(handle.send(CarouselEvent::PointerEnter));

    // No reset fired; the next change is the re-armed advance.
    assert_eq!(recv_shown(&mut updates).await, 2);
    assert_eq!(start.elapsed(), Duration::from_millis(4300));
}

#[tokio::test(start_paused = true)]
async fn single_slide_hover_never_auto_advances() {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let handle = spawn_carousel(CarouselId(5), 1, CarouselTiming::default(), updates_tx);

    assert_eq!(recv_shown(&mut updates).await, 0);
    assert!(handle.send(CarouselEvent::PointerEnter));

    let advanced = timeout(Duration::from_secs(30), recv_shown(&mut updates)).await;
    assert!(advanced.is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_the_task() {
    let (updates_tx, mut updates) = mpsc::unbounded_channel();
    let handle = spawn_carousel(CarouselId(6), 2, CarouselTiming::default(), updates_tx);

    assert_eq!(recv_shown(&mut updates).await, 0);
    drop(handle);

    let closed = timeout(Duration::from_secs(5), async {
        while updates.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok());
}
