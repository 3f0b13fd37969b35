use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

pub mod driver;
pub mod surface;

pub use driver::{spawn_carousel, CarouselHandle, SurfaceUpdate};
pub use surface::{apply_ops, BufferSurface, CarouselSurface, SurfaceOp};

const DEFAULT_ADVANCE_PERIOD: Duration = Duration::from_millis(2000);
const DEFAULT_RESUME_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(50);

/// Timer windows for one carousel.
///
/// These are UX tuning rather than semantics; the viewer config may override
/// any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselTiming {
    /// Period of the repeating auto-advance while the pointer is over the card.
    pub advance_period: Duration,
    /// Delay before auto-advance restarts after a manual interaction.
    pub resume_delay: Duration,
    /// Delay before the carousel snaps back to the first slide once the
    /// pointer has left the card.
    pub reset_delay: Duration,
    /// Delay between unhiding a slide and raising it to full opacity.
    pub reveal_delay: Duration,
}

impl Default for CarouselTiming {
    fn default() -> Self {
        Self {
            advance_period: DEFAULT_ADVANCE_PERIOD,
            resume_delay: DEFAULT_RESUME_DELAY,
            reset_delay: DEFAULT_RESET_DELAY,
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

/// Pointer and navigation input for one carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselEvent {
    PointerEnter,
    PointerLeave,
    NextPressed,
    PrevPressed,
    IndicatorPressed(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPhase {
    /// Pointer outside the card; nothing runs except a possible pending reset
    /// back to the first slide.
    Idle,
    /// Pointer over the card; the repeating auto-advance is armed.
    Hovering,
    /// Pointer over the card, but a manual interaction paused auto-advance;
    /// a resume one-shot is pending.
    HoveringPaused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Advance,
    Reset,
    Resume,
    Reveal,
}

enum Navigation {
    Next,
    Prev,
    Jump(usize),
}

/// State machine for one project-card carousel: slide index, hover phase, and
/// the timer slots that drive auto-advance, reset, resume, and reveal.
///
/// The controller is deterministic: every entry point takes `now` explicitly,
/// and rendering happens through the [`CarouselSurface`] it is handed. At most
/// one deadline is armed per slot; arming a slot always replaces the previous
/// deadline.
pub struct CarouselController {
    slide_count: usize,
    current: usize,
    phase: HoverPhase,
    timing: CarouselTiming,
    advance_at: Option<Instant>,
    reset_at: Option<Instant>,
    resume_at: Option<Instant>,
    reveal_at: Option<Instant>,
}

impl CarouselController {
    pub fn new(slide_count: usize, timing: CarouselTiming) -> Self {
        Self {
            slide_count,
            current: 0,
            phase: HoverPhase::Idle,
            timing,
            advance_at: None,
            reset_at: None,
            resume_at: None,
            reveal_at: None,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn current_slide(&self) -> usize {
        self.current
    }

    pub fn phase(&self) -> HoverPhase {
        self.phase
    }

    pub fn auto_advance_active(&self) -> bool {
        self.advance_at.is_some()
    }

    /// Render the initial state onto the surface: the first slide shown, all
    /// others hidden.
    pub fn sync_surface(&mut self, now: Instant, surface: &mut dyn CarouselSurface) {
        self.show_slide(now, surface);
    }

    pub fn handle(&mut self, event: CarouselEvent, now: Instant, surface: &mut dyn CarouselSurface) {
        match event {
            CarouselEvent::PointerEnter => self.pointer_enter(now),
            CarouselEvent::PointerLeave => self.pointer_leave(now),
            CarouselEvent::NextPressed => self.navigate(Navigation::Next, now, surface),
            CarouselEvent::PrevPressed => self.navigate(Navigation::Prev, now, surface),
            CarouselEvent::IndicatorPressed(index) => {
                self.navigate(Navigation::Jump(index), now, surface)
            }
        }
    }

    /// Earliest armed deadline, if any. The driver sleeps until this.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.earliest_armed().map(|(at, _)| at)
    }

    /// Fire every armed deadline that is due at `now`, earliest first.
    pub fn fire_due(&mut self, now: Instant, surface: &mut dyn CarouselSurface) {
        while let Some((at, kind)) = self.earliest_armed() {
            if at > now {
                break;
            }
            match kind {
                TimerKind::Advance => {
                    self.advance_at = None;
                    self.current = (self.current + 1) % self.slide_count;
                    self.show_slide(at, surface);
                    self.arm_advance(at);
                    debug!(slide = self.current, "auto-advanced");
                }
                TimerKind::Reset => {
                    self.reset_at = None;
                    if self.phase == HoverPhase::Idle {
                        self.current = 0;
                        self.show_slide(at, surface);
                        debug!("reset to first slide after pointer left");
                    }
                }
                TimerKind::Resume => {
                    self.resume_at = None;
                    if self.phase == HoverPhase::HoveringPaused {
                        self.phase = HoverPhase::Hovering;
                        self.arm_advance(at);
                        debug!("auto-advance resumed");
                    }
                }
                TimerKind::Reveal => {
                    self.reveal_at = None;
                    surface.set_slide_opacity(self.current, 1.0);
                }
            }
        }
    }

    fn pointer_enter(&mut self, now: Instant) {
        if self.phase != HoverPhase::Idle {
            return;
        }
        // Re-entering before the reset window elapses keeps the slide.
        self.reset_at = None;
        self.phase = HoverPhase::Hovering;
        self.arm_advance(now);
        debug!(slide = self.current, "pointer entered, auto-advance armed");
    }

    fn pointer_leave(&mut self, now: Instant) {
        if self.phase == HoverPhase::Idle {
            return;
        }
        // Leaving always wins: cancel the repeating advance and any pending
        // restart before scheduling the reset.
        self.phase = HoverPhase::Idle;
        self.advance_at = None;
        self.resume_at = None;
        self.reset_at = Some(now + self.timing.reset_delay);
        debug!("pointer left, reset scheduled");
    }

    fn navigate(&mut self, nav: Navigation, now: Instant, surface: &mut dyn CarouselSurface) {
        if self.slide_count == 0 {
            return;
        }
        let target = match nav {
            Navigation::Next => (self.current + 1) % self.slide_count,
            Navigation::Prev => {
                if self.current == 0 {
                    self.slide_count - 1
                } else {
                    self.current - 1
                }
            }
            Navigation::Jump(index) => {
                if index >= self.slide_count {
                    debug!(index, slides = self.slide_count, "ignoring out-of-range indicator");
                    return;
                }
                index
            }
        };

        self.advance_at = None;
        self.current = target;
        self.show_slide(now, surface);

        if self.phase != HoverPhase::Idle {
            self.phase = HoverPhase::HoveringPaused;
            self.resume_at = Some(now + self.timing.resume_delay);
            debug!(slide = self.current, "auto-advance paused after interaction");
        }
        // In Idle a pending reset stays armed: the pointer is still outside,
        // so the reset rule keeps the last word.
    }

    /// Mirror the slide and indicator state onto the surface. The shown slide
    /// is unhidden at zero opacity and revealed by a later one-shot; every
    /// other slide is hidden immediately.
    fn show_slide(&mut self, now: Instant, surface: &mut dyn CarouselSurface) {
        for index in 0..self.slide_count {
            let shown = index == self.current;
            surface.set_slide_hidden(index, !shown);
            surface.set_slide_opacity(index, 0.0);
            surface.set_indicator_current(index, shown);
        }
        if self.slide_count > 0 {
            self.reveal_at = Some(now + self.timing.reveal_delay);
        }
    }

    fn arm_advance(&mut self, now: Instant) {
        if self.slide_count > 1 {
            // A zero period would re-fire within the same instant forever.
            let period = self.timing.advance_period.max(Duration::from_millis(1));
            self.advance_at = Some(now + period);
        }
    }

    fn earliest_armed(&self) -> Option<(Instant, TimerKind)> {
        [
            (self.advance_at, TimerKind::Advance),
            (self.reset_at, TimerKind::Reset),
            (self.resume_at, TimerKind::Resume),
            (self.reveal_at, TimerKind::Reveal),
        ]
        .into_iter()
        .filter_map(|(at, kind)| at.map(|at| (at, kind)))
        .min_by_key(|(at, _)| *at)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
