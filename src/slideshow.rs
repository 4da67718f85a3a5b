//! The playback driver: one master clock, one timer queue, one activity queue.

use std::cell::Cell;
use std::rc::Rc;

use crate::activity::{ActivityQueue, EventCallback, TimerEventQueue};
use crate::animation::ElementSnapshot;
use crate::clock::{ElapsedTime, SharedClock, TimeSource};
use crate::config::SlideShowConfig;
use crate::presentation::{MetaPresentation, PresentationInfo, SlideDisplay};
use crate::transition::{SurfaceRef, TransitionRegistry};

/// Set by timer callbacks, consumed after each update pass.
#[derive(Debug, Default)]
struct Signals {
    transition_ended: Cell<bool>,
    advance: Cell<bool>,
}

pub struct SlideShow {
    config: SlideShowConfig,
    master: SharedClock,
    events: TimerEventQueue,
    activities: ActivityQueue,
    presentation: MetaPresentation,
    registry: TransitionRegistry,
    surface: SurfaceRef,
    display: Box<dyn SlideDisplay>,
    signals: Rc<Signals>,
    entering_slide: Option<usize>,
    transition_running: bool,
    animations_running: bool,
    skipping: bool,
    rewinding: bool,
    idle: bool,
}

impl std::fmt::Debug for SlideShow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideShow")
            .field("current", &self.presentation.current_index())
            .field("slides", &self.presentation.number_of_slides())
            .field("transition_running", &self.transition_running)
            .field("animations_running", &self.animations_running)
            .field("idle", &self.idle)
            .finish_non_exhaustive()
    }
}

impl SlideShow {
    pub fn new(config: SlideShowConfig, source: Rc<dyn TimeSource>, surface: SurfaceRef) -> Self {
        let master: SharedClock = Rc::new(ElapsedTime::new(source));
        Self {
            config,
            events: TimerEventQueue::new(master.clone()),
            activities: ActivityQueue::new(master.clone()),
            master,
            presentation: MetaPresentation::new(),
            registry: TransitionRegistry::with_defaults(),
            surface,
            display: Box::new(()),
            signals: Rc::new(Signals::default()),
            entering_slide: None,
            transition_running: false,
            animations_running: false,
            skipping: false,
            rewinding: false,
            idle: true,
        }
    }

    pub fn with_registry(mut self, registry: TransitionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_display(mut self, display: Box<dyn SlideDisplay>) -> Self {
        self.display = display;
        self
    }

    pub fn config(&self) -> &SlideShowConfig {
        &self.config
    }

    pub fn master(&self) -> &SharedClock {
        &self.master
    }

    pub fn presentation(&self) -> &MetaPresentation {
        &self.presentation
    }

    pub fn activities(&self) -> &ActivityQueue {
        &self.activities
    }

    pub fn events(&self) -> &TimerEventQueue {
        &self.events
    }

    pub fn current_index(&self) -> Option<usize> {
        self.presentation.current_index()
    }

    pub fn is_running(&self) -> bool {
        !self.idle
    }

    pub fn is_transition_playing(&self) -> bool {
        self.transition_running
    }

    pub fn is_animation_playing(&self) -> bool {
        self.animations_running
    }

    /// Replace the slide deck. Anything still running is dropped.
    pub fn load(&mut self, info: &PresentationInfo) {
        self.dispose();
        self.presentation
            .update(info, &self.master, self.config.minimum_frames_per_second);
    }

    /// Element states of the current slide.
    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        self.presentation
            .current_slide()
            .map(|slide| slide.animations().snapshot())
            .unwrap_or_default()
    }

    /// Run one scheduling pass. Returns seconds until the next update is
    /// needed, or `None` once nothing is pending.
    pub fn update(&mut self) -> Option<f64> {
        self.master.hold_timer();
        self.events.process(&mut self.activities);
        self.activities.process(&mut self.events);
        self.activities.process_dequeued();
        self.master.release_timer();

        self.handle_signals();

        let minimum = self.config.minimum_timeout();
        let timeout = if !self.activities.is_empty() {
            Some(minimum)
        } else {
            self.events
                .next_timeout()
                .map(|t| t.clamp(minimum, self.config.maximum_timeout.max(minimum)))
        };
        self.idle = timeout.is_none();
        timeout
    }

    fn handle_signals(&mut self) {
        if self.signals.transition_ended.take() {
            if let Some(index) = self.entering_slide.take() {
                self.notify_transition_end(index);
            }
        }

        if self.animations_running
            && self
                .presentation
                .current_slide()
                .is_none_or(|slide| slide.animations().all_finished())
        {
            self.animations_running = false;
            self.notify_animations_end();
        }

        if self.signals.advance.take() {
            tracing::debug!("auto-advancing to the next slide");
            self.next_slide();
        }
    }

    /// Show the first slide, with its transition.
    pub fn start(&mut self, index: usize) -> bool {
        self.display_slide(index, None, false)
    }

    #[tracing::instrument(skip(self))]
    pub fn display_slide(
        &mut self,
        new_slide: usize,
        old_slide: Option<usize>,
        skip_transition: bool,
    ) -> bool {
        if new_slide >= self.presentation.number_of_slides() {
            tracing::warn!(
                slides = self.presentation.number_of_slides(),
                "no slide to display, end of show"
            );
            return false;
        }
        if self.transition_running {
            self.skip_transition();
        }
        if let Some(old) = old_slide {
            self.clean_leaving_slide(old);
        }
        self.presentation
            .set_current_slide(new_slide, self.display.as_mut());

        let forward = old_slide.is_none_or(|old| new_slide > old);
        if self.config.slide_transitions && !skip_transition && forward && self.start_transition(new_slide) {
            self.update();
            return true;
        }

        self.notify_transition_end(new_slide);
        self.update();
        true
    }

    fn start_transition(&mut self, index: usize) -> bool {
        let Some(transition) = self
            .presentation
            .meta_slide_by_index(index)
            .and_then(|slide| slide.transition())
            .filter(|t| t.is_valid())
        else {
            return false;
        };

        let activity =
            transition.create_activity(&self.registry, self.surface.clone(), &self.master);
        if !activity.borrow().is_valid() {
            tracing::warn!(kind = %transition.kind(), "transition activity is unusable, skipping it");
            return false;
        }
        if !self.activities.add_activity(activity.clone()) {
            return false;
        }
        let signals = Rc::downgrade(&self.signals);
        let on_end: EventCallback = Rc::new(move |_queue: &mut ActivityQueue| {
            if let Some(signals) = signals.upgrade() {
                signals.transition_ended.set(true);
            }
        });
        activity.borrow_mut().activate(Some(on_end));
        tracing::debug!(kind = %transition.kind(), duration = transition.duration(), "transition started");
        self.entering_slide = Some(index);
        self.transition_running = true;
        true
    }

    fn clean_leaving_slide(&mut self, index: usize) {
        if let Some(slide) = self.presentation.meta_slide_by_index(index) {
            let animations = slide.animations();
            if animations.is_animated() {
                animations.end(&mut self.activities, &mut self.events);
                self.events.force_empty(&mut self.activities);
            }
        }
        self.animations_running = false;
        self.clear_queues();
    }

    fn notify_transition_end(&mut self, index: usize) {
        tracing::debug!(index, "transition ended");
        self.transition_running = false;
        self.start_effects(index);
    }

    fn start_effects(&mut self, index: usize) {
        self.clear_queues();
        let started = self.presentation.meta_slide_by_index(index).map_or(0, |slide| {
            slide
                .animations()
                .start(&mut self.activities, &mut self.events)
        });
        self.animations_running = started > 0;
        if !self.animations_running {
            self.notify_animations_end();
        }
    }

    fn notify_animations_end(&mut self) {
        if !self.config.auto_advance {
            return;
        }
        let Some(slide) = self.presentation.current_slide() else {
            return;
        };
        if self.presentation.is_last_slide(slide.hash()) {
            return;
        }
        let Some(delay) = slide.next_slide_duration() else {
            return;
        };
        tracing::debug!(slide = slide.hash(), delay, "scheduling auto-advance");
        let signals = Rc::downgrade(&self.signals);
        let advance: EventCallback = Rc::new(move |_queue: &mut ActivityQueue| {
            if let Some(signals) = signals.upgrade() {
                signals.advance.set(true);
            }
        });
        self.events.add_callback(advance, delay);
    }

    /// Finish the running transition at once; the slide's effects start.
    pub fn skip_transition(&mut self) {
        if self.skipping || !self.transition_running {
            return;
        }
        self.skipping = true;
        self.activities.end_all(&mut self.events);
        self.events.force_empty(&mut self.activities);
        self.update();
        self.skipping = false;
    }

    /// Skip the transition and jump every effect of the current slide to its end.
    pub fn skip_all_effects(&mut self) -> bool {
        if self.skipping {
            return true;
        }
        if self.transition_running {
            self.skip_transition();
        }
        if !self.animations_running {
            return false;
        }
        self.skipping = true;
        if let Some(slide) = self.presentation.current_slide() {
            slide
                .animations()
                .end(&mut self.activities, &mut self.events);
        }
        self.activities.end_all(&mut self.events);
        self.events.force_empty(&mut self.activities);
        self.update();
        self.skipping = false;
        true
    }

    /// Play the running transition again from its first frame.
    pub fn rewind_transition(&mut self) -> bool {
        if self.skipping || self.rewinding || !self.transition_running {
            return false;
        }
        let Some(index) = self.entering_slide else {
            return false;
        };
        self.rewinding = true;
        self.clear_queues();
        self.transition_running = false;
        let restarted = self.start_transition(index);
        if !restarted {
            self.notify_transition_end(index);
        }
        self.update();
        self.rewinding = false;
        tracing::debug!(index, restarted, "transition rewound");
        true
    }

    /// Undo every effect the current slide has played, then play them again
    /// from the shapes' loaded state. A running transition is rewound instead.
    pub fn rewind_all_effects(&mut self) -> bool {
        if self.skipping || self.rewinding {
            return false;
        }
        if self.transition_running {
            return self.rewind_transition();
        }
        let Some(index) = self.presentation.current_index() else {
            return false;
        };
        let Some(slide) = self.presentation.meta_slide_by_index(index) else {
            return false;
        };
        if !slide.animations().has_started() {
            return false;
        }
        self.rewinding = true;
        slide.animations().rewind();
        self.animations_running = false;
        self.start_effects(index);
        self.update();
        self.rewinding = false;
        tracing::debug!(index, "effects rewound");
        true
    }

    pub fn next_slide(&mut self) -> bool {
        match self.presentation.current_index() {
            Some(current) => self.display_slide(current + 1, Some(current), false),
            None => self.start(0),
        }
    }

    /// Go back one slide. Backward moves never play a transition.
    pub fn previous_slide(&mut self) -> bool {
        match self.presentation.current_index() {
            Some(current) if current > 0 => self.display_slide(current - 1, Some(current), false),
            _ => false,
        }
    }

    fn clear_queues(&mut self) {
        self.events.clear();
        self.activities.clear();
        self.signals.transition_ended.set(false);
        self.signals.advance.set(false);
    }

    /// Stop playback: running effects are disposed and every queue emptied.
    pub fn dispose(&mut self) {
        if let Some(slide) = self.presentation.current_slide() {
            slide.animations().dispose();
        }
        self.clear_queues();
        self.entering_slide = None;
        self.transition_running = false;
        self.animations_running = false;
        self.idle = true;
    }
}

#[cfg(test)]
#[path = "../tests/unit/slideshow.rs"]
mod tests;
