//! Slide index: ordered slides, navigation links and the current slide.

use std::collections::BTreeMap;

use kurbo::Size;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationNodeInfo, NodeContext, SlideAnimations};
use crate::clock::SharedClock;
use crate::element::ShapeInfo;
use crate::foundation::error::{SlideplayError, SlideplayResult};
use crate::transition::{SlideTransition, TransitionSpec};

/// Per-slide descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideInfo {
    pub hash: String,
    pub hidden: bool,
    pub transition: Option<TransitionSpec>,
    pub shapes: Vec<ShapeInfo>,
    pub animations: Vec<AnimationNodeInfo>,
    /// Seconds to wait after the slide's effects before advancing.
    pub next_slide_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationInfo {
    pub slide_width: f64,
    pub slide_height: f64,
    #[serde(default)]
    pub slides: Vec<SlideInfo>,
}

impl PresentationInfo {
    pub fn from_json(text: &str) -> SlideplayResult<Self> {
        let info: Self = serde_json::from_str(text)?;
        info.validate()?;
        Ok(info)
    }

    pub fn validate(&self) -> SlideplayResult<()> {
        if !(self.slide_width > 0.0 && self.slide_height > 0.0) {
            return Err(SlideplayError::validation(
                "slideWidth/slideHeight must be > 0",
            ));
        }
        if let Some(slide) = self.slides.iter().find(|s| s.hash.trim().is_empty()) {
            return Err(SlideplayError::validation(format!(
                "slide with {} shapes has an empty hash",
                slide.shapes.len()
            )));
        }
        Ok(())
    }

    pub fn slide_size(&self) -> Size {
        Size::new(self.slide_width, self.slide_height)
    }
}

/// Host hooks for putting a slide on screen.
pub trait SlideDisplay {
    fn show(&mut self, slide: &MetaSlide);
    fn hide(&mut self, slide: &MetaSlide);
}

impl SlideDisplay for () {
    fn show(&mut self, _slide: &MetaSlide) {}
    fn hide(&mut self, _slide: &MetaSlide) {}
}

#[derive(Debug)]
pub struct MetaSlide {
    hash: String,
    index: usize,
    prev: Option<String>,
    next: Option<String>,
    info: SlideInfo,
    transition: Option<SlideTransition>,
    animations: SlideAnimations,
}

impl MetaSlide {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prev_hash(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    pub fn next_hash(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn info(&self) -> &SlideInfo {
        &self.info
    }

    pub fn transition(&self) -> Option<&SlideTransition> {
        self.transition.as_ref()
    }

    pub fn animations(&self) -> &SlideAnimations {
        &self.animations
    }

    pub fn next_slide_duration(&self) -> Option<f64> {
        self.info
            .next_slide_duration
            .filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// All presented slides, addressable by position and by hash.
#[derive(Debug, Default)]
pub struct MetaPresentation {
    slide_size: Size,
    slides: BTreeMap<String, MetaSlide>,
    order: Vec<String>,
    current: Option<usize>,
}

impl MetaPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from `info`. Hidden slides are left out.
    #[tracing::instrument(skip_all, fields(slides = info.slides.len()))]
    pub fn update(
        &mut self,
        info: &PresentationInfo,
        master: &SharedClock,
        minimum_frames_per_second: f64,
    ) {
        self.slides.clear();
        self.order.clear();
        self.current = None;
        self.slide_size = info.slide_size();

        let ctx = NodeContext {
            master: master.clone(),
            slide_size: self.slide_size,
            minimum_frames_per_second,
        };

        let mut visible: Vec<&SlideInfo> = Vec::with_capacity(info.slides.len());
        for slide in &info.slides {
            if slide.hidden {
                tracing::debug!(slide = %slide.hash, "hidden slide skipped");
            } else if visible.iter().any(|s| s.hash == slide.hash) {
                tracing::warn!(slide = %slide.hash, "duplicate slide hash ignored");
            } else {
                visible.push(slide);
            }
        }

        for (index, slide) in visible.iter().enumerate() {
            let prev = index
                .checked_sub(1)
                .and_then(|i| visible.get(i))
                .map(|s| s.hash.clone());
            let next = visible.get(index + 1).map(|s| s.hash.clone());
            let meta = MetaSlide {
                hash: slide.hash.clone(),
                index,
                prev,
                next,
                transition: slide
                    .transition
                    .as_ref()
                    .map(|spec| SlideTransition::new(spec, minimum_frames_per_second)),
                animations: SlideAnimations::new(
                    &slide.hash,
                    &slide.shapes,
                    &slide.animations,
                    &ctx,
                ),
                info: (*slide).clone(),
            };
            self.order.push(slide.hash.clone());
            self.slides.insert(slide.hash.clone(), meta);
        }
        tracing::debug!(count = self.order.len(), "presentation index rebuilt");
    }

    pub fn slide_size(&self) -> Size {
        self.slide_size
    }

    pub fn number_of_slides(&self) -> usize {
        self.order.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_slide_hash(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.order.get(i))
            .map(String::as_str)
    }

    pub fn current_slide(&self) -> Option<&MetaSlide> {
        self.current.and_then(|i| self.meta_slide_by_index(i))
    }

    pub fn meta_slide(&self, hash: &str) -> Option<&MetaSlide> {
        self.slides.get(hash)
    }

    pub fn meta_slide_by_index(&self, index: usize) -> Option<&MetaSlide> {
        self.order.get(index).and_then(|hash| self.slides.get(hash))
    }

    pub fn slide_info(&self, hash: &str) -> Option<&SlideInfo> {
        self.meta_slide(hash).map(MetaSlide::info)
    }

    pub fn slide_info_by_index(&self, index: usize) -> Option<&SlideInfo> {
        self.meta_slide_by_index(index).map(MetaSlide::info)
    }

    pub fn is_first_slide(&self, hash: &str) -> bool {
        self.order.first().is_some_and(|h| h == hash)
    }

    pub fn is_last_slide(&self, hash: &str) -> bool {
        self.order.last().is_some_and(|h| h == hash)
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> impl Iterator<Item = &MetaSlide> {
        self.order.iter().filter_map(|hash| self.slides.get(hash))
    }

    /// Make `index` current: hide the previous slide and show the new one.
    /// Out-of-range requests are logged and ignored.
    pub fn set_current_slide(&mut self, index: usize, display: &mut dyn SlideDisplay) -> bool {
        if index >= self.order.len() {
            tracing::warn!(
                index,
                slides = self.order.len(),
                "set_current_slide: index out of range"
            );
            return false;
        }
        if let Some(old) = self.current_slide() {
            tracing::debug!(slide = %old.hash, "hiding slide");
            display.hide(old);
        }
        self.current = Some(index);
        if let Some(new) = self.current_slide() {
            tracing::debug!(slide = %new.hash, index, "showing slide");
            display.show(new);
        }
        true
    }
}

#[cfg(test)]
#[path = "../tests/unit/presentation/presentation.rs"]
mod tests;
