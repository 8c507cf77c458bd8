//! Page to scroll-offset navigation
//!
//! Pages are stacked vertically in one scrollable surface. By default every
//! page is assumed to render at the same height, so page `p` starts at
//! `(p - 1) * page_height`. When real page heights are known they can be
//! supplied instead and offsets are summed page by page.

use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    Instant,
    #[default]
    Smooth,
}

/// Something that can be scrolled vertically, e.g. the page pane of the viewer
pub trait ScrollContainer {
    fn scroll_to(&mut self, offset: u32, behavior: ScrollBehavior);
}

/// Offset of the top of `page` (1-based) with uniform page heights.
/// Page 0 is treated as page 1.
pub fn page_offset(page: usize, page_height: u32) -> u32 {
    let preceding = u32::try_from(page.saturating_sub(1)).unwrap_or(u32::MAX);
    preceding.saturating_mul(page_height)
}

/// Offset of the top of `page` (1-based) given the measured height of every page
pub fn measured_page_offset(page: usize, page_heights: &[u32], separator_height: u16) -> u32 {
    page_heights
        .iter()
        .take(page.saturating_sub(1))
        .fold(0u32, |offset, &h| {
            offset
                .saturating_add(h)
                .saturating_add(u32::from(separator_height))
        })
}

/// Smooth-scroll `container` to the top of `page`. No clamping.
pub fn scroll_to_page(page: usize, page_height: u32, container: &mut dyn ScrollContainer) -> u32 {
    let offset = page_offset(page, page_height);
    container.scroll_to(offset, ScrollBehavior::Smooth);
    offset
}

/// Navigator bound to one open document
#[derive(Debug, Clone)]
pub struct PageNavigator {
    page_height: u32,
    separator_height: u16,
    total_pages: Option<usize>,
    measured_heights: Option<Vec<u32>>,
    behavior: ScrollBehavior,
}

impl PageNavigator {
    pub fn new(page_height: u32) -> Self {
        Self {
            page_height,
            separator_height: 0,
            total_pages: None,
            measured_heights: None,
            behavior: ScrollBehavior::Smooth,
        }
    }

    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn page_height(&self) -> u32 {
        self.page_height
    }

    pub fn set_total_pages(&mut self, total_pages: Option<usize>) {
        self.total_pages = total_pages.filter(|&n| n > 0);
    }

    /// Switch to measured heights. An empty list reverts to uniform heights.
    pub fn set_measured_heights(&mut self, heights: Vec<u32>, separator_height: u16) {
        self.measured_heights = (!heights.is_empty()).then_some(heights);
        self.separator_height = separator_height;
    }

    /// Clamp to `[1, total_pages]`, or only to `>= 1` while the count is unknown
    pub fn clamp_page(&self, page: usize) -> usize {
        let page = page.max(1);
        match self.total_pages {
            Some(total) => page.min(total),
            None => page,
        }
    }

    pub fn offset_for(&self, page: usize) -> u32 {
        let page = self.clamp_page(page);
        match &self.measured_heights {
            Some(heights) => measured_page_offset(page, heights, self.separator_height),
            None => page_offset(page, self.page_height),
        }
    }

    /// Total height of all pages, when the page count is known
    pub fn content_height(&self) -> Option<u32> {
        let total = self.total_pages?;
        Some(match &self.measured_heights {
            Some(heights) => measured_page_offset(heights.len() + 1, heights, self.separator_height),
            None => page_offset(total + 1, self.page_height),
        })
    }

    pub fn scroll_to_page(&self, page: usize, container: &mut dyn ScrollContainer) -> u32 {
        let offset = self.offset_for(page);
        debug!(
            "Navigating to page {} (requested {page}), offset {offset}",
            self.clamp_page(page)
        );
        container.scroll_to(offset, self.behavior);
        offset
    }
}

/// Scroll state of the viewer's page pane.
///
/// Smooth scrolls move toward the target by `step` per [`Viewport::tick`].
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    pub offset: u32,
    target: Option<u32>,
    step: u32,
}

impl Viewport {
    pub fn new(step: u32) -> Self {
        Self {
            offset: 0,
            target: None,
            step: step.max(1),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<u32> {
        self.target
    }

    /// Advance a pending smooth scroll by one step
    pub fn tick(&mut self) {
        let Some(target) = self.target else {
            return;
        };
        if self.offset < target {
            self.offset = self.offset.saturating_add(self.step).min(target);
        } else {
            self.offset = self.offset.saturating_sub(self.step).max(target);
        }
        if self.offset == target {
            self.target = None;
        }
    }

    pub fn scroll_by(&mut self, delta: i64, max_offset: u32) {
        self.target = None;
        let next = (i64::from(self.offset) + delta).clamp(0, i64::from(max_offset));
        self.offset = next as u32;
    }

    pub fn reset(&mut self) {
        self.offset = 0;
        self.target = None;
    }
}

impl ScrollContainer for Viewport {
    fn scroll_to(&mut self, offset: u32, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Instant => {
                self.offset = offset;
                self.target = None;
            }
            ScrollBehavior::Smooth if offset == self.offset => self.target = None,
            ScrollBehavior::Smooth => self.target = Some(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingContainer {
        requests: Vec<(u32, ScrollBehavior)>,
    }

    impl ScrollContainer for RecordingContainer {
        fn scroll_to(&mut self, offset: u32, behavior: ScrollBehavior) {
            self.requests.push((offset, behavior));
        }
    }

    #[test]
    fn offset_is_preceding_pages_times_height() {
        assert_eq!(page_offset(3, 600), 1200);
        assert_eq!(page_offset(1, 600), 0);
        assert_eq!(page_offset(0, 600), 0);
    }

    #[test]
    fn scroll_to_page_requests_smooth_scroll() {
        let mut container = RecordingContainer::default();
        assert_eq!(scroll_to_page(3, 600, &mut container), 1200);
        assert_eq!(container.requests, vec![(1200, ScrollBehavior::Smooth)]);
    }

    #[test]
    fn unclamped_scroll_goes_past_content() {
        let mut container = RecordingContainer::default();
        assert_eq!(scroll_to_page(20, 600, &mut container), 11400);
    }

    #[test]
    fn navigator_clamps_to_known_page_count() {
        let mut navigator = PageNavigator::new(600);
        navigator.set_total_pages(Some(5));
        let mut container = RecordingContainer::default();

        assert_eq!(navigator.scroll_to_page(9, &mut container), 2400);
        assert_eq!(navigator.scroll_to_page(0, &mut container), 0);
        assert_eq!(navigator.content_height(), Some(3000));
    }

    #[test]
    fn navigator_without_page_count_does_not_clamp_upward() {
        let navigator = PageNavigator::new(600);
        assert_eq!(navigator.offset_for(9), 4800);
        assert_eq!(navigator.content_height(), None);
    }

    #[test]
    fn measured_heights_are_summed_with_separators() {
        let mut navigator = PageNavigator::new(600);
        navigator.set_total_pages(Some(3));
        navigator.set_measured_heights(vec![100, 250, 80], 2);

        assert_eq!(navigator.offset_for(1), 0);
        assert_eq!(navigator.offset_for(2), 102);
        assert_eq!(navigator.offset_for(3), 354);
        assert_eq!(navigator.content_height(), Some(436));
    }

    #[test]
    fn viewport_animates_toward_target() {
        let mut viewport = Viewport::new(10);
        viewport.scroll_to(25, ScrollBehavior::Smooth);
        assert!(viewport.is_animating());

        viewport.tick();
        assert_eq!(viewport.offset, 10);
        viewport.tick();
        viewport.tick();
        assert_eq!(viewport.offset, 25);
        assert!(!viewport.is_animating());

        viewport.scroll_to(0, ScrollBehavior::Instant);
        assert_eq!(viewport.offset, 0);
    }

    #[test]
    fn offsets_saturate_instead_of_overflowing() {
        assert_eq!(measured_page_offset(3, &[u32::MAX, 10], 2), u32::MAX);

        let mut viewport = Viewport::new(10);
        viewport.offset = u32::MAX - 3;
        viewport.scroll_to(u32::MAX, ScrollBehavior::Smooth);
        viewport.tick();
        assert_eq!(viewport.offset, u32::MAX);
        assert!(!viewport.is_animating());

        let navigator = PageNavigator::new(u32::MAX / 2);
        let mut viewport = Viewport::new(u32::MAX);
        viewport.offset = 5;
        navigator.scroll_to_page(usize::MAX, &mut viewport);
        viewport.tick();
        assert_eq!(viewport.offset, u32::MAX);
    }

    #[test]
    fn manual_scroll_cancels_animation() {
        let mut viewport = Viewport::new(5);
        viewport.scroll_to(100, ScrollBehavior::Smooth);
        viewport.scroll_by(3, 50);
        assert!(!viewport.is_animating());
        assert_eq!(viewport.offset, 3);
        viewport.scroll_by(-10, 50);
        assert_eq!(viewport.offset, 0);
    }
}
