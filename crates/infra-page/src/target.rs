// Page Render Target
// Holds the current text of each slot of a parsed promo page

use crate::page::PromoPage;
use promo_countdown_core::domain::{Frame, Slot};
use promo_countdown_core::port::{RenderError, RenderTarget};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// RenderTarget writing into the slots of a promo page
#[derive(Debug)]
pub struct PageRenderTarget {
    page: PromoPage,
    values: Mutex<BTreeMap<Slot, String>>,
    detached: AtomicBool,
}

impl PageRenderTarget {
    pub fn new(page: PromoPage) -> Self {
        Self {
            page,
            values: Mutex::new(BTreeMap::new()),
            detached: AtomicBool::new(false),
        }
    }

    /// Current text of a slot (last rendered, else the original markup)
    pub fn slot_text(&self, slot: Slot) -> Option<String> {
        let values = self.lock();
        values
            .get(&slot)
            .cloned()
            .or_else(|| self.page.initial_text(slot).map(str::to_string))
    }

    /// Page markup with the current slot contents
    pub fn render_html(&self) -> String {
        self.page.render_with(&self.lock())
    }

    /// Simulate the page going away; every later write fails
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn page(&self) -> &PromoPage {
        &self.page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<Slot, String>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderTarget for PageRenderTarget {
    fn resolve(&self) -> Result<(), RenderError> {
        match Slot::ALL.into_iter().find(|slot| !self.page.has_slot(*slot)) {
            Some(slot) => Err(RenderError::SlotMissing(slot)),
            None => Ok(()),
        }
    }

    fn render(&self, frame: &Frame) -> Result<(), RenderError> {
        if self.detached.load(Ordering::SeqCst) {
            return Err(RenderError::Detached("page unloaded".to_string()));
        }
        self.resolve()?;

        let mut values = self.lock();
        for (slot, text) in frame.iter() {
            values.insert(slot, text.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_countdown_core::domain::TimeRemaining;

    const PAGE: &str = r#"<div class="promo__clock" data-time="2030-01-01T00:00:00Z">
        <span class="promo__days">0</span><span class="promo__hours">00</span>
        <span class="promo__minutes">00</span><span class="promo__seconds">00</span>
    </div>"#;

    fn target() -> PageRenderTarget {
        PromoPage::parse(PAGE).unwrap().into_target()
    }

    #[test]
    fn test_resolve_complete_page() {
        let target = target();
        assert!(target.resolve().is_ok());
        assert_eq!(target.page().deadline().unwrap(), "2030-01-01T00:00:00Z");
    }

    #[test]
    fn test_resolve_reports_first_missing_slot() {
        let html = r#"<div class="promo__clock" data-time="2030-01-01">
            <span class="promo__days"></span><span class="promo__seconds"></span></div>"#;
        let target = PageRenderTarget::new(PromoPage::parse(html).unwrap());

        assert_eq!(target.resolve(), Err(RenderError::SlotMissing(Slot::Hours)));
    }

    #[test]
    fn test_render_updates_all_slots_together() {
        let target = target();
        let frame = Frame::from(&TimeRemaining::from_millis(3 * 86_400_000 + 3_723_000));

        target.render(&frame).unwrap();

        assert_eq!(target.slot_text(Slot::Days).as_deref(), Some("3"));
        assert_eq!(target.slot_text(Slot::Hours).as_deref(), Some("01"));
        assert_eq!(target.slot_text(Slot::Minutes).as_deref(), Some("02"));
        assert_eq!(target.slot_text(Slot::Seconds).as_deref(), Some("03"));
        assert!(target
            .render_html()
            .contains(r#"<span class="promo__days">3</span>"#));
    }

    #[test]
    fn test_slot_text_defaults_to_markup() {
        assert_eq!(target().slot_text(Slot::Hours).as_deref(), Some("00"));
    }

    #[test]
    fn test_detached_target_rejects_writes() {
        let target = target();
        target.detach();

        let frame = Frame::from(&TimeRemaining::from_millis(1_000));
        assert!(matches!(target.render(&frame), Err(RenderError::Detached(_))));
    }
}
