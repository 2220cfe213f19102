// Promo page markup binding
//
// The clock is the first `.promo__clock` element; its `data-time` attribute
// carries the deadline and the four slot elements live inside it.

use crate::error::{PageError, Result};
use crate::target::PageRenderTarget;
use promo_countdown_core::domain::Slot;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const CLOCK_CLASS: &str = "promo__clock";
pub const DEADLINE_ATTR: &str = "data-time";

/// Piece of the serialized page, split around the slot contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(String),
    Slot {
        slot: Slot,
        open: String,
        close: String,
    },
}

/// Parsed promo page
#[derive(Debug, Clone)]
pub struct PromoPage {
    deadline: Option<String>,
    initial: BTreeMap<Slot, String>,
    template: Vec<Piece>,
}

struct SlotMarkup {
    slot: Slot,
    position: usize,
    outer_len: usize,
    open: String,
    close: String,
    text: String,
}

impl PromoPage {
    /// Parse page markup and locate the clock
    ///
    /// Slots that cannot be found are not an error here; they are reported by
    /// `PageRenderTarget::resolve` when a timer binds to the page.
    ///
    /// # Errors
    /// `PageError::ClockNotFound` if there is no `.promo__clock` element.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let clock_selector = class_selector(CLOCK_CLASS)?;
        let clock = document
            .select(&clock_selector)
            .next()
            .ok_or_else(|| PageError::ClockNotFound(format!(".{}", CLOCK_CLASS)))?;

        let deadline = clock
            .value()
            .attr(DEADLINE_ATTR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());

        let serialized = document.html();
        let clock_html = clock.html();
        let clock_start = serialized
            .find(&clock_html)
            .ok_or_else(|| PageError::ClockNotFound("clock markup not addressable".to_string()))?;
        let clock_end = clock_start + clock_html.len();

        let mut markups = Vec::new();
        for slot in Slot::ALL {
            match locate_slot(&clock, &clock_html, slot)? {
                Some(markup) => markups.push(markup),
                None => debug!(slot = %slot, "Slot not present on page"),
            }
        }
        markups.sort_by_key(|m| m.position);

        let mut template = Vec::new();
        let mut text = serialized[..clock_start].to_string();
        let mut cursor = 0;
        let mut initial = BTreeMap::new();
        for markup in markups {
            // Nested or repeated slot markup cannot be substituted independently
            if markup.position < cursor {
                warn!(slot = %markup.slot, "Slot overlaps another slot, ignoring");
                continue;
            }
            text.push_str(&clock_html[cursor..markup.position]);
            template.push(Piece::Text(std::mem::take(&mut text)));
            template.push(Piece::Slot {
                slot: markup.slot,
                open: markup.open,
                close: markup.close,
            });
            initial.insert(markup.slot, markup.text);
            cursor = markup.position + markup.outer_len;
        }
        text.push_str(&clock_html[cursor..]);
        text.push_str(&serialized[clock_end..]);
        template.push(Piece::Text(text));

        Ok(Self {
            deadline,
            initial,
            template,
        })
    }

    /// Raw `data-time` value of the clock
    pub fn deadline(&self) -> Result<&str> {
        self.deadline.as_deref().ok_or(PageError::DeadlineMissing)
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.initial.contains_key(&slot)
    }

    /// Slot text as it appeared in the markup
    pub fn initial_text(&self, slot: Slot) -> Option<&str> {
        self.initial.get(&slot).map(String::as_str)
    }

    /// Bind the page as a render target
    pub fn into_target(self) -> PageRenderTarget {
        PageRenderTarget::new(self)
    }

    /// Serialize the page with the given slot contents
    ///
    /// Slots without a value keep their original text.
    pub fn render_with(&self, values: &BTreeMap<Slot, String>) -> String {
        let mut out = String::new();
        for piece in &self.template {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Slot { slot, open, close } => {
                    let value = values
                        .get(slot)
                        .or_else(|| self.initial.get(slot))
                        .map(String::as_str)
                        .unwrap_or_default();
                    out.push_str(open);
                    out.push_str(&escape_text(value));
                    out.push_str(close);
                }
            }
        }
        out
    }
}

fn class_selector(class: &str) -> Result<Selector> {
    Selector::parse(&format!(".{}", class)).map_err(|e| PageError::Selector(e.to_string()))
}

fn locate_slot(
    clock: &ElementRef<'_>,
    clock_html: &str,
    slot: Slot,
) -> Result<Option<SlotMarkup>> {
    let selector = class_selector(slot.class_name())?;
    let Some(element) = clock.select(&selector).next() else {
        return Ok(None);
    };

    let outer = element.html();
    let inner = element.inner_html();
    let close = format!("</{}>", element.value().name());

    // Void elements have no content to write into
    let Some(open) = outer
        .strip_suffix(close.as_str())
        .and_then(|rest| rest.strip_suffix(inner.as_str()))
    else {
        warn!(slot = %slot, element = element.value().name(), "Slot element cannot hold text");
        return Ok(None);
    };

    let Some(position) = clock_html.find(&outer) else {
        return Ok(None);
    };

    Ok(Some(SlotMarkup {
        slot,
        position,
        outer_len: outer.len(),
        open: open.to_string(),
        close,
        text: element.text().collect::<String>().trim().to_string(),
    }))
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMO_HTML: &str = r#"<!DOCTYPE html>
<html><head><title>Sale</title></head>
<body>
  <section class="promo">
    <div class="promo__clock" data-time="2030-01-01T00:00:00Z">
      <span class="promo__days">00</span> days
      <span class="promo__hours">00</span>:<span class="promo__minutes">00</span>:<span class="promo__seconds">00</span>
    </div>
  </section>
</body></html>"#;

    #[test]
    fn test_parse_reads_deadline_and_slots() {
        let page = PromoPage::parse(PROMO_HTML).unwrap();

        assert_eq!(page.deadline().unwrap(), "2030-01-01T00:00:00Z");
        for slot in Slot::ALL {
            assert!(page.has_slot(slot), "{slot} should be found");
            assert_eq!(page.initial_text(slot), Some("00"));
        }
    }

    #[test]
    fn test_missing_clock_is_error() {
        let result = PromoPage::parse("<html><body><p>No promo</p></body></html>");
        assert!(matches!(result, Err(PageError::ClockNotFound(_))));
    }

    #[test]
    fn test_missing_deadline_attribute() {
        let html = r#"<div class="promo__clock"><span class="promo__days"></span></div>"#;
        let page = PromoPage::parse(html).unwrap();
        assert_eq!(page.deadline(), Err(PageError::DeadlineMissing));
    }

    #[test]
    fn test_missing_slot_is_recorded_not_fatal() {
        let html = r#"<div class="promo__clock" data-time="2030-01-01">
            <span class="promo__days"></span><span class="promo__hours"></span>
            <span class="promo__minutes"></span></div>"#;
        let page = PromoPage::parse(html).unwrap();

        assert!(page.has_slot(Slot::Minutes));
        assert!(!page.has_slot(Slot::Seconds));
    }

    #[test]
    fn test_first_clock_wins() {
        let html = r#"
            <div class="promo__clock" data-time="2030-01-01T00:00:00Z"></div>
            <div class="promo__clock" data-time="2040-01-01T00:00:00Z"></div>"#;
        let page = PromoPage::parse(html).unwrap();
        assert_eq!(page.deadline().unwrap(), "2030-01-01T00:00:00Z");
    }

    #[test]
    fn test_render_with_substitutes_slot_text_only() {
        let page = PromoPage::parse(PROMO_HTML).unwrap();
        let mut values = BTreeMap::new();
        values.insert(Slot::Days, "12".to_string());
        values.insert(Slot::Seconds, "07".to_string());

        let html = page.render_with(&values);

        assert!(html.contains(r#"<span class="promo__days">12</span> days"#));
        assert!(html.contains(r#"<span class="promo__seconds">07</span>"#));
        assert!(html.contains(r#"<span class="promo__hours">00</span>"#));
        assert!(html.contains("<title>Sale</title>"));
        assert!(html.contains(r#"data-time="2030-01-01T00:00:00Z""#));
    }

    #[test]
    fn test_render_with_escapes_markup() {
        let page = PromoPage::parse(PROMO_HTML).unwrap();
        let mut values = BTreeMap::new();
        values.insert(Slot::Days, "<b>&</b>".to_string());

        let html = page.render_with(&values);
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }
}
