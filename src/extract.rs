//! Field extraction for action detail pages.
//!
//! Each field is looked up on its own. A lookup that misses leaves the field
//! absent and never affects the others.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::{record::ActionRecord, text::element_text};

macro_rules! selector {
    ($name:ident, $css:literal) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(TITLE, "h1.separator-bottom.mt-5");
selector!(PLACE, "div.place");
selector!(H6, "h6");
selector!(H5, "h5");
selector!(CONTENT_DIV, "div.content");
selector!(CONTENT_BLOCK_DIV, "div.content-block");
selector!(FIELD_CONTENT_DIV, "div.field-content");
selector!(FIELD_CONTENT_SPAN, "span.field-content");
selector!(START_DATE, "div.views-field.views-field-field-start-date");
selector!(END_DATE, "div.views-field.views-field-field-date-of-completion");
selector!(LOCATION, "div.views-field.views-field-field-location");
selector!(GOAL_WRAPPER, "span.good-practices-goal-wrapper");
selector!(ANCHOR, "a");
selector!(LIST_GROUP_ITEM, "li.list-group-item");

const TYPE_HEADING: &str = "Type of initiative";
const TIMELINE_HEADING: &str = "Timeline";
const REGION_HEADING: &str = "Region";
const COUNTRIES_HEADING: &str = "Countries";

/// Pull every field out of a detail page. `page` is left at zero for the
/// caller to stamp.
pub fn extract(doc: &Html) -> ActionRecord {
    let (initiator, action_id) = initiator_and_id(doc);
    let (start_time, end_time) = timeline(doc);

    ActionRecord {
        page: 0,
        title: doc.select(&TITLE).next().map(|el| element_text(&el)),
        initiator,
        action_id,
        kind: initiative_type(doc),
        start_time,
        end_time,
        countries: countries(doc),
        region: region(doc),
        geographical_coverage: geographical_coverage(doc),
        sdgs: sdgs(doc),
    }
}

fn initiator_and_id(doc: &Html) -> (Option<String>, Option<String>) {
    let Some(place) = doc.select(&PLACE).next() else {
        return (None, None);
    };
    let mut h6 = place.select(&H6).map(|el| element_text(&el));
    (h6.next(), h6.next())
}

fn initiative_type(doc: &Html) -> Option<String> {
    let h5 = heading(doc, TYPE_HEADING)?;
    let parent = h5
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div")?;
    parent
        .select(&CONTENT_DIV)
        .next()
        .map(|el| element_text(&el))
}

fn timeline(doc: &Html) -> (Option<String>, Option<String>) {
    let Some(block) = heading(doc, TIMELINE_HEADING).and_then(|h| next_sibling(h, &CONTENT_DIV))
    else {
        return (None, None);
    };
    (
        date_field(block, &START_DATE),
        date_field(block, &END_DATE),
    )
}

fn date_field(block: ElementRef, wrapper: &Selector) -> Option<String> {
    block
        .select(wrapper)
        .next()?
        .select(&FIELD_CONTENT_DIV)
        .next()
        .map(|el| element_text(&el))
}

fn geographical_coverage(doc: &Html) -> Option<String> {
    doc.select(&LOCATION)
        .next()?
        .select(&FIELD_CONTENT_DIV)
        .next()
        .map(|el| element_text(&el))
}

fn sdgs(doc: &Html) -> Vec<String> {
    doc.select(&GOAL_WRAPPER)
        .filter_map(|span| span.select(&ANCHOR).next())
        .map(|a| element_text(&a))
        .collect()
}

fn region(doc: &Html) -> Vec<String> {
    heading(doc, REGION_HEADING)
        .and_then(|h| next_sibling(h, &CONTENT_DIV))
        .map(|block| {
            block
                .select(&LIST_GROUP_ITEM)
                .map(|li| element_text(&li))
                .collect()
        })
        .unwrap_or_default()
}

fn countries(doc: &Html) -> Vec<String> {
    heading(doc, COUNTRIES_HEADING)
        .and_then(|h| next_sibling(h, &CONTENT_BLOCK_DIV))
        .map(|block| {
            block
                .select(&FIELD_CONTENT_SPAN)
                .map(|span| element_text(&span))
                .collect()
        })
        .unwrap_or_default()
}

/// First `h5` whose trimmed text equals `label`. Nested markup inside the
/// heading is allowed.
fn heading<'a>(doc: &'a Html, label: &str) -> Option<ElementRef<'a>> {
    doc.select(&H5)
        .find(|h| h.text().collect::<String>().trim() == label)
}

/// First following sibling element matching `sel`.
fn next_sibling<'a>(el: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sel.matches(sib))
}
