//! View model and askama template for the browse-all page.

use askama::Template;

pub struct EntryCard {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub status_class: &'static str,
    pub status_label: &'static str,
}

impl EntryCard {
    pub fn status(reviewed: bool) -> (&'static str, &'static str) {
        if reviewed {
            ("status-reviewed", "REVIEWED")
        } else {
            ("status-draft", "DRAFT")
        }
    }
}

pub struct DomainSection {
    pub code: String,
    pub anchor: String,
    pub title: String,
    pub cards: Vec<EntryCard>,
}

#[derive(Template)]
#[template(path = "entries_index.html")]
pub struct EntriesIndexPage<'a> {
    pub total_entries: usize,
    pub version: &'a str,
    pub home_page: &'a str,
    pub sections: &'a [DomainSection],
}
