//! Contacts feed parsing and pagination.
//!
//! The contacts feed paginates through opaque "next" links: each page
//! embeds the URL of the subsequent page in its link list rather than a
//! cursor the client computes. Pagination walks those links to completion
//! and merges every page into one flat, ordered contact list.

use serde::Deserialize;
use tracing::{debug, info};

use signon_core::Contact;

use crate::error::{StrategyError, StrategyResult};

use super::config::GoogleSettings;
use super::tokens::AccessCredential;
use super::transport::GoogleTransport;

/// Base URL of the contacts feed for the authenticated user.
const CONTACTS_FEED_URL: &str = "https://www.google.com/m8/feeds/contacts/default/full";

/// Builds the feed's first-page URL with the configured page-size ceiling.
pub fn first_page_url(settings: &GoogleSettings) -> String {
    format!(
        "{}?alt=json&max-results={}&v=3.0",
        CONTACTS_FEED_URL, settings.page_size
    )
}

/// One page of the contacts feed.
///
/// Transient; entries are consumed into the merged result immediately and
/// the page is not retained after pagination completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    /// Entries in provider order.
    pub entries: Vec<FeedEntry>,
    /// Target of the link whose relation is "next", if any.
    pub next: Option<String>,
}

impl FeedPage {
    /// Parses a GData JSON feed document into a page.
    pub fn parse(body: &str) -> StrategyResult<Self> {
        let document: FeedDocument = serde_json::from_str(body).map_err(|e| {
            StrategyError::invalid_response(format!("failed to parse feed page: {}", e))
        })?;

        // When several links claim rel == "next" the last one wins.
        let next = document
            .feed
            .link
            .into_iter()
            .filter(|l| l.rel.as_deref() == Some("next"))
            .filter_map(|l| l.href)
            .next_back();

        Ok(Self {
            entries: document.feed.entry,
            next,
        })
    }
}

/// One raw entry from the contacts feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedEntry {
    /// The entry title, carrying the contact's display name.
    #[serde(default)]
    pub title: Option<FeedText>,
    /// Email addresses attached to the entry.
    #[serde(rename = "gd$email", default)]
    pub emails: Vec<FeedEmail>,
}

impl FeedEntry {
    /// Maps this raw entry to a provider-agnostic contact.
    ///
    /// The first email address wins; both fields default to the empty
    /// string when the entry omits them.
    pub fn into_contact(self) -> Contact {
        let email = self.emails.into_iter().next().and_then(|e| e.address);
        let display_name = self.title.and_then(|t| t.value);
        Contact::new(email, display_name)
    }
}

/// A GData text construct (`{"$t": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedText {
    /// The text payload.
    #[serde(rename = "$t", default)]
    pub value: Option<String>,
}

/// A GData email element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeedEmail {
    /// The email address.
    #[serde(default)]
    pub address: Option<String>,
}

/// A feed link element.
#[derive(Debug, Clone, Default, Deserialize)]
struct FeedLink {
    #[serde(default)]
    rel: Option<String>,
    #[serde(default)]
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: RawFeed,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    #[serde(default)]
    entry: Vec<FeedEntry>,
    #[serde(default)]
    link: Vec<FeedLink>,
}

/// Walks the contacts feed to completion and returns the merged list.
///
/// Entries are appended in provider order, page after page, without
/// deduplication. Termination is driven by the absence of a "next" link;
/// `max_pages` bounds a feed that keeps producing one, turning runaway
/// pagination into an error instead of non-termination. A failure on any
/// page fails the whole call and discards pages already accumulated.
pub async fn paginate_feed<T>(
    transport: &T,
    credential: &AccessCredential,
    first_url: String,
    max_pages: u32,
) -> StrategyResult<Vec<Contact>>
where
    T: GoogleTransport + ?Sized,
{
    let mut url = first_url;
    let mut contacts = Vec::new();
    let mut pages = 0u32;

    loop {
        if pages >= max_pages {
            return Err(StrategyError::pagination_limit(format!(
                "feed still produced a next link after {} pages",
                max_pages
            )));
        }

        let page = transport.fetch_feed_page(&url, credential).await?;
        pages += 1;
        debug!("feed page {} carried {} entries", pages, page.entries.len());

        contacts.extend(page.entries.into_iter().map(FeedEntry::into_contact));

        match page.next {
            Some(next) => url = next,
            None => break,
        }
    }

    info!("merged {} contacts across {} pages", contacts.len(), pages);
    Ok(contacts)
}
