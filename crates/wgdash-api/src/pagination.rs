// ── Page-number pagination ──
//
// List endpoints take `page` (zero-based) and `per_page`, return a bare
// JSON array, and describe neighbouring pages in an RFC 5988 `Link`
// header (`first`, `last`, `prev`, `next`).

use serde::Serialize;
use url::Url;

pub const DEFAULT_PER_PAGE: u32 = 100;

/// Which page to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    pub(crate) fn to_params(self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// A page reference parsed out of a `Link` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u32,
    pub per_page: u32,
}

impl From<PageRef> for PageRequest {
    fn from(r: PageRef) -> Self {
        Self {
            page: r.page,
            per_page: r.per_page,
        }
    }
}

/// Neighbouring pages advertised by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: Option<PageRef>,
    pub last: Option<PageRef>,
    pub prev: Option<PageRef>,
    pub next: Option<PageRef>,
}

impl PageLinks {
    /// Parse a `Link` header value. Unknown relations and malformed
    /// entries are skipped.
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();
        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let Some(target) = parts.next() else {
                continue;
            };
            let target = target.trim().trim_start_matches('<').trim_end_matches('>');
            let Some(page_ref) = parse_page_ref(target) else {
                continue;
            };
            for param in parts {
                let Some(rel) = param.trim().strip_prefix("rel=") else {
                    continue;
                };
                match rel.trim_matches('"') {
                    "first" => links.first = Some(page_ref),
                    "last" => links.last = Some(page_ref),
                    "prev" => links.prev = Some(page_ref),
                    "next" => links.next = Some(page_ref),
                    _ => {}
                }
            }
        }
        links
    }
}

/// Extract `page` / `per_page` from a (possibly relative) link target.
fn parse_page_ref(target: &str) -> Option<PageRef> {
    // Links are usually origin-relative (`/v1/devices/?page=1`).
    let base = Url::parse("http://link.invalid/").ok()?;
    let url = base.join(target).ok()?;

    let mut page = None;
    let mut per_page = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "page" => page = value.parse().ok(),
            "per_page" => per_page = value.parse().ok(),
            _ => {}
        }
    }
    Some(PageRef {
        page: page?,
        per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
    })
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub links: PageLinks,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.links.next.is_some()
    }
}
