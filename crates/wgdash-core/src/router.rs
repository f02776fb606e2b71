// ── Static view router ──
//
// Maps dashboard paths to views through a fixed table. Patterns are
// matched segment by segment; `:name` captures one segment and `*`
// matches anything. Redirect targets are resolved again until a view is
// reached.

use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::debug;

pub const NOT_FOUND_PATH: &str = "/404";

/// Upper bound on chained redirects before giving up with `NotFound`.
const MAX_REDIRECTS: usize = 8;

/// A screen of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(tag = "view", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum View {
    DeviceList,
    DeviceDetail { id: String },
    NotFound,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    DeviceList,
    DeviceDetail,
    NotFound,
    Redirect(&'static str),
}

struct Route {
    pattern: &'static str,
    target: Target,
}

const ROUTES: &[Route] = &[
    Route {
        pattern: "/",
        target: Target::Redirect("/devices"),
    },
    Route {
        pattern: "/devices",
        target: Target::DeviceList,
    },
    Route {
        pattern: "/devices/:id",
        target: Target::DeviceDetail,
    },
    Route {
        pattern: NOT_FOUND_PATH,
        target: Target::NotFound,
    },
    Route {
        pattern: "*",
        target: Target::Redirect(NOT_FOUND_PATH),
    },
];

/// Outcome of resolving a path: the view, and the path it lives at after
/// following redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub path: String,
    pub view: View,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `path` to a view. Never fails: unknown paths land on the
    /// not-found view.
    pub fn resolve(&self, path: &str) -> Resolved {
        let mut current = normalize(path);

        for _ in 0..=MAX_REDIRECTS {
            let (target, id) = Self::match_route(&current);
            let view = match target {
                Target::DeviceList => View::DeviceList,
                Target::DeviceDetail => View::DeviceDetail {
                    id: id.unwrap_or_default(),
                },
                Target::NotFound => View::NotFound,
                Target::Redirect(to) => {
                    debug!(from = %current, to, "redirect");
                    current = to.to_owned();
                    continue;
                }
            };
            return Resolved {
                path: current,
                view,
            };
        }

        Resolved {
            path: NOT_FOUND_PATH.to_owned(),
            view: View::NotFound,
        }
    }

    fn match_route(path: &str) -> (Target, Option<String>) {
        let segments: Vec<&str> = split(path).collect();

        for route in ROUTES {
            if route.pattern == "*" {
                return (route.target, None);
            }

            let pattern: Vec<&str> = split(route.pattern).collect();
            if pattern.len() != segments.len() {
                continue;
            }

            let mut captured = None;
            let matched = pattern.iter().zip(&segments).all(|(p, s)| {
                if p.starts_with(':') {
                    captured = Some((*s).to_owned());
                    true
                } else {
                    p == s
                }
            });
            if matched {
                return (route.target, captured);
            }
        }

        (Target::Redirect(NOT_FOUND_PATH), None)
    }
}

/// Strip query and fragment, collapse empty segments, force a leading
/// slash and drop the trailing one.
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let joined = split(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    resolved: Resolved,
    scroll: u32,
}

/// Where a navigation landed and the scroll offset to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub resolved: Resolved,
    pub scroll: u32,
}

/// Browser-style history on top of [`Router`].
///
/// New navigations start at the top of the page; back and forward restore
/// the offset last saved for that entry.
#[derive(Debug, Default)]
pub struct Navigator {
    router: Router,
    entries: Vec<Entry>,
    index: usize,
}

impl Navigator {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            entries: Vec::new(),
            index: 0,
        }
    }

    /// Push a new entry, dropping any forward history.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        let resolved = self.router.resolve(path);
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(Entry {
            resolved: resolved.clone(),
            scroll: 0,
        });
        self.index = self.entries.len() - 1;

        Navigation {
            resolved,
            scroll: 0,
        }
    }

    pub fn back(&mut self) -> Option<Navigation> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.current()
    }

    pub fn forward(&mut self) -> Option<Navigation> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.current()
    }

    /// Remember the scroll offset of the current entry.
    pub fn save_scroll(&mut self, offset: u32) {
        if let Some(entry) = self.entries.get_mut(self.index) {
            entry.scroll = offset;
        }
    }

    pub fn current(&self) -> Option<Navigation> {
        self.entries.get(self.index).map(|e| Navigation {
            resolved: e.resolved.clone(),
            scroll: e.scroll,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn view(path: &str) -> View {
        Router::new().resolve(path).view
    }

    #[test]
    fn static_table() {
        assert_eq!(view("/devices"), View::DeviceList);
        assert_eq!(
            view("/devices/wg0"),
            View::DeviceDetail { id: "wg0".into() }
        );
        assert_eq!(view("/404"), View::NotFound);
    }

    #[test]
    fn root_redirects_to_device_list() {
        let resolved = Router::new().resolve("/");
        assert_eq!(resolved.path, "/devices");
        assert_eq!(resolved.view, View::DeviceList);
    }

    #[test]
    fn unmapped_paths_resolve_to_not_found() {
        for path in ["/peers", "/devices/wg0/peers", "/nope/nope", "devices-x"] {
            let resolved = Router::new().resolve(path);
            assert_eq!(resolved.view, View::NotFound, "{path}");
            assert_eq!(resolved.path, NOT_FOUND_PATH);
        }
    }

    #[test]
    fn trailing_slash_query_and_fragment_are_ignored() {
        assert_eq!(view("/devices/"), View::DeviceList);
        assert_eq!(view("devices?page=2"), View::DeviceList);
        assert_eq!(
            view("//devices//wg1/#peers"),
            View::DeviceDetail { id: "wg1".into() }
        );
    }

    #[test]
    fn back_restores_scroll_new_navigation_resets() {
        let mut nav = Navigator::new(Router::new());
        nav.navigate("/devices");
        nav.save_scroll(420);

        let detail = nav.navigate("/devices/wg0");
        assert_eq!(detail.scroll, 0);
        nav.save_scroll(15);

        let back = nav.back().unwrap();
        assert_eq!(back.resolved.view, View::DeviceList);
        assert_eq!(back.scroll, 420);

        let forward = nav.forward().unwrap();
        assert_eq!(forward.scroll, 15);
        assert!(nav.forward().is_none());
    }

    #[test]
    fn navigating_after_back_drops_forward_history() {
        let mut nav = Navigator::new(Router::new());
        nav.navigate("/devices");
        nav.navigate("/devices/wg0");
        nav.back();
        nav.navigate("/devices/wg1");

        assert!(nav.forward().is_none());
        assert_eq!(
            nav.back().unwrap().resolved.view,
            View::DeviceList
        );
        assert!(nav.back().is_none());
    }
}
