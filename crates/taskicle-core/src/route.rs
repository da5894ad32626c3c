use strum::{Display, EnumString, IntoStaticStr};

/// Named page of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RouteName {
    Articles,
    Settings,
    Tasks,
}

impl RouteName {
    pub const ALL: [Self; 3] = [Self::Articles, Self::Settings, Self::Tasks];

    pub const fn path(self) -> &'static str {
        match self {
            Self::Articles => "/articles",
            Self::Settings => "/settings",
            Self::Tasks => "/tasks",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Redirect(&'static str),
    Page(RouteName),
}

const ROUTES: &[(&str, Target)] = &[
    ("/index.html", Target::Redirect("/")),
    ("/", Target::Redirect("/articles")),
    ("/articles", Target::Page(RouteName::Articles)),
    ("/settings", Target::Page(RouteName::Settings)),
    ("/tasks", Target::Page(RouteName::Tasks)),
];

/// Resolve a location to the page it shows, following redirects
///
/// Query strings and fragments are ignored. Returns `None` for paths with
/// no matching route.
pub fn resolve(path: &str) -> Option<RouteName> {
    let mut current = strip_suffixes(path);

    // Each hop consumes one table entry, so a longer chain is a cycle.
    for _ in 0..ROUTES.len() {
        let (_, target) = ROUTES.iter().find(|(from, _)| *from == current)?;

        match *target {
            Target::Page(name) => return Some(name),
            Target::Redirect(to) => {
                tracing::trace!(from = current, to, "following redirect");
                current = to;
            }
        }
    }

    None
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];

    if path.is_empty() { "/" } else { path }
}
