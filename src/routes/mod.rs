//! Route table: URL path to screen, partitioned into private and public groups.
//!
//! Entries are matched in order, private group first, and the first match
//! wins. A layout entry matches by prefix and then descends into its children,
//! whose paths are absolute; an index child (`""`) matches the layout's own
//! path. The table must end with a single `*` entry.

pub mod guard;

use thiserror::Error;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const OTP_PATH: &str = "/login/otp";
pub const REGISTER_PATH: &str = "/register";
pub const NOT_FOUND_PATH: &str = "/404";

const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Doctors,
    AddDoctor,
    DoctorDetail,
    Appointments,
    Patients,
    Profile,
    Accounts,
    Role,
    Dashboard,
    LiveCases,
    Login,
    Otp,
    Register,
    NotFound,
}

impl Screen {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Doctors => "Doctors",
            Self::AddDoctor => "Add Doctor",
            Self::DoctorDetail => "Doctor",
            Self::Appointments => "Appointments",
            Self::Patients => "Patients",
            Self::Profile => "Profile",
            Self::Accounts => "Accounts",
            Self::Role => "Add Role",
            Self::Dashboard => "Dashboard",
            Self::LiveCases => "Live Cases",
            Self::Login => "Login",
            Self::Otp => "Verify OTP",
            Self::Register => "Register",
            Self::NotFound => "Not Found",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Private,
    Public,
}

/// Chrome rendered around the matched child of a layout entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Main,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Screen(Screen),
    Layout(Shell),
    Redirect(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub target: Target,
    pub children: Vec<RouteEntry>,
}

impl RouteEntry {
    #[must_use]
    pub fn screen(path: &'static str, screen: Screen) -> Self {
        Self {
            path,
            target: Target::Screen(screen),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn index(screen: Screen) -> Self {
        Self::screen("", screen)
    }

    #[must_use]
    pub fn layout(path: &'static str, shell: Shell, children: Vec<RouteEntry>) -> Self {
        Self {
            path,
            target: Target::Layout(shell),
            children,
        }
    }

    #[must_use]
    pub fn redirect(path: &'static str, location: &'static str) -> Self {
        Self {
            path,
            target: Target::Redirect(location),
            children: Vec::new(),
        }
    }
}

/// Named path parameters captured by `:name` segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render {
        screen: Screen,
        access: Access,
        shell: Option<Shell>,
        params: Params,
    },
    Redirect {
        location: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("wildcard route must be the last entry")]
    WildcardNotLast,
    #[error("route table has no wildcard fallback")]
    MissingFallback,
    #[error("layout route {0} has no children")]
    EmptyLayout(&'static str),
    #[error("route path must be absolute: {0:?}")]
    RelativePath(&'static str),
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(Access, RouteEntry)>,
}

impl RouteTable {
    /// Build a table from the two groups, private entries taking precedence.
    ///
    /// # Errors
    /// Returns an error if the wildcard is missing or not last, a layout has no
    /// children, or a path is relative.
    pub fn new(
        private: Vec<RouteEntry>,
        public: Vec<RouteEntry>,
    ) -> Result<Self, RouteTableError> {
        let entries: Vec<(Access, RouteEntry)> = private
            .into_iter()
            .map(|entry| (Access::Private, entry))
            .chain(public.into_iter().map(|entry| (Access::Public, entry)))
            .collect();

        let last = entries.len().saturating_sub(1);
        for (position, (_, entry)) in entries.iter().enumerate() {
            validate(entry, false)?;
            if entry.path == WILDCARD && position != last {
                return Err(RouteTableError::WildcardNotLast);
            }
        }
        if entries.last().is_none_or(|(_, entry)| entry.path != WILDCARD) {
            return Err(RouteTableError::MissingFallback);
        }

        Ok(Self { entries })
    }

    /// Resolve a request path (query and fragment ignored) to a screen or redirect.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let requested = segments(path);

        for (access, entry) in &self.entries {
            match match_entry(entry, &requested, &[], None) {
                Some(Matched::Screen {
                    screen,
                    shell,
                    params,
                }) => {
                    return Resolution::Render {
                        screen,
                        access: *access,
                        shell,
                        params,
                    };
                }
                Some(Matched::Redirect(location)) => {
                    return Resolution::Redirect {
                        location: location.to_string(),
                    };
                }
                None => {}
            }
        }

        // Unreachable for a validated table: the trailing wildcard matches everything.
        Resolution::Redirect {
            location: NOT_FOUND_PATH.to_string(),
        }
    }

    /// Parameterless private screens in table order, for the layout navigation.
    #[must_use]
    pub fn navigation(&self) -> Vec<(&'static str, Screen)> {
        let mut links = Vec::new();
        for (access, entry) in &self.entries {
            if *access == Access::Private {
                collect_links(entry, entry.path, &mut links);
            }
        }
        links
    }
}

/// The hospital administration route table.
///
/// # Errors
/// Returns an error only if the static table is inconsistent.
pub fn hospital_routes() -> Result<RouteTable, RouteTableError> {
    let private = vec![RouteEntry::layout(
        HOME_PATH,
        Shell::Main,
        vec![
            RouteEntry::index(Screen::Home),
            RouteEntry::screen("/doctor", Screen::Doctors),
            // Static segment first: first match wins.
            RouteEntry::screen("/doctor/add", Screen::AddDoctor),
            RouteEntry::screen("/doctor/:doctorId", Screen::DoctorDetail),
            RouteEntry::screen("/appointments", Screen::Appointments),
            RouteEntry::screen("/patients", Screen::Patients),
            RouteEntry::screen("/profile", Screen::Profile),
            RouteEntry::screen("/accounts", Screen::Accounts),
            RouteEntry::screen("/role", Screen::Role),
            RouteEntry::screen("/dashboard", Screen::Dashboard),
            RouteEntry::screen("/livecases", Screen::LiveCases),
        ],
    )];

    let public = vec![
        RouteEntry::screen(NOT_FOUND_PATH, Screen::NotFound),
        RouteEntry::screen(REGISTER_PATH, Screen::Register),
        RouteEntry::screen(LOGIN_PATH, Screen::Login),
        RouteEntry::screen(OTP_PATH, Screen::Otp),
        RouteEntry::redirect(WILDCARD, NOT_FOUND_PATH),
    ];

    RouteTable::new(private, public)
}

enum Matched {
    Screen {
        screen: Screen,
        shell: Option<Shell>,
        params: Params,
    },
    Redirect(&'static str),
}

fn validate(entry: &RouteEntry, nested: bool) -> Result<(), RouteTableError> {
    let index = nested && entry.path.is_empty();
    if !(entry.path.starts_with('/') || entry.path == WILDCARD || index) {
        return Err(RouteTableError::RelativePath(entry.path));
    }
    if nested && entry.path == WILDCARD {
        return Err(RouteTableError::WildcardNotLast);
    }
    if let Target::Layout(_) = entry.target {
        if entry.children.is_empty() {
            return Err(RouteTableError::EmptyLayout(entry.path));
        }
        for child in &entry.children {
            validate(child, true)?;
        }
    }
    Ok(())
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn match_pattern(pattern: &str, path: &[&str]) -> Option<Params> {
    if pattern == WILDCARD {
        return Some(Params::default());
    }
    let expected = segments(pattern);
    if expected.len() != path.len() {
        return None;
    }
    let mut params = Params::default();
    for (expected, actual) in expected.iter().zip(path) {
        if let Some(name) = expected.strip_prefix(':') {
            params.push(name, actual);
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

fn match_entry(
    entry: &RouteEntry,
    path: &[&str],
    parent: &[&str],
    shell: Option<Shell>,
) -> Option<Matched> {
    match &entry.target {
        Target::Layout(layout) => {
            let own = segments(entry.path);
            if !path.starts_with(&own) {
                return None;
            }
            entry
                .children
                .iter()
                .find_map(|child| match_entry(child, path, &own, Some(*layout)))
        }
        Target::Screen(screen) => {
            let params = if entry.path.is_empty() {
                (path == parent).then(Params::default)?
            } else {
                match_pattern(entry.path, path)?
            };
            Some(Matched::Screen {
                screen: *screen,
                shell,
                params,
            })
        }
        Target::Redirect(location) => {
            match_pattern(entry.path, path).map(|_| Matched::Redirect(*location))
        }
    }
}

fn collect_links(
    entry: &RouteEntry,
    parent: &'static str,
    links: &mut Vec<(&'static str, Screen)>,
) {
    match &entry.target {
        Target::Layout(_) => {
            for child in &entry.children {
                collect_links(child, entry.path, links);
            }
        }
        Target::Screen(screen) if !entry.path.contains(':') => {
            let path = if entry.path.is_empty() { parent } else { entry.path };
            links.push((path, *screen));
        }
        Target::Screen(_) | Target::Redirect(_) => {}
    }
}
