use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Every screen of the application, addressed the way the browser did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    Company(u64),
    Domain(String),
    CreateCard,
    EditCard(u64),
    ChangePassword,
    AdminDashboard,
    AdminUsers,
    AdminEditUser(u64),
    AdminCards,
    AdminEditCard(u64),
    AdminStatistics,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no screen at {0:?}")]
pub struct UnknownRoute(pub String);

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::Register => f.write_str("/register"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::Company(id) => write!(f, "/company/{id}"),
            Route::Domain(domain) => write!(f, "/v/{domain}"),
            Route::CreateCard => f.write_str("/create-visit-card"),
            Route::EditCard(id) => write!(f, "/edit-visit-card/{id}"),
            Route::ChangePassword => f.write_str("/change-password"),
            Route::AdminDashboard => f.write_str("/admin/dashboard"),
            Route::AdminUsers => f.write_str("/admin/users"),
            Route::AdminEditUser(id) => write!(f, "/admin/users/{id}/edit"),
            Route::AdminCards => f.write_str("/admin/visit-cards"),
            Route::AdminEditCard(id) => write!(f, "/admin/visit-cards/{id}/edit"),
            Route::AdminStatistics => f.write_str("/admin/statistics"),
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownRoute(raw.to_string());
        let path = raw.trim().split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let id = |s: &str| s.parse::<u64>().map_err(|_| unknown());

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["company", raw_id] => Route::Company(id(*raw_id)?),
            ["v", domain] => Route::Domain((*domain).to_string()),
            ["create-visit-card"] => Route::CreateCard,
            ["edit-visit-card", raw_id] => Route::EditCard(id(*raw_id)?),
            ["change-password"] => Route::ChangePassword,
            ["admin", "dashboard"] => Route::AdminDashboard,
            ["admin", "users"] => Route::AdminUsers,
            ["admin", "users", raw_id, "edit"] => Route::AdminEditUser(id(*raw_id)?),
            ["admin", "visit-cards"] => Route::AdminCards,
            ["admin", "visit-cards", raw_id, "edit"] => Route::AdminEditCard(id(*raw_id)?),
            ["admin", "statistics"] => Route::AdminStatistics,
            _ => return Err(unknown()),
        };
        Ok(route)
    }
}

/// A navigation a screen asks for, optionally after a pause so a success
/// message can be read first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: Route) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn after(to: Route, delay: Duration) -> Self {
        Self { to, after: delay }
    }
}
