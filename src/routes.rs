pub const APP_NAME: &str = "Todo Dashboard";
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            LOGIN_PATH => Some(Route::Login),
            HOME_PATH => Some(Route::Dashboard),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => LOGIN_PATH,
            Route::Dashboard => HOME_PATH,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Sign In - Todo Dashboard",
            Route::Dashboard => "Dashboard - Todo Dashboard",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(&'static str),
}

/// Decides what a navigation to `path` shows for the given session.
pub fn resolve(path: &str, authenticated: bool) -> Navigation {
    match Route::from_path(path) {
        None => Navigation::Redirect(LOGIN_PATH),
        Some(route) if route.requires_auth() && !authenticated => {
            Navigation::Redirect(LOGIN_PATH)
        }
        Some(Route::Login) if authenticated => Navigation::Redirect(HOME_PATH),
        Some(route) => Navigation::Render(route),
    }
}
