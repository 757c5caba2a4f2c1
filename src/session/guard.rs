use super::SessionStore;

pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect(&'static str),
}

/// Decides whether a protected view may render for the current session.
pub fn guard_route(sessions: &SessionStore) -> RouteDecision {
    if sessions.is_authenticated() {
        RouteDecision::Render
    } else {
        RouteDecision::Redirect(LOGIN_ROUTE)
    }
}
