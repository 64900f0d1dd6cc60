//! Route guard for protected views.

use super::context::SessionState;

/// Where anonymous visitors are sent
pub const LOGIN_PATH: &str = "/login";

/// What a protected view should do for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Loading,
    Redirect { to: &'static str },
}

/// Decide how a protected view renders; holds no state of its own
pub fn route_guard(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Authenticated { .. } => GuardDecision::Render,
        SessionState::Unknown => GuardDecision::Loading,
        SessionState::Anonymous => GuardDecision::Redirect { to: LOGIN_PATH },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountResponse;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_route_guard() {
        let now = Utc::now();
        let authenticated = SessionState::Authenticated {
            account: AccountResponse {
                id: Uuid::new_v4(),
                username: "alice".into(),
                email: "alice@x.com".into(),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            token: "token".into(),
        };

        assert_eq!(route_guard(&authenticated), GuardDecision::Render);
        assert_eq!(route_guard(&SessionState::Unknown), GuardDecision::Loading);
        assert_eq!(
            route_guard(&SessionState::Anonymous),
            GuardDecision::Redirect { to: "/login" }
        );
    }
}
