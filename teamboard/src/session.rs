//! Explicitly passed identity of the signed-in user.
//!
//! Every component that needs to know which team it is working for takes a
//! [`SessionContext`]. There is no global session state.

/// Identity of the current user and their selected team.
///
/// Both parts are optional: a signed-out user has neither, and a signed-in
/// user who has not joined a team has no team id. Board components treat a
/// missing team as "nothing to show", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user_id: Option<String>,
    team_id: Option<String>,
}

impl SessionContext {
    /// Creates an empty (signed-out) session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user_id: None,
            team_id: None,
        }
    }

    /// Sets the user id. Empty strings are treated as absent.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = non_empty(user_id.into());
        self
    }

    /// Sets the team id. Empty strings are treated as absent.
    #[must_use]
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = non_empty(team_id.into());
        self
    }

    /// Returns the signed-in user's id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the selected team's id, if any.
    #[must_use]
    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
