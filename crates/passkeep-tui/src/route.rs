//! Navigation gate.
//!
//! Decides which top-level view is reachable for the current session
//! state and carries one-shot notices across a forced redirect.

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    SignIn,
    SignUp,
    Dashboard,
}

/// One-shot notices delivered alongside a navigation.
/// A notice is shown until the next navigation replaces or drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The session expired; the sign-in view shows a banner
    SessionExpired,
    /// Sign-up succeeded; the sign-in view pre-fills this email
    Registered { email: String },
}

/// Resolves a requested view against the session state.
///
/// Signed out, only sign-in and sign-up are reachable; signed in, only
/// the dashboard is.
pub fn resolve(requested: View, signed_in: bool) -> View {
    if signed_in {
        View::Dashboard
    } else {
        match requested {
            View::Dashboard => View::SignIn,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_out_reaches_only_auth_views() {
        assert_eq!(resolve(View::SignIn, false), View::SignIn);
        assert_eq!(resolve(View::SignUp, false), View::SignUp);
        // Protected view falls back to sign-in
        assert_eq!(resolve(View::Dashboard, false), View::SignIn);
    }

    #[test]
    fn test_signed_in_reaches_only_dashboard() {
        assert_eq!(resolve(View::Dashboard, true), View::Dashboard);
        assert_eq!(resolve(View::SignIn, true), View::Dashboard);
        assert_eq!(resolve(View::SignUp, true), View::Dashboard);
    }
}
