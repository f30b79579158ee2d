use std::fmt;

/// An owner named in the components table: a user login, or a team slug
/// marked with a leading `/` in the config file.
///
/// The marker is stripped at parse time so that downstream code never has to
/// inspect the raw string again.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Owner {
    User(String),
    Team(String),
}

impl Owner {
    /// Parse a raw owner identifier from configuration.
    ///
    /// The identifier is trimmed first; identifiers that are empty after
    /// trimming (including a bare `/`) yield `None` and are dropped by the
    /// caller.
    pub fn parse(raw: &str) -> Option<Owner> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match trimmed.strip_prefix('/') {
            Some(slug) if !slug.is_empty() => Some(Owner::Team(slug.to_string())),
            Some(_) => None,
            None => Some(Owner::User(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User(login) => write!(f, "{}", login),
            Owner::Team(slug) => write!(f, "/{}", slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_login() {
        assert_eq!(Owner::parse("alice"), Some(Owner::User("alice".to_string())));
    }

    #[test]
    fn test_parse_team_slug_strips_marker() {
        assert_eq!(
            Owner::parse("/team-x"),
            Some(Owner::Team("team-x".to_string()))
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            Owner::parse("  alice  "),
            Some(Owner::User("alice".to_string()))
        );
        assert_eq!(
            Owner::parse(" /team-x "),
            Some(Owner::Team("team-x".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_empty_identifiers() {
        assert_eq!(Owner::parse(""), None);
        assert_eq!(Owner::parse("   "), None);
        assert_eq!(Owner::parse("/"), None);
    }

    #[test]
    fn test_display_round_trips_the_marker() {
        assert_eq!(Owner::User("alice".to_string()).to_string(), "alice");
        assert_eq!(Owner::Team("team-x".to_string()).to_string(), "/team-x");
    }
}
