//! The desired assignment and principal list parsing.

use super::record::PrincipalKind;

/// A role bound to an access-control path, extended to the listed
/// principals, with a propagation flag.
///
/// An empty principal list means "this class is not requested", not
/// "remove all of this class". At least one class must be non-empty before
/// a reconciliation pass will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredGrant {
    pub path: String,
    pub roleid: String,
    pub propagate: bool,
    pub groups: Vec<String>,
    pub tokens: Vec<String>,
    pub users: Vec<String>,
}

impl DesiredGrant {
    pub fn new(path: &str, roleid: &str, propagate: bool) -> Self {
        Self {
            path: path.to_string(),
            roleid: roleid.to_string(),
            propagate,
            groups: Vec::new(),
            tokens: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn with_groups(mut self, raw: Option<&str>) -> Self {
        self.groups = parse_principals(raw);
        self
    }

    pub fn with_tokens(mut self, raw: Option<&str>) -> Self {
        self.tokens = parse_principals(raw);
        self
    }

    pub fn with_users(mut self, raw: Option<&str>) -> Self {
        self.users = parse_principals(raw);
        self
    }

    /// Principals requested for one class.
    pub fn principals(&self, kind: PrincipalKind) -> &[String] {
        match kind {
            PrincipalKind::Group => &self.groups,
            PrincipalKind::Token => &self.tokens,
            PrincipalKind::User => &self.users,
        }
    }

    /// Whether any class was requested at all.
    pub fn has_principals(&self) -> bool {
        !(self.groups.is_empty() && self.tokens.is_empty() && self.users.is_empty())
    }
}

/// Split a delimited principal list on runs of commas and/or spaces into
/// trimmed, non-empty identifiers, keeping first-seen order and dropping
/// duplicates. Identifiers are not validated here: a malformed one simply
/// never matches, or is rejected by the remote side on apply.
pub fn parse_principals(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut principals: Vec<String> = Vec::new();
    for id in raw.split([',', ' ']) {
        let id = id.trim();
        if id.is_empty() || principals.iter().any(|seen| seen == id) {
            continue;
        }
        principals.push(id.to_string());
    }
    principals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas() {
        assert_eq!(parse_principals(Some("a,b,c")), ["a", "b", "c"]);
    }

    #[test]
    fn splits_on_spaces_and_mixed_runs() {
        assert_eq!(parse_principals(Some("a b")), ["a", "b"]);
        assert_eq!(parse_principals(Some("a, b ,, c  d")), ["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_and_absent_input_yield_empty_sets() {
        assert!(parse_principals(None).is_empty());
        assert!(parse_principals(Some("")).is_empty());
        assert!(parse_principals(Some("  , ,  ")).is_empty());
    }

    #[test]
    fn drops_duplicates_keeping_first_seen_order() {
        assert_eq!(parse_principals(Some("b,a,b,c,a")), ["b", "a", "c"]);
    }

    #[test]
    fn passes_malformed_identifiers_through() {
        assert_eq!(
            parse_principals(Some("devops@pve!ci,!!weird")),
            ["devops@pve!ci", "!!weird"]
        );
    }

    #[test]
    fn grant_tracks_requested_classes() {
        let grant = DesiredGrant::new("/", "Administrator", true)
            .with_groups(Some("Admin,Ops"))
            .with_users(None);
        assert!(grant.has_principals());
        assert_eq!(grant.principals(PrincipalKind::Group), ["Admin", "Ops"]);
        assert!(grant.principals(PrincipalKind::Token).is_empty());
        assert!(grant.principals(PrincipalKind::User).is_empty());

        let empty = DesiredGrant::new("/", "Administrator", true);
        assert!(!empty.has_principals());
    }
}
