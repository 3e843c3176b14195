//! One reconciliation pass: fetch, decide, apply at most one mutation.
//!
//! Every pass is stateless and single-shot. The remote table is re-fetched
//! each time (freshness over performance), the verdict is computed from
//! that snapshot, and the pass ends in exactly one of: skipped, reported
//! under check mode, applied, or failed. There is no retry loop and no
//! guard against a concurrent external mutator.

use log::{debug, info};
use thiserror::Error;

use super::grant::DesiredGrant;
use super::matching::{grant_satisfied, removal_set};
use super::record::AclRecord;

/// Mutation surface of the remote cluster, as seen by the engine.
pub trait AclApi {
    /// Current ACL table. A cluster with no ACLs yields an empty list,
    /// not an error.
    fn fetch_acls(&self) -> anyhow::Result<Vec<AclRecord>>;

    /// One bulk merge (or, with `delete`, removal) of the grant's
    /// principal lists.
    fn apply_acl(&self, grant: &DesiredGrant, delete: bool) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum AclError {
    #[error("at least one of groups, tokens or users is required")]
    NoPrincipals,

    #[error("unable to retrieve ACLs: {source}")]
    Fetch {
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to {action} ACLs for path '{path}' and roleid '{roleid}': {source}")]
    Apply {
        action: &'static str,
        path: String,
        roleid: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Outcome of a create pass.
#[derive(Debug)]
pub struct CreateOutcome {
    pub changed: bool,
    /// Why nothing was done, when `changed` is false.
    pub skipped: Option<String>,
}

/// Outcome of a delete pass.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub changed: bool,
    /// Audit record of the grants that were (or, under check mode, would
    /// be) removed.
    pub removed: Vec<AclRecord>,
    pub skipped: Option<String>,
}

/// Ensure the desired grant holds remotely.
///
/// Skips when every requested principal already has an identical grant.
/// Otherwise issues one bulk `set` carrying the full principal lists as
/// received: the remote operation is a merge, so re-asserting principals
/// that are already present is harmless. Under `check` the mutation is
/// suppressed but the outcome reports what a real pass would have done.
pub fn create(api: &dyn AclApi, grant: &DesiredGrant, check: bool) -> Result<CreateOutcome, AclError> {
    if !grant.has_principals() {
        return Err(AclError::NoPrincipals);
    }

    let current = api.fetch_acls().map_err(|source| AclError::Fetch { source })?;
    debug!("fetched {} ACL entries", current.len());

    if grant_satisfied(&current, grant) {
        return Ok(CreateOutcome {
            changed: false,
            skipped: Some(format!(
                "all requested ACLs for path '{}' and roleid '{}' exist",
                grant.path, grant.roleid
            )),
        });
    }

    if check {
        return Ok(CreateOutcome {
            changed: true,
            skipped: None,
        });
    }

    api.apply_acl(grant, false).map_err(|source| AclError::Apply {
        action: "create",
        path: grant.path.clone(),
        roleid: grant.roleid.clone(),
        source,
    })?;
    info!(
        "set ACLs for path '{}' and roleid '{}'",
        grant.path, grant.roleid
    );

    Ok(CreateOutcome {
        changed: true,
        skipped: None,
    })
}

/// Remove the requested principals' grants under (path, roleid).
///
/// The removal scope ignores the propagate flag. Skips when nothing
/// matches; a fully empty remote table is skipped with its own reason and
/// must not fail. On success the previously computed removal set is
/// returned as the audit record — the mutating call itself carries the
/// requested principal lists and the delete flag, and the remote side is
/// trusted to resolve them.
pub fn delete(api: &dyn AclApi, grant: &DesiredGrant, check: bool) -> Result<DeleteOutcome, AclError> {
    if !grant.has_principals() {
        return Err(AclError::NoPrincipals);
    }

    let current = api.fetch_acls().map_err(|source| AclError::Fetch { source })?;
    debug!("fetched {} ACL entries", current.len());

    if current.is_empty() {
        return Ok(DeleteOutcome {
            changed: false,
            removed: Vec::new(),
            skipped: Some("no ACLs exist".to_string()),
        });
    }

    let removing = removal_set(&current, grant);
    if removing.is_empty() {
        return Ok(DeleteOutcome {
            changed: false,
            removed: Vec::new(),
            skipped: Some(format!(
                "no requested ACLs for path '{}' and roleid '{}' exist",
                grant.path, grant.roleid
            )),
        });
    }

    if check {
        return Ok(DeleteOutcome {
            changed: true,
            removed: removing,
            skipped: None,
        });
    }

    api.apply_acl(grant, true).map_err(|source| AclError::Apply {
        action: "delete",
        path: grant.path.clone(),
        roleid: grant.roleid.clone(),
        source,
    })?;
    info!(
        "deleted {} ACLs for path '{}' and roleid '{}'",
        removing.len(),
        grant.path,
        grant.roleid
    );

    Ok(DeleteOutcome {
        changed: true,
        removed: removing,
        skipped: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::record::PrincipalKind;
    use std::cell::RefCell;

    fn acl(path: &str, roleid: &str, propagate: bool, kind: PrincipalKind, ugid: &str) -> AclRecord {
        AclRecord {
            path: path.to_string(),
            roleid: roleid.to_string(),
            propagate,
            kind,
            ugid: ugid.to_string(),
        }
    }

    /// In-memory stand-in for the cluster. `apply_acl` mirrors the remote
    /// merge semantics so a second create pass observes the first.
    #[derive(Default)]
    struct FakeApi {
        acls: RefCell<Vec<AclRecord>>,
        applied: RefCell<Vec<(DesiredGrant, bool)>>,
        fail_fetch: bool,
        fail_apply: bool,
    }

    impl FakeApi {
        fn with_acls(acls: Vec<AclRecord>) -> Self {
            Self {
                acls: RefCell::new(acls),
                ..Self::default()
            }
        }

        fn applied(&self) -> Vec<(DesiredGrant, bool)> {
            self.applied.borrow().clone()
        }
    }

    impl AclApi for FakeApi {
        fn fetch_acls(&self) -> anyhow::Result<Vec<AclRecord>> {
            if self.fail_fetch {
                anyhow::bail!("ssh: connect to host pve1 port 22: Connection refused");
            }
            Ok(self.acls.borrow().clone())
        }

        fn apply_acl(&self, grant: &DesiredGrant, delete: bool) -> anyhow::Result<()> {
            if self.fail_apply {
                anyhow::bail!("permission denied");
            }
            self.applied.borrow_mut().push((grant.clone(), delete));

            let mut acls = self.acls.borrow_mut();
            if delete {
                acls.retain(|acl| {
                    acl.path != grant.path
                        || acl.roleid != grant.roleid
                        || !grant.principals(acl.kind).iter().any(|u| *u == acl.ugid)
                });
            } else {
                for kind in PrincipalKind::ALL {
                    for ugid in grant.principals(kind) {
                        let record =
                            acl(&grant.path, &grant.roleid, grant.propagate, kind, ugid);
                        if !acls.contains(&record) {
                            acls.push(record);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn admin_grant() -> DesiredGrant {
        DesiredGrant::new("/", "Administrator", true).with_groups(Some("Admin"))
    }

    #[test]
    fn create_is_idempotent() {
        let api = FakeApi::default();

        let first = create(&api, &admin_grant(), false).unwrap();
        assert!(first.changed);

        let second = create(&api, &admin_grant(), false).unwrap();
        assert!(!second.changed);
        assert_eq!(
            second.skipped.as_deref(),
            Some("all requested ACLs for path '/' and roleid 'Administrator' exist")
        );
        assert_eq!(api.applied().len(), 1);
    }

    #[test]
    fn create_requires_at_least_one_principal_class() {
        let api = FakeApi::default();
        let grant = DesiredGrant::new("/", "Administrator", true);
        assert!(matches!(
            create(&api, &grant, false),
            Err(AclError::NoPrincipals)
        ));
        assert!(matches!(
            delete(&api, &grant, false),
            Err(AclError::NoPrincipals)
        ));
        assert!(api.applied().is_empty());
    }

    #[test]
    fn create_on_empty_cluster_applies() {
        let api = FakeApi::default();
        let outcome = create(&api, &admin_grant(), false).unwrap();
        assert!(outcome.changed);
        assert_eq!(api.applied(), vec![(admin_grant(), false)]);
    }

    #[test]
    fn create_under_check_mode_reports_without_mutating() {
        let api = FakeApi::default();
        let outcome = create(&api, &admin_grant(), true).unwrap();
        assert!(outcome.changed);
        assert!(api.applied().is_empty());
    }

    #[test]
    fn propagate_only_change_is_a_recreate() {
        let api = FakeApi::with_acls(vec![acl(
            "/",
            "Administrator",
            true,
            PrincipalKind::Group,
            "Admin",
        )]);
        let grant = DesiredGrant::new("/", "Administrator", false).with_groups(Some("Admin"));

        let outcome = create(&api, &grant, false).unwrap();
        assert!(outcome.changed);
        assert_eq!(api.applied().len(), 1);
    }

    #[test]
    fn create_sends_full_principal_lists_not_just_missing_ones() {
        let api = FakeApi::with_acls(vec![acl(
            "/",
            "Administrator",
            true,
            PrincipalKind::Group,
            "Admin",
        )]);
        let grant =
            DesiredGrant::new("/", "Administrator", true).with_groups(Some("Admin,Ops"));

        let outcome = create(&api, &grant, false).unwrap();
        assert!(outcome.changed);

        let applied = api.applied();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0.groups, ["Admin", "Ops"]);
        assert!(!applied[0].1);
    }

    #[test]
    fn delete_returns_the_matching_grants_as_audit_record() {
        let existing = acl("/", "Administrator", true, PrincipalKind::Group, "Admin");
        let api = FakeApi::with_acls(vec![existing.clone()]);
        let grant = DesiredGrant::new("/", "Administrator", true).with_groups(Some("Admin"));

        let outcome = delete(&api, &grant, false).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.removed, [existing]);
        assert_eq!(api.applied(), vec![(grant, true)]);
        assert!(api.acls.borrow().is_empty());
    }

    #[test]
    fn delete_on_empty_cluster_is_a_distinct_noop() {
        let api = FakeApi::default();
        let outcome = delete(&api, &admin_grant(), false).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.skipped.as_deref(), Some("no ACLs exist"));
        assert!(api.applied().is_empty());
    }

    #[test]
    fn delete_with_nothing_matching_is_a_noop() {
        let api = FakeApi::with_acls(vec![acl(
            "/vms",
            "PVEVMUser",
            true,
            PrincipalKind::User,
            "devops@pve",
        )]);
        let outcome = delete(&api, &admin_grant(), false).unwrap();
        assert!(!outcome.changed);
        assert_eq!(
            outcome.skipped.as_deref(),
            Some("no requested ACLs for path '/' and roleid 'Administrator' exist")
        );
        assert!(api.applied().is_empty());
    }

    #[test]
    fn delete_under_check_mode_previews_the_removal_set() {
        let existing = acl("/", "Administrator", false, PrincipalKind::Group, "Admin");
        let api = FakeApi::with_acls(vec![existing.clone()]);
        let grant = DesiredGrant::new("/", "Administrator", true).with_groups(Some("Admin"));

        let outcome = delete(&api, &grant, true).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.removed, [existing]);
        assert!(api.applied().is_empty());
    }

    #[test]
    fn fetch_failure_is_terminal() {
        let api = FakeApi {
            fail_fetch: true,
            ..FakeApi::default()
        };
        let err = create(&api, &admin_grant(), false).unwrap_err();
        assert!(matches!(err, AclError::Fetch { .. }));
        assert!(err.to_string().contains("Connection refused"));
    }

    #[test]
    fn apply_failure_names_the_attempted_grant() {
        let api = FakeApi {
            fail_apply: true,
            ..FakeApi::default()
        };
        let err = create(&api, &admin_grant(), false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("create"));
        assert!(msg.contains("path '/'"));
        assert!(msg.contains("roleid 'Administrator'"));
    }

    // Scenario from the field: one Admin group grant at the root.
    #[test]
    fn admin_group_scenario() {
        let existing = acl("/", "Administrator", true, PrincipalKind::Group, "Admin");
        let api = FakeApi::with_acls(vec![existing.clone()]);

        // same grant again: no-op
        let outcome = create(&api, &admin_grant(), false).unwrap();
        assert!(!outcome.changed);

        // widen to a second group: one mutation carrying both
        let widened =
            DesiredGrant::new("/", "Administrator", true).with_groups(Some("Admin,Ops"));
        let outcome = create(&api, &widened, false).unwrap();
        assert!(outcome.changed);
        assert_eq!(api.applied().last().unwrap().0.groups, ["Admin", "Ops"]);

        // remove the original grant: audit record matches the old entry
        let outcome = delete(&api, &admin_grant(), false).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.removed, [existing]);
    }
}
