//! Pure matching logic over a fetched ACL snapshot.
//!
//! Both functions are read-only: they never touch the remote side and never
//! mutate the snapshot.

use super::grant::DesiredGrant;
use super::record::{AclRecord, PrincipalKind};

/// Whether every requested principal already holds an identical
/// (path, roleid, propagate) grant.
///
/// A class with an empty requested set contributes no constraint. A
/// propagate mismatch on an otherwise identical grant counts as "does not
/// exist": changing only the flag requires a full re-create.
pub fn grant_satisfied(current: &[AclRecord], grant: &DesiredGrant) -> bool {
    if current.is_empty() {
        return false;
    }

    PrincipalKind::ALL
        .iter()
        .all(|&kind| class_satisfied(current, grant, kind))
}

fn class_satisfied(current: &[AclRecord], grant: &DesiredGrant, kind: PrincipalKind) -> bool {
    let requested = grant.principals(kind);
    if requested.is_empty() {
        return true;
    }

    requested.iter().all(|ugid| {
        current.iter().any(|acl| {
            acl.kind == kind
                && acl.ugid == *ugid
                && acl.path == grant.path
                && acl.roleid == grant.roleid
                && acl.propagate == grant.propagate
        })
    })
}

/// Existing grants under (path, roleid) held by an explicitly requested
/// principal, in snapshot order.
///
/// The propagate flag is deliberately not a filter here: a removal request
/// matches grants with either value, and each entry carries the remote
/// record's own flag so the caller can report exactly what goes away.
pub fn removal_set(current: &[AclRecord], grant: &DesiredGrant) -> Vec<AclRecord> {
    let mut removing = Vec::new();

    for acl in current {
        if acl.path != grant.path || acl.roleid != grant.roleid {
            continue;
        }
        if grant.principals(acl.kind).iter().any(|ugid| *ugid == acl.ugid) {
            removing.push(acl.clone());
        }
    }

    removing
}
