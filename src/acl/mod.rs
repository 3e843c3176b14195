//! Datacenter permission ACLs and their reconciliation engine.
//!
//! A desired grant binds one role to one access-control path for a set of
//! principals (groups, API tokens, users) with a propagation flag. Each
//! reconciliation pass re-fetches the remote ACL table, decides what is
//! missing (or removable), and issues at most one bulk mutation.

pub mod grant;
pub mod matching;
pub mod record;
pub mod reconcile;

pub use grant::{DesiredGrant, parse_principals};
pub use record::{AclRecord, PrincipalKind};
pub use reconcile::{AclApi, AclError, CreateOutcome, DeleteOutcome};
