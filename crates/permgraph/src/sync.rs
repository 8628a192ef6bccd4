//! Role-grant expansion ("dependency auto-inclusion").
//!
//! When a role is granted a permission, the grant workflow must also grant
//! every transitive dependency of that permission. These helpers compute
//! the full grant set; the engine never mutates role-permission
//! assignments itself.

use crate::domain::PermissionId;
use crate::error::Result;
use crate::store::DependencyStore;
use std::collections::HashSet;

/// The set of permissions a role must receive when granted `id`:
/// the permission itself plus its full dependency closure.
pub async fn expand_grant(
    store: &dyn DependencyStore,
    id: &PermissionId,
) -> Result<HashSet<PermissionId>> {
    let mut grants = store.all_dependencies(id).await?;
    grants.insert(id.clone());
    Ok(grants)
}

/// Grant set for several permissions at once, resolved in one batch pass.
pub async fn expand_grants(
    store: &dyn DependencyStore,
    ids: &[PermissionId],
) -> Result<HashSet<PermissionId>> {
    let closures = store.batch_all_dependencies(ids).await?;

    let mut grants: HashSet<PermissionId> = ids.iter().cloned().collect();
    for members in closures.into_values() {
        grants.extend(members);
    }
    Ok(grants)
}
