//! List permission resolution.
//!
//! A list has exactly one owner and any number of share grants, each
//! carrying a [`SharePermission`]. The owner never appears among the
//! grants; ownership implies full permission. Resolution always checks
//! ownership before the grant map, so a stray grant for the owner can
//! never downgrade them.

use std::collections::HashMap;

use crate::types::DbId;

/// Permission a share grant confers on a non-owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePermission {
    View,
    Edit,
}

impl SharePermission {
    pub fn as_str(self) -> &'static str {
        match self {
            SharePermission::View => "view",
            SharePermission::Edit => "edit",
        }
    }

    /// Parse a stored permission string. Unknown values map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(SharePermission::View),
            "edit" => Some(SharePermission::Edit),
            _ => None,
        }
    }
}

/// Effective permission a requester holds on a list once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    Owner,
    Edit,
    View,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::Owner => "owner",
            PermissionLevel::Edit => "edit",
            PermissionLevel::View => "view",
        }
    }
}

/// The three canonical access requirements for list-scoped operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAccess {
    /// Owner, edit, or view.
    ViewOrAbove,
    /// Owner or edit.
    EditOrAbove,
    /// Owner only.
    OwnerOnly,
}

/// Whether a held share permission satisfies a requirement.
fn share_satisfies(held: SharePermission, required: RequiredAccess) -> bool {
    match required {
        RequiredAccess::ViewOrAbove => true,
        RequiredAccess::EditOrAbove => held == SharePermission::Edit,
        RequiredAccess::OwnerOnly => false,
    }
}

/// Resolve the effective permission of `requester` on a list.
///
/// The owner check is evaluated first, unconditionally; otherwise the
/// requester is looked up in the grant map and the held level must satisfy
/// `required`. Returns `None` when access is denied.
pub fn resolve(
    owner_id: DbId,
    shares: &HashMap<DbId, SharePermission>,
    requester: DbId,
    required: RequiredAccess,
) -> Option<PermissionLevel> {
    if requester == owner_id {
        return Some(PermissionLevel::Owner);
    }

    let held = *shares.get(&requester)?;
    if share_satisfies(held, required) {
        Some(match held {
            SharePermission::Edit => PermissionLevel::Edit,
            SharePermission::View => PermissionLevel::View,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: DbId = 1;
    const FRIEND: DbId = 2;
    const STRANGER: DbId = 3;

    fn shares(entries: &[(DbId, SharePermission)]) -> HashMap<DbId, SharePermission> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_owner_granted_regardless_of_shares() {
        let empty = shares(&[]);
        for required in [
            RequiredAccess::ViewOrAbove,
            RequiredAccess::EditOrAbove,
            RequiredAccess::OwnerOnly,
        ] {
            assert_eq!(
                resolve(OWNER, &empty, OWNER, required),
                Some(PermissionLevel::Owner)
            );
        }

        // A grant for the owner must not change the outcome.
        let with_owner_grant = shares(&[(OWNER, SharePermission::View)]);
        assert_eq!(
            resolve(OWNER, &with_owner_grant, OWNER, RequiredAccess::OwnerOnly),
            Some(PermissionLevel::Owner)
        );
    }

    #[test]
    fn test_edit_grant_satisfies_edit_and_view() {
        let s = shares(&[(FRIEND, SharePermission::Edit)]);
        assert_eq!(
            resolve(OWNER, &s, FRIEND, RequiredAccess::ViewOrAbove),
            Some(PermissionLevel::Edit)
        );
        assert_eq!(
            resolve(OWNER, &s, FRIEND, RequiredAccess::EditOrAbove),
            Some(PermissionLevel::Edit)
        );
        assert_eq!(resolve(OWNER, &s, FRIEND, RequiredAccess::OwnerOnly), None);
    }

    #[test]
    fn test_view_grant_satisfies_only_view() {
        let s = shares(&[(FRIEND, SharePermission::View)]);
        assert_eq!(
            resolve(OWNER, &s, FRIEND, RequiredAccess::ViewOrAbove),
            Some(PermissionLevel::View)
        );
        assert_eq!(resolve(OWNER, &s, FRIEND, RequiredAccess::EditOrAbove), None);
        assert_eq!(resolve(OWNER, &s, FRIEND, RequiredAccess::OwnerOnly), None);
    }

    #[test]
    fn test_unshared_user_denied() {
        let s = shares(&[(FRIEND, SharePermission::Edit)]);
        assert_eq!(
            resolve(OWNER, &s, STRANGER, RequiredAccess::ViewOrAbove),
            None
        );
    }

    #[test]
    fn test_share_permission_parse() {
        assert_eq!(SharePermission::parse("view"), Some(SharePermission::View));
        assert_eq!(SharePermission::parse("edit"), Some(SharePermission::Edit));
        assert_eq!(SharePermission::parse("admin"), None);
        assert_eq!(SharePermission::parse("owner"), None);
    }
}
