//! # Capability Permissions
//!
//! Time-bounded capability grants scoped to one identity, a resource, and
//! an action. Grants append — identical grants may coexist — and lapse
//! lazily: an expired grant stays in storage but is never effective. The
//! identity's own DID holds every capability implicitly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use attest_core::{AccountId, BlockContext, IdentityId, LedgerError, PermissionId, Timestamp};
use attest_store::next_sequence;

use crate::keys::PERMISSION_SEQUENCE_KEY;
use crate::registry::{IdentityRegistry, UniversalIdentity};

/// Whether a grant allows or denies its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionEffect {
    /// The grant confers the capability.
    Allow,
    /// The grant explicitly withholds the capability.
    Deny,
}

/// A capability permission scoped to one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Unique permission id, minted at grant time.
    pub id: PermissionId,
    /// The resource the capability covers.
    pub resource: String,
    /// The action the capability covers; `*` matches any action.
    pub action: String,
    /// Allow or deny.
    pub effect: PermissionEffect,
    /// The account holding the capability.
    pub grantee: AccountId,
    /// The account that granted it.
    pub granted_by: AccountId,
    /// Grant instant (block time).
    pub granted_at: Timestamp,
    /// Optional lapse instant; unset grants never lapse.
    pub expires_at: Option<Timestamp>,
}

impl Permission {
    /// Whether this grant is effective at the given block time: it allows,
    /// and it has not lapsed. Lapse is checked here, at use time — expired
    /// grants are not swept from storage.
    pub fn is_effective(&self, now: Timestamp) -> bool {
        self.effect == PermissionEffect::Allow
            && self.expires_at.map_or(true, |expires| expires > now)
    }

    /// Whether this grant covers the given actor and action.
    pub fn covers(&self, actor: &AccountId, action: &str) -> bool {
        self.grantee == *actor && (self.action == action || self.action == "*")
    }
}

impl IdentityRegistry {
    /// Append a permission grant to an identity.
    ///
    /// No conflict check is made against existing identical grants —
    /// granting is append-only, not upsert.
    #[allow(clippy::too_many_arguments)]
    pub fn grant_permission(
        &mut self,
        ctx: &BlockContext,
        identity_id: &IdentityId,
        resource: String,
        action: String,
        grantee: AccountId,
        grantor: &AccountId,
        expires_at: Option<Timestamp>,
    ) -> Result<Permission, LedgerError> {
        let mut identity = self.must_get(identity_id)?;
        self.authorize(ctx, &identity, grantor, "grant_permissions")?;

        let seq = next_sequence(&mut self.store, PERMISSION_SEQUENCE_KEY);
        let permission = Permission {
            id: PermissionId::new(format!("perm-{}-{}", ctx.height, seq)),
            resource,
            action,
            effect: PermissionEffect::Allow,
            grantee,
            granted_by: grantor.clone(),
            granted_at: ctx.now,
            expires_at,
        };

        identity.permissions.push(permission.clone());
        identity.updated_at = ctx.now;
        self.write_identity(&identity)?;

        let mut changes = Map::new();
        changes.insert("permission_id".into(), Value::from(permission.id.as_str()));
        changes.insert("resource".into(), Value::from(permission.resource.clone()));
        changes.insert("action".into(), Value::from(permission.action.clone()));
        changes.insert(
            "grantee".into(),
            Value::from(permission.grantee.as_str()),
        );
        self.record_audit_entry(
            ctx,
            identity_id.as_str(),
            "GRANT_PERMISSION",
            grantor,
            "success",
            changes,
        )?;

        info!(
            identity_id = %identity_id,
            permission_id = %permission.id,
            action = %permission.action,
            "permission granted"
        );
        Ok(permission)
    }

    /// Remove a permission by id.
    pub fn revoke_permission(
        &mut self,
        ctx: &BlockContext,
        identity_id: &IdentityId,
        permission_id: &PermissionId,
        revoker: &AccountId,
    ) -> Result<(), LedgerError> {
        let mut identity = self.must_get(identity_id)?;
        self.authorize(ctx, &identity, revoker, "grant_permissions")?;

        let position = identity
            .permissions
            .iter()
            .position(|p| p.id == *permission_id)
            .ok_or_else(|| LedgerError::not_found("permission", permission_id.as_str()))?;
        identity.permissions.remove(position);
        identity.updated_at = ctx.now;
        self.write_identity(&identity)?;

        let mut changes = Map::new();
        changes.insert(
            "permission_id".into(),
            Value::from(permission_id.as_str()),
        );
        self.record_audit_entry(
            ctx,
            identity_id.as_str(),
            "REVOKE_PERMISSION",
            revoker,
            "success",
            changes,
        )?;

        info!(identity_id = %identity_id, permission_id = %permission_id, "permission revoked");
        Ok(())
    }

    /// Whether an actor may perform an action on an identity: the
    /// identity's own DID always may; otherwise some grant must cover the
    /// actor and action and still be effective.
    pub fn has_permission(
        &self,
        ctx: &BlockContext,
        identity: &UniversalIdentity,
        actor: &AccountId,
        action: &str,
    ) -> bool {
        if identity.did.as_str() == actor.as_str() {
            return true;
        }
        identity
            .permissions
            .iter()
            .any(|p| p.covers(actor, action) && p.is_effective(ctx.now))
    }

    /// Authorization check shared by every identity-scoped mutation.
    pub(crate) fn authorize(
        &self,
        ctx: &BlockContext,
        identity: &UniversalIdentity,
        actor: &AccountId,
        action: &str,
    ) -> Result<(), LedgerError> {
        if self.has_permission(ctx, identity, actor, action) {
            Ok(())
        } else {
            Err(LedgerError::unauthorized(format!(
                "{actor} lacks {action} permission on {}",
                identity.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::*;
    use crate::registry::SecurityLevel;

    fn setup() -> (IdentityRegistry, UniversalIdentity, AccountId) {
        let mut registry = registry();
        let identity = registry
            .create_identity(&ctx(), &account("creator"), vec![], SecurityLevel::Basic)
            .unwrap();
        let owner = account(identity.did.as_str());
        (registry, identity, owner)
    }

    #[test]
    fn grant_appends_without_conflict_check() {
        let (mut registry, identity, owner) = setup();
        for _ in 0..2 {
            registry
                .grant_permission(
                    &ctx(),
                    &identity.id,
                    "identity".into(),
                    "update".into(),
                    account("delegate"),
                    &owner,
                    None,
                )
                .unwrap();
        }
        let stored = registry.get(&identity.id).unwrap().unwrap();
        // Identical grants coexist; granting is append-only.
        assert_eq!(stored.permissions.len(), 2);
        assert_ne!(stored.permissions[0].id, stored.permissions[1].id);
    }

    #[test]
    fn grantee_becomes_authorized() {
        let (mut registry, identity, owner) = setup();
        registry
            .grant_permission(
                &ctx(),
                &identity.id,
                "identity".into(),
                "update".into(),
                account("delegate"),
                &owner,
                None,
            )
            .unwrap();

        let stored = registry.get(&identity.id).unwrap().unwrap();
        assert!(registry.has_permission(&ctx(), &stored, &account("delegate"), "update"));
        assert!(!registry.has_permission(&ctx(), &stored, &account("delegate"), "add_protocol"));
        assert!(!registry.has_permission(&ctx(), &stored, &account("other"), "update"));
    }

    #[test]
    fn wildcard_action_covers_everything() {
        let (mut registry, identity, owner) = setup();
        registry
            .grant_permission(
                &ctx(),
                &identity.id,
                "identity".into(),
                "*".into(),
                account("admin"),
                &owner,
                None,
            )
            .unwrap();
        let stored = registry.get(&identity.id).unwrap().unwrap();
        assert!(registry.has_permission(&ctx(), &stored, &account("admin"), "update"));
        assert!(registry.has_permission(&ctx(), &stored, &account("admin"), "update_compliance"));
    }

    #[test]
    fn lapsed_grant_is_not_effective_but_still_stored() {
        let (mut registry, identity, owner) = setup();
        let expires = ctx().now.plus_secs(60);
        registry
            .grant_permission(
                &ctx(),
                &identity.id,
                "identity".into(),
                "update".into(),
                account("delegate"),
                &owner,
                Some(expires),
            )
            .unwrap();

        let stored = registry.get(&identity.id).unwrap().unwrap();
        assert!(registry.has_permission(&ctx(), &stored, &account("delegate"), "update"));

        let later = BlockContext::new(9, ctx().now.plus_secs(120));
        assert!(!registry.has_permission(&later, &stored, &account("delegate"), "update"));
        // The grant still exists in storage; only its effectiveness lapsed.
        assert_eq!(stored.permissions.len(), 1);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let (mut registry, identity, owner) = setup();
        let expires = ctx().now.plus_secs(60);
        registry
            .grant_permission(
                &ctx(),
                &identity.id,
                "identity".into(),
                "update".into(),
                account("delegate"),
                &owner,
                Some(expires),
            )
            .unwrap();
        let stored = registry.get(&identity.id).unwrap().unwrap();
        let at_expiry = BlockContext::new(8, expires);
        assert!(!registry.has_permission(&at_expiry, &stored, &account("delegate"), "update"));
    }

    #[test]
    fn revoke_removes_by_id() {
        let (mut registry, identity, owner) = setup();
        let permission = registry
            .grant_permission(
                &ctx(),
                &identity.id,
                "identity".into(),
                "update".into(),
                account("delegate"),
                &owner,
                None,
            )
            .unwrap();

        registry
            .revoke_permission(&ctx(), &identity.id, &permission.id, &owner)
            .unwrap();
        let stored = registry.get(&identity.id).unwrap().unwrap();
        assert!(stored.permissions.is_empty());
        assert!(!registry.has_permission(&ctx(), &stored, &account("delegate"), "update"));
    }

    #[test]
    fn revoke_unknown_permission_is_not_found() {
        let (mut registry, identity, owner) = setup();
        let err = registry
            .revoke_permission(
                &ctx(),
                &identity.id,
                &PermissionId::new("perm-0-0"),
                &owner,
            )
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn revoke_on_unknown_identity_is_not_found() {
        let (mut registry, _identity, owner) = setup();
        let err = registry
            .revoke_permission(
                &ctx(),
                &IdentityId::new("identity-0-0"),
                &PermissionId::new("perm-0-0"),
                &owner,
            )
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn deny_effect_is_never_effective() {
        let permission = Permission {
            id: PermissionId::new("perm-1-1"),
            resource: "identity".into(),
            action: "update".into(),
            effect: PermissionEffect::Deny,
            grantee: account("delegate"),
            granted_by: account("owner"),
            granted_at: ctx().now,
            expires_at: None,
        };
        assert!(!permission.is_effective(ctx().now));
    }
}
