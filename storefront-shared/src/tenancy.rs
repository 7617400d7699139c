/// Tenant ownership and the access guard
///
/// Every tenant-scoped entity implements [`TenantOwned`] and reports its
/// owning vendor id directly, an explicit, typed capability instead of
/// inspecting arbitrary fields at runtime. [`can_access`] is the single
/// decision function for object-scoped access: it compares the entity's
/// vendor with the caller's and never consults anything else.
///
/// # Example
///
/// ```
/// use storefront_shared::tenancy::{can_access, TenantOwned};
/// use storefront_shared::auth::middleware::AuthContext;
/// use storefront_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// struct Widget { vendor_id: Uuid }
///
/// impl TenantOwned for Widget {
///     fn owning_tenant(&self) -> Option<Uuid> {
///         Some(self.vendor_id)
///     }
/// }
///
/// let vendor_id = Uuid::new_v4();
/// let auth = AuthContext::new(Uuid::new_v4(), Some(vendor_id), UserRole::Staff, "sam");
/// assert!(can_access(&Widget { vendor_id }, &auth));
/// assert!(!can_access(&Widget { vendor_id: Uuid::new_v4() }, &auth));
/// ```

use uuid::Uuid;

use crate::auth::middleware::AuthContext;

/// Capability of resolving the owning tenant (vendor) of an entity
///
/// Implemented by every tenant-scoped model. A `None` return means the
/// entity has no owning vendor (only platform superusers are in that
/// position) and the guard denies access.
pub trait TenantOwned {
    /// The vendor that owns this entity, if any
    fn owning_tenant(&self) -> Option<Uuid>;
}

/// Decides whether `caller` may access `entity`
///
/// Returns true iff both the entity's owning vendor and the caller's vendor
/// are present and equal. Pure and side-effect free; never errors. Callers
/// translate `false` into a Forbidden failure.
pub fn can_access<T: TenantOwned>(entity: &T, caller: &AuthContext) -> bool {
    match (entity.owning_tenant(), caller.vendor_id) {
        (Some(entity_vendor), Some(caller_vendor)) => entity_vendor == caller_vendor,
        _ => false,
    }
}
