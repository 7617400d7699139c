/// Authorization helpers and permission checks
///
/// Role-based access control for vendor stores. Each authenticated user
/// carries a [`UserRole`] in their token; this module decides which
/// operations that role may perform.
///
/// # Permission Model
///
/// | Operation                | Owner | Staff | Customer |
/// |--------------------------|-------|-------|----------|
/// | Create product           | yes   | yes   | no       |
/// | Update product           | yes   | yes   | no       |
/// | Delete product           | yes   | no    | no       |
/// | Create order             | yes   | yes   | yes      |
/// | Update order             | yes   | yes*  | no       |
/// | Delete order             | yes   | no    | no       |
/// | Assign staff to order    | yes   | no    | no       |
/// | Manage vendor users      | yes   | no    | no       |
/// | View customers           | yes   | yes   | no       |
///
/// *Staff can only update orders that are unassigned or assigned to
/// themselves; that per-order constraint is enforced by the order engine,
/// not here.
///
/// # Example
///
/// ```
/// use storefront_shared::auth::authorization::{require_permission, Operation};
/// use storefront_shared::auth::middleware::AuthContext;
/// use storefront_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let auth = AuthContext::new(Uuid::new_v4(), Some(Uuid::new_v4()), UserRole::Staff, "sam");
///
/// assert!(require_permission(&auth, Operation::CreateProduct).is_ok());
/// assert!(require_permission(&auth, Operation::DeleteProduct).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Role does not permit the operation
    #[error("Role {role:?} is not permitted to {operation}")]
    InsufficientRole {
        role: UserRole,
        operation: Operation,
    },

    /// Caller has no vendor binding
    #[error("User is not attached to a vendor")]
    NoVendor,

    /// Caller's vendor does not own the resource
    #[error("Not authorized to access this resource")]
    WrongVendor,
}

/// Operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    CreateOrder,
    UpdateOrder,
    DeleteOrder,
    AssignStaff,
    ManageUsers,
    ViewCustomers,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateProduct => "create products",
            Operation::UpdateProduct => "update products",
            Operation::DeleteProduct => "delete products",
            Operation::CreateOrder => "create orders",
            Operation::UpdateOrder => "update orders",
            Operation::DeleteOrder => "delete orders",
            Operation::AssignStaff => "assign staff",
            Operation::ManageUsers => "manage users",
            Operation::ViewCustomers => "view customers",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl UserRole {
    /// Returns true if this role may perform the operation
    ///
    /// Staff's per-order assignment restriction on `UpdateOrder` is not
    /// visible at this level; the order engine checks it against the
    /// specific order row.
    pub fn can(&self, operation: Operation) -> bool {
        use Operation::*;

        match self {
            UserRole::Owner => true,
            UserRole::Staff => matches!(
                operation,
                CreateProduct | UpdateProduct | CreateOrder | UpdateOrder | ViewCustomers
            ),
            UserRole::Customer => matches!(operation, CreateOrder),
        }
    }
}

/// Checks that the caller's role permits an operation
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` if the role does not permit it
pub fn require_permission(auth: &AuthContext, operation: Operation) -> Result<(), AuthzError> {
    if !auth.role.can(operation) {
        return Err(AuthzError::InsufficientRole {
            role: auth.role,
            operation,
        });
    }

    Ok(())
}

/// Checks that the caller is bound to the given vendor
///
/// # Errors
///
/// Returns `AuthzError::NoVendor` if the caller has no vendor binding,
/// `AuthzError::WrongVendor` if the binding does not match
pub fn require_vendor(auth: &AuthContext, vendor_id: Uuid) -> Result<(), AuthzError> {
    match auth.vendor_id {
        None => Err(AuthzError::NoVendor),
        Some(own) if own == vendor_id => Ok(()),
        Some(_) => Err(AuthzError::WrongVendor),
    }
}

/// Combined check: caller belongs to the vendor and their role permits
/// the operation
pub fn require_vendor_permission(
    auth: &AuthContext,
    vendor_id: Uuid,
    operation: Operation,
) -> Result<(), AuthzError> {
    require_vendor(auth, vendor_id)?;
    require_permission(auth, operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_with_role(role: UserRole) -> AuthContext {
        AuthContext::new(Uuid::new_v4(), Some(Uuid::new_v4()), role, "test")
    }

    #[test]
    fn test_owner_can_everything() {
        let ops = [
            Operation::CreateProduct,
            Operation::UpdateProduct,
            Operation::DeleteProduct,
            Operation::CreateOrder,
            Operation::UpdateOrder,
            Operation::DeleteOrder,
            Operation::AssignStaff,
            Operation::ManageUsers,
            Operation::ViewCustomers,
        ];

        for op in ops {
            assert!(UserRole::Owner.can(op), "owner should be able to {}", op);
        }
    }

    #[test]
    fn test_staff_permissions() {
        assert!(UserRole::Staff.can(Operation::CreateProduct));
        assert!(UserRole::Staff.can(Operation::UpdateProduct));
        assert!(UserRole::Staff.can(Operation::CreateOrder));
        assert!(UserRole::Staff.can(Operation::UpdateOrder));
        assert!(UserRole::Staff.can(Operation::ViewCustomers));

        assert!(!UserRole::Staff.can(Operation::DeleteProduct));
        assert!(!UserRole::Staff.can(Operation::DeleteOrder));
        assert!(!UserRole::Staff.can(Operation::AssignStaff));
        assert!(!UserRole::Staff.can(Operation::ManageUsers));
    }

    #[test]
    fn test_customer_permissions() {
        assert!(UserRole::Customer.can(Operation::CreateOrder));

        assert!(!UserRole::Customer.can(Operation::CreateProduct));
        assert!(!UserRole::Customer.can(Operation::UpdateOrder));
        assert!(!UserRole::Customer.can(Operation::ViewCustomers));
    }

    #[test]
    fn test_require_permission() {
        let staff = auth_with_role(UserRole::Staff);

        assert!(require_permission(&staff, Operation::UpdateProduct).is_ok());

        let result = require_permission(&staff, Operation::DeleteProduct);
        assert!(matches!(result, Err(AuthzError::InsufficientRole { .. })));
    }

    #[test]
    fn test_require_vendor() {
        let vendor_id = Uuid::new_v4();
        let auth = AuthContext::new(Uuid::new_v4(), Some(vendor_id), UserRole::Owner, "olu");

        assert!(require_vendor(&auth, vendor_id).is_ok());
        assert!(matches!(
            require_vendor(&auth, Uuid::new_v4()),
            Err(AuthzError::WrongVendor)
        ));

        let unbound = AuthContext::new(Uuid::new_v4(), None, UserRole::Owner, "root");
        assert!(matches!(
            require_vendor(&unbound, vendor_id),
            Err(AuthzError::NoVendor)
        ));
    }
}
