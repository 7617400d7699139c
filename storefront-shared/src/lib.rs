//! # Storefront Shared Library
//!
//! This crate contains the shared types, business logic, and utilities used by
//! the storefront API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and CRUD operations (vendors, users, products,
//!   customers, orders)
//! - `tenancy`: Tenant ownership trait and access guard
//! - `auth`: Password hashing, JWT tokens, middleware, role policy
//! - `catalog`: Atomic stock operations on the product catalog
//! - `orders`: Order placement engine, status updates, staff assignment
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod catalog;
pub mod db;
pub mod models;
pub mod orders;
pub mod tenancy;

/// Current version of the storefront shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
