/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `vendors`: Vendor (tenant) management
/// - `users`: Vendor staff management
/// - `products`: Product catalog
/// - `customers`: Customer directory
/// - `orders`: Order placement and management

pub mod auth;
pub mod customers;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;
pub mod vendors;
