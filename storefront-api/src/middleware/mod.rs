/// Middleware modules for the API server
///
/// Custom middleware beyond what tower-http provides:
/// - Security headers

pub mod security;
