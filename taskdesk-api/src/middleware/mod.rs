/// Middleware modules for the API server
///
/// - `security`: Security response headers
///
/// Bearer authentication lives in `app::auth_layer`, on top of
/// `taskdesk_shared::auth::middleware::authenticate`.

pub mod security;
