mod auth;

pub use auth::SessionProvider;
pub use auth::TokenManager;
pub use auth::is_expired;
