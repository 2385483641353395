mod claims;
mod context;
mod gate;
mod jwt;

pub use claims::SessionClaims;
pub use context::{resolve_client_ip, AuthContext, AuthMethod};
pub use gate::AccessGate;
pub use jwt::SessionValidator;
