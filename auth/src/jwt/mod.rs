pub mod claims;
pub mod errors;
pub mod handler;
pub mod policy;

pub use claims::Claims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use policy::TokenPolicy;
