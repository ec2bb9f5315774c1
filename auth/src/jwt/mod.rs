pub mod errors;
pub mod handler;

pub use errors::JwtError;
pub use handler::JwtHandler;
