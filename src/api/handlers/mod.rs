//! Route handlers for the auth-core HTTP surface.

pub mod health;
pub mod login;
pub mod profile;
pub mod register;

pub use health::health;
pub use login::login;
pub use profile::profile;
pub use register::register;
