pub mod auth;
pub mod clerk;
pub mod dao;
pub mod email;
pub mod invite;

pub use auth::AuthService;
pub use clerk::ClerkService;
pub use dao::*;
pub use email::EmailService;
pub use invite::InviteService;
