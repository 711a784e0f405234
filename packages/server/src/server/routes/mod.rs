mod auth;
mod health;
mod trpc;

pub use auth::{
    login_handler, resend_handler, reset_handler, signup_handler, update_password_handler,
};
pub use health::health_handler;
pub use trpc::{get_all_users_handler, hello_handler, set_user_role_handler};
