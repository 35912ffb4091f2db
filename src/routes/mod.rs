mod auth;
mod health_check;
mod users;

pub use auth::{sign_in, sign_up, sign_up_admin};
pub use health_check::health_check;
pub use users::{delete_user, get_user, list_admins, list_users, update_user};
