//! Route handlers, one module per area of the site.

pub mod login;
pub mod logout;
pub mod pages;
pub mod profile;

pub const LOGIN_PATH: &str = "/login/";
pub const LOGOUT_PATH: &str = "/logout/";
pub const LOGIN_REQUIRED_PATH: &str = "/login_required/";
pub const ALREADY_LOGGED_IN_PATH: &str = "/already_logged_in/";
pub const ALREADY_LOGGED_OUT_PATH: &str = "/already_logged_out/";
