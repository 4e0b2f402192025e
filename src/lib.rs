pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod screens;
pub mod session;
pub mod ui;
pub mod view;

pub use api::ApiClient;
pub use config::Config;
pub use errors::AppError;
pub use screens::App;
pub use session::Session;
