pub mod app;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod meals;
pub mod models;
pub mod profile;
pub mod state;
pub mod stats;
pub mod upstream;

pub use app::router;
pub use config::AppConfig;
pub use credentials::CredentialDirectory;
pub use state::AppState;
pub use upstream::UpstreamClient;
