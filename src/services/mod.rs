// Core services
pub mod auth;
pub mod history;
pub mod items;

pub use auth::{AuthService, SignInForm, SignUpForm, SignedIn};
pub use history::HistoryService;
pub use items::ItemService;
