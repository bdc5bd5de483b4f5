//! Vejr screens
//!
//! Home and saved-cities flows over the weather and storage crates. Each
//! operation takes a screen state value and returns the updated state.

pub mod error_mapping;
pub mod home;
pub mod saved;
pub mod services;
pub mod state;

pub use error_mapping::ScreenError;
pub use services::AppServices;
pub use state::{HomeState, Notice, NoticeKind, SavedCityCard, SavedState};
