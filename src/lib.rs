pub mod app;
pub mod catalog;
pub mod gate;
pub mod gemini;
pub mod messages;
pub mod store;
pub mod sync;

pub use app::{AdPlayer, App, AppEvent, EventSink, GenerationRequest, NullAdPlayer};
pub use catalog::{InputShape, ServiceConfig, ServiceKind, ZODIAC_SIGNS};
pub use gemini::{GeminiClient, GenerateError, TextGenerator};
pub use store::{AppConfig, AppData, CustomAd, SavedResult, SessionFlags, Store};

/// Raw URL of the shared public document distributed to every install
/// (ad entries and the like). The operator fills this in; when empty the app
/// runs on local data only.
pub const PUBLIC_FEED_URL: &str = "";
