pub mod api;
pub mod config;
pub mod store;

pub use api::http::HttpApi;
pub use api::{ApiError, FetchQuery, FragmentPage, FragmentSource, SettingsSource, VerdictSink};
pub use config::ReviewerConfig;
pub use store::driver::StoreDriver;
pub use store::{FetchFailed, FragmentStore, ReloadOutcome, ReloadTicket};
