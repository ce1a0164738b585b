pub mod app_config;
pub mod clock;
pub mod config;
pub mod dates;
pub mod error;
pub mod record;
pub mod url;

pub use app_config::{AppConfig, DelayRange};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_app_config, load_app_config_from_env};
pub use dates::parse_date_range;
pub use error::ConfigError;
pub use record::{LeafletFields, LeafletRecord};
pub use url::validate_url;
