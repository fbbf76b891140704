pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{SimClock, TimeOfDay};
pub use config::{load_config, DirectorConfig};
pub use error::{DirectorError, Result};
