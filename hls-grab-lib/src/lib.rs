pub mod config;
pub mod descriptor;
pub mod engine;
pub(crate) mod error;
pub mod headers;
pub mod locator;
pub mod naming;
pub mod plan;
pub(crate) mod planner;
pub mod playlist;
pub mod preferences;
pub mod selection;

#[cfg(test)]
pub(crate) mod tests;

pub use config::PlannerConfig;
pub use descriptor::{AssetDescriptor, PackageType};
pub use error::{ErrorKind, GrabError, Result};
pub use headers::RequestHeaders;
pub use naming::NamingOverrides;
pub use plan::RemuxPlan;
pub use planner::{ManifestFetch, PlanRequest, PlannedJob, Planner};
pub use preferences::{AudioMode, Container, Preferences, SubtitleMode};
