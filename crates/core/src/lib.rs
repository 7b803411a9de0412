//! Discovery of debuggable targets behind a Chrome DevTools Protocol endpoint.
//!
//! The pipeline lists `/json/list`, filters and normalizes the entries,
//! attaches a cached favicon to page-like targets under a short time budget
//! and returns them in a stable presentation order. [`TargetExplorer`] wraps
//! the pipeline for hosts that render a tree and want change notifications.
//!
//! ```no_run
//! # async fn demo() -> cdpt::Result<()> {
//! let config = cdpt::DiscoveryConfig::new("/tmp/cdpt/favicons").hostname("devbox").port(9222);
//! let explorer = cdpt::TargetExplorer::from_config(config)?;
//! for target in explorer.refresh().await.targets.iter() {
//!     println!("{} {}", target.kind(), target.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod explorer;
pub mod icons;
pub mod reporter;
pub mod sort;
pub mod target;

pub use cache::{ClearSummary, IconCache};
pub use cdpt_protocol::{RemoteTarget, TargetType};
pub use config::DiscoveryConfig;
pub use discovery::TargetDiscoveryService;
pub use error::{CacheClearError, DiscoveryError, IconFetchError, Result};
pub use explorer::{TargetExplorer, TargetsChanged};
pub use icons::{FaviconRequest, IconFetcher, IconSource};
pub use reporter::{DiscoveryEvent, DiscoveryReporter, RecordingReporter, TracingReporter};
pub use sort::sort_targets;
pub use target::{DiscoveredTarget, TargetDetail, TargetNode};
