//! Ad-rewriting scan-and-patch cycle.
//!
//! Discovers ad elements under a root, merges the component's targeting
//! key/value pair into each element's JSON configuration attribute, and
//! re-runs the pass on every DOM-update signal. Every failure on this path
//! is absorbed locally: a targeting rewrite must never break ad rendering.

pub mod config;
pub mod cycle;
pub mod errors;
pub mod events;
pub mod merge;
pub mod metrics;
pub mod mutation;
pub mod scanner;

pub use config::RewriterConfig;
pub use cycle::{ScanCycle, ScanSummary};
pub use errors::RewriteError;
pub use merge::{apply_patch, merge};
pub use mutation::{install, Subscription};
pub use scanner::find_ads;
