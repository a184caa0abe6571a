// Civic Bridge - Core Library
// Resolves an Italian place name to its representatives in the Camera,
// the Senato and the European Parliament.

pub mod error;
pub mod model;
pub mod normalize;
pub mod constituency;
pub mod store;
pub mod loader;
pub mod db;
pub mod tie_break;
pub mod resolver;
pub mod tiers;
pub mod autocomplete;
pub mod engine;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{LoadError, QueryError};
pub use model::{
    EuMember, LowerChamberDistrict, LowerChamberMember, Municipality, Tier,
    UpperChamberDistrict, UpperChamberMember,
};
pub use constituency::{Constituency, ConstituencyGrouping};
pub use store::{IntegrityReport, ReferenceStore, ReferenceTables, StoreStats};
pub use tie_break::TieBreak;
pub use resolver::MatchPhase;
pub use autocomplete::Suggestion;
pub use engine::{CivicEngine, Districts, LookupResult, TierCounts, TierListing};
pub use config::EngineConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the tracing subscriber used by the binaries (`RUST_LOG` overrides)
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civic_bridge=info,civic_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
