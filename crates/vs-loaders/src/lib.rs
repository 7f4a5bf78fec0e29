//! # vs-loaders
//!
//! Everything between the downloaded CSV exports and the ranked output:
//! - Typed CSV loading with header validation
//! - Discovery of dated exclusion sources
//! - Exclusion import passes (first dividend, disqualified, quarterly loss, portfolio)
//! - Exclusion resolution against the company registry
//! - The P/E × P/B screening pipeline and the portfolio review

pub mod csv_processor;
pub mod error;
pub mod exclusion;
pub mod import;
pub mod loader;
pub mod portfolio_review;
pub mod report;
pub mod screening;
pub mod sources;

// Re-export commonly used types
pub use error::{LoaderError, LoaderResult};
pub use exclusion::{ExclusionResolver, ExclusionSet, FileExclusions};
pub use import::{
  DisqualifiedPass, DividendPass, ExclusionImporter, PortfolioPass, QuarterlyLossPass,
};
pub use loader::{ImportConfig, ImportContext, ImportPass};
pub use portfolio_review::{PortfolioReview, ReviewThresholds};
pub use report::{ImportReport, PassStats};
pub use screening::{NameExclusion, RankedRow, ScreenResult, ScreenRow, ScreeningPipeline};
pub use sources::{DividendFile, PortfolioView, SourceLayout};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    ExclusionImporter, ExclusionResolver, ExclusionSet, ImportConfig, ImportPass, LoaderError,
    LoaderResult, NameExclusion, ScreeningPipeline, SourceLayout,
  };
}
