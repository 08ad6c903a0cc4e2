//! Scenario mining
//!
//! Pulls `describe`/`it` structure out of test files, works out which
//! implementation file each test file exercises, and merges the scenarios
//! per implementation file. Everything here is synchronous and never fails
//! on malformed input.

pub mod aggregator;
pub mod cache;
pub mod extractor;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod types;

pub use aggregator::{aggregate, ScenarioAggregator};
pub use cache::SectionCache;
pub use extractor::{extract_imports, extract_sections, mine_source, MinedSource};
pub use resolver::{DependencyKind, TargetResolver};
pub use scanner::{find_matching_close, skipped_ranges};
pub use session::{discover_test_files, MiningSession};
pub use types::{ScenarioMap, ScenarioSection, TargetIdentity};
