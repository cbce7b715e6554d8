//! Governance object lifecycle and coordination engine.
//!
//! Every sentinel instance watches the same chain and the same replicated
//! object table, and reaches the same decisions on its own:
//!
//! - **Ingest** copies remote objects into the local store, validating each once.
//! - **Election** picks the cycle's superblock originator from the block hash.
//! - **Superblock builder** packs quorum-backed proposals into the cycle budget.
//! - **Outbox** pushes local objects to the network in two phases (prepare, submit).
//! - **Auto-voter** votes on remote objects whose validity is known.
//!
//! All of these are methods on [`Sentinel`], which holds the store, the
//! chain client and the parameters.

pub mod autovote;
pub mod election;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod outbox;
pub mod params;
pub mod superblock;
pub mod validator;

pub use autovote::VoteReport;
pub use engine::Sentinel;
pub use error::GovernanceError;
pub use ingest::IngestReport;
pub use outbox::OutboxReport;
pub use params::GovernanceParams;
pub use superblock::SuperblockOutcome;
pub use validator::ProposalDefect;
