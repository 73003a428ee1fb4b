//! SQLite-backed usage ledger.
//!
//! Every invocation outcome, successful or not, can be appended as a
//! [`UsageRecord`]. The ledger answers two questions for cost tracking:
//! what happened recently ([`Ledger::recent`]) and how much each model has
//! cost so far ([`Ledger::totals`]).
//!
//! The ledger is a consumer of the runtime. Nothing in the invocation path
//! writes to it; callers record outcomes explicitly.
//!
//! # Example
//!
//! ```no_run
//! use registry::ProviderId;
//! use storage::{Ledger, UsageRecord};
//!
//! let ledger = Ledger::open("usage.db")?;
//! ledger.append(&UsageRecord::failure(
//!     "gpt",
//!     ProviderId::OpenAi,
//!     "gpt-4o",
//!     "request timed out after 60000ms",
//! ))?;
//!
//! for summary in ledger.totals()? {
//!     println!("{}: {} calls, ${:.4}", summary.model, summary.calls, summary.cost);
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod ledger;
mod record;

pub use error::{Error, Result};
pub use ledger::{CostSummary, Ledger};
pub use record::UsageRecord;
