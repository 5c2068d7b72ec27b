//! Payment allocation and outstanding-balance reconciliation
//!
//! - **money**: decimal-precise arithmetic and payment validation
//! - **allocation**: pure engine mapping (payment breakdown, ordered targets)
//!   to an allocation plan
//! - **reconcile**: driver applying a plan to persisted state inside one
//!   write transaction
//!
//! # Reconciliation Flow
//!
//! ```text
//! settle(request)
//!     ├─ 1. Validate payload (no transaction yet)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Resolve target orders (all-or-nothing)
//!     ├─ 4. Load items in (delivery_date, created_at) order
//!     ├─ 5. allocation::allocate → plan (fail-closed on inconsistency)
//!     ├─ 6. Apply plan: items, then order totals from fresh item sums
//!     ├─ 7. Append payment records in one batch
//!     └─ 8. Commit (any earlier error drops the transaction = abort)
//! ```

pub mod allocation;
pub mod error;
pub mod money;
pub mod reconcile;

pub use allocation::{AllocationPlan, AllocationTarget};
pub use error::{LedgerError, LedgerResult};
pub use reconcile::settle;
