//! Allocation methods over an election.
//!
//! - `DiscountController` - saturating per-group price signal
//! - `ConstrainedAllocator` - feedback loop steering group spend toward bounds
//! - `ModifiedAllocator` - fixed discount schedule over a reduced budget
//! - `greedy` - per-group most-approved-first baseline
//! - `equal_shares_on_merged` - single oracle call on the merged instance

mod constrained;
mod discounts;
mod greedy;
mod merged;
mod modified;
mod parameters;

pub use constrained::{AllocationError, AllocationOutcome, AllocationStatus, ConstrainedAllocator};
pub use discounts::{discounted_cost, DiscountController, MIN_PRICE_FACTOR};
pub use greedy::{greedy, greedy_for_group};
pub use merged::equal_shares_on_merged;
pub use modified::ModifiedAllocator;
pub use parameters::{ConstrainedMesParameters, MesAddOneParameters, ModifiedMesParameters};
