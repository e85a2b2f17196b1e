//! Function dependency graph.
//!
//! Only `"function"`-category dependencies become edges. An edge `A → B`
//! means "A depends on B" (B must be deployed before A).
//!
//! ## Submodules
//!
//! - [`arena`]: index arena built from a [`FunctionSet`], nodes in key order.
//! - [`cycles`]: first-cycle detection (iterative three-color DFS) and the
//!   all-cycles diagnostic.
//! - [`endpoints`]: first/last function of the synthesized chain.
//!
//! [`FunctionSet`]: crate::model::FunctionSet

pub mod arena;
pub mod cycles;
pub mod endpoints;

pub use arena::FunctionGraph;
pub use cycles::{CyclePath, find_all_cycles, find_cycle, has_cycle};
pub use endpoints::{ChainEndpoints, find_endpoints};
