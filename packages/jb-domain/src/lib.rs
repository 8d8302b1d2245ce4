//! Request-side domain logic for job board listings: raw parameter parsing, typed filter
//! criteria, sort resolution, pagination and the merge rules applied to AI rerank replies.
//!
//! Nothing here touches the network or the database.

pub mod criteria;
pub mod page;
pub mod params;
pub mod rerank;
pub mod sort;
