// Stateful pagination - offsets, slicing and post-transition rebalancing

pub mod offset;
pub mod pager;
pub mod rebalance;


pub use offset::OffsetStore;
pub use pager::{slice_page, Navigator};
pub use rebalance::{on_single_item_complete, RefreshPlan};
