pub mod cycle;
pub mod grouping;
pub mod transition;
pub mod work_item;

pub use cycle::*;
pub use grouping::TypeGroupings;
pub use transition::*;
pub use work_item::*;
