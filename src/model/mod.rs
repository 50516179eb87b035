pub mod asset;
pub mod asset_type;
pub mod common;
pub mod connector;
pub mod query;
pub mod reference;

pub use asset::*;
pub use asset_type::*;
pub use common::*;
pub use connector::*;
pub use query::*;
pub use reference::*;
