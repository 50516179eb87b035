pub mod builder;
pub mod creators;
pub mod hierarchy;
pub mod mutate;
pub mod naming;
pub mod reference;
pub mod retrieve;

pub use builder::*;
pub use creators::*;
pub use hierarchy::*;
pub use mutate::*;
pub use naming::*;
pub use retrieve::*;
