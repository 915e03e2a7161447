pub mod dynamodb;
pub mod errors;
pub mod memory;
pub mod store;
pub mod table;

pub use dynamodb::*;
pub use errors::*;
pub use memory::*;
pub use store::*;
pub use table::*;
