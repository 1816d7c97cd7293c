pub mod keys;
pub mod list;
pub mod person;

pub use keys::*;
pub use list::*;
pub use person::*;
