pub mod info;
pub mod policy;
pub mod scope;
pub mod value;

pub use info::*;
pub use policy::*;
pub use scope::*;
pub use value::*;
