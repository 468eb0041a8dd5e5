pub mod load;
pub mod page;
pub mod party;
pub mod status;
pub mod tender;

pub use load::*;
pub use page::*;
pub use party::*;
pub use status::*;
pub use tender::*;
