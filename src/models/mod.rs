pub mod collection;
pub mod collection_work;
pub mod session;
pub mod work;

pub use collection::*;
pub use collection_work::*;
pub use session::*;
pub use work::*;
