pub mod outcome;
pub mod record;
pub mod snapshot;

pub use outcome::*;
pub use record::*;
pub use snapshot::*;
