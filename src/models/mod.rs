pub mod export;
pub mod generated;
pub mod generation;
pub mod prompt;

pub use export::*;
pub use generated::*;
pub use generation::*;
pub use prompt::*;
