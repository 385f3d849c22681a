pub mod error;
pub mod intake;
pub mod preferences;
pub mod timecode;


pub use error::*;
pub use intake::*;
pub use preferences::*;
pub use timecode::*;
