pub mod invitation;
pub mod member;
pub mod settings;

pub use invitation::*;
pub use member::*;
pub use settings::*;
