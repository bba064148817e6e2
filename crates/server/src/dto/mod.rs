mod position;
mod session;
mod zone;

pub use position::*;
pub use session::*;
pub use zone::*;
