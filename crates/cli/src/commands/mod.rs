pub mod accounts;
pub mod runs;
pub mod scan;
pub mod util;
pub mod workspace;

pub use accounts::*;
pub use runs::*;
pub use scan::*;
pub use util::*;
pub use workspace::*;
