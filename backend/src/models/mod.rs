pub mod analysis;
pub mod insights;
pub mod messages;
pub mod outbound;

pub use analysis::*;
pub use insights::*;
pub use messages::*;
pub use outbound::*;
