pub mod cache;
pub mod scanner;
pub mod stats;

pub use cache::{Clock, SystemClock, WindowCache};
pub use scanner::RoomScanner;
pub use stats::{room_stats, AgentActivity, RallyInfo, RoomStats};
