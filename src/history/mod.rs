mod aggregator;
mod cache;
mod clock;
mod trajectory;

pub use aggregator::{HistoryAggregator, HistorySettings};
pub use cache::{TrajectoryCache, TrajectoryDataset};
pub use clock::{Clock, SystemClock};
pub use trajectory::{build_view, Trajectory, TrajectoryView};
