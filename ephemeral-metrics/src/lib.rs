pub use summary::FsStats;
pub use summary::NodeSnapshot;
pub use summary::NodeStats;
pub use summary::PodRef;
pub use summary::PodStats;
pub use summary::PodUsage;
pub use summary::Summary;

pub mod summary;
