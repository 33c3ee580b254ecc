// Core algorithm exports
pub mod distance;
pub mod feed;
pub mod filters;
pub mod ranking;

pub use distance::{calculate_bounding_box, distance_between, haversine_distance, is_within_bounding_box, within_radius};
pub use feed::{select_after_anchor, DiscoveryFeed, FeedPage, FeedRequest, MAX_PAGE_SIZE};
pub use filters::matches_filters;
pub use ranking::{FeedOrder, RankedCandidate};
