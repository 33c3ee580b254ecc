//! Feed orders and keyset seeking.
//!
//! Every order ends with the provider id as tie-break, which makes it total:
//! two distinct profiles never compare equal. The pagination cursor is the id
//! of the last card served; the next page resumes strictly after that
//! profile's position in the order (its sort value plus id), so rows inserted
//! or removed between calls neither shift nor repeat the remaining pages.

use std::cmp::Ordering;

use crate::models::{ProviderProfile, SortBy};

/// Candidate together with its distance from the caller, if known
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub profile: ProviderProfile,
    pub distance_km: Option<f64>,
}

/// Concrete ordering used by the feed once the caller's location is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOrder {
    /// rating desc, review count desc
    Rating,
    PriceAscending,
    PriceDescending,
    DistanceAscending,
    /// created_at desc
    Recency,
}

impl FeedOrder {
    /// Resolve the requested sort key; `distance` without an origin falls back to recency.
    pub fn resolve(sort_by: Option<SortBy>, has_origin: bool) -> Self {
        match sort_by.unwrap_or_default() {
            SortBy::Rating => FeedOrder::Rating,
            SortBy::PriceLow => FeedOrder::PriceAscending,
            SortBy::PriceHigh => FeedOrder::PriceDescending,
            SortBy::Distance if has_origin => FeedOrder::DistanceAscending,
            SortBy::Distance | SortBy::Newest => FeedOrder::Recency,
        }
    }

    /// Total order between two candidates
    pub fn compare(self, a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
        let (pa, pb) = (&a.profile, &b.profile);

        let primary = match self {
            FeedOrder::Rating => pb
                .rating
                .total_cmp(&pa.rating)
                .then_with(|| pb.review_count.cmp(&pa.review_count)),
            FeedOrder::PriceAscending => pa.hourly_rate.total_cmp(&pb.hourly_rate),
            FeedOrder::PriceDescending => pb.hourly_rate.total_cmp(&pa.hourly_rate),
            FeedOrder::DistanceAscending => match (a.distance_km, b.distance_km) {
                (Some(da), Some(db)) => da.total_cmp(&db),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            FeedOrder::Recency => pb.created_at.cmp(&pa.created_at),
        };

        primary.then_with(|| pa.id.cmp(&pb.id))
    }

    /// True when `candidate` sorts strictly after `anchor`
    #[inline]
    pub fn is_after(self, candidate: &RankedCandidate, anchor: &RankedCandidate) -> bool {
        self.compare(candidate, anchor) == Ordering::Greater
    }

    pub fn sort(self, candidates: &mut [RankedCandidate]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }
}
