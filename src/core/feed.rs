use crate::core::{
    distance::{distance_between, within_radius},
    filters::matches_filters,
    ranking::{FeedOrder, RankedCandidate},
};
use crate::models::{DiscoveryCard, DiscoveryFilters, GeoPoint, ProviderProfile};

/// Largest page the feed will ever serve
pub const MAX_PAGE_SIZE: usize = 50;

/// Inputs of a single feed page
#[derive(Debug, Clone)]
pub struct FeedRequest<'a> {
    pub viewer_id: &'a str,
    /// Request filters already merged with stored preferences
    pub filters: &'a DiscoveryFilters,
    pub origin: Option<GeoPoint>,
    /// Profile named by the cursor; the page starts strictly after it
    pub anchor: Option<&'a ProviderProfile>,
    pub limit: usize,
}

/// One page of discovery cards
#[derive(Debug)]
pub struct FeedPage {
    pub cards: Vec<DiscoveryCard>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub total_candidates: usize,
}

/// Discovery card feed
///
/// # Pipeline Stages
/// 1. Own-profile exclusion and filter matching
/// 2. Distance (bounding box, then Haversine) when the caller's location is known
/// 3. Ordering by the requested sort key with id tie-break
/// 4. Seek past the cursor anchor and over-fetch one row for `has_more`
#[derive(Debug, Clone)]
pub struct DiscoveryFeed {
    max_page_size: usize,
}

impl DiscoveryFeed {
    pub fn new(max_page_size: usize) -> Self {
        Self {
            max_page_size: max_page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Requested page size clamped to `1..=max_page_size`
    pub fn page_limit(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_page_size)
    }

    /// Build a page from the candidates the store returned
    ///
    /// `candidates` must already exclude profiles the viewer interacted with.
    pub fn build_page(&self, request: &FeedRequest<'_>, candidates: Vec<ProviderProfile>) -> FeedPage {
        let total_candidates = candidates.len();
        let limit = self.page_limit(request.limit);

        let mut ranked = select_after_anchor(request, candidates);
        ranked.truncate(limit + 1);
        let has_more = ranked.len() > limit;
        ranked.truncate(limit);

        let next_cursor = if has_more {
            ranked.last().map(|c| c.profile.id.clone())
        } else {
            None
        };

        let cards = ranked
            .into_iter()
            .map(|c| DiscoveryCard::from_profile(c.profile, c.distance_km))
            .collect();

        FeedPage {
            cards,
            has_more,
            next_cursor,
            total_candidates,
        }
    }
}

/// Stages 1-4 of the pipeline: filtered, ranked candidates strictly after the anchor
pub fn select_after_anchor(request: &FeedRequest<'_>, candidates: Vec<ProviderProfile>) -> Vec<RankedCandidate> {
    let order = FeedOrder::resolve(request.filters.sort_by, request.origin.is_some());

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        // Stage 1: own profile and filter set
        .filter(|profile| !is_own_profile(profile, request.viewer_id))
        .filter(|profile| matches_filters(profile, request.filters))
        // Stage 2: distance
        .filter_map(|profile| rank(profile, request.origin, request.filters.max_distance_km))
        .collect();

    // Stage 3: ordering
    order.sort(&mut ranked);

    // Stage 4: keyset seek
    if let Some(anchor) = request.anchor {
        let anchor = RankedCandidate {
            distance_km: distance_to(anchor, request.origin),
            profile: anchor.clone(),
        };
        let start = ranked.partition_point(|candidate| !order.is_after(candidate, &anchor));
        ranked.drain(..start);
    }

    ranked
}

impl Default for DiscoveryFeed {
    fn default() -> Self {
        Self::new(MAX_PAGE_SIZE)
    }
}

#[inline]
fn is_own_profile(profile: &ProviderProfile, viewer_id: &str) -> bool {
    profile.user_id == viewer_id || profile.id == viewer_id
}

fn distance_to(profile: &ProviderProfile, origin: Option<GeoPoint>) -> Option<f64> {
    Some(distance_between(origin?, profile.location()?))
}

/// Attach the distance, dropping profiles outside `max_distance_km`
fn rank(profile: ProviderProfile, origin: Option<GeoPoint>, max_distance_km: Option<f64>) -> Option<RankedCandidate> {
    if let (Some(origin), Some(radius)) = (origin, max_distance_km) {
        // A radius only makes sense for profiles with a known location
        let location = profile.location()?;
        if !within_radius(origin, location, radius) {
            return None;
        }
    }

    Some(RankedCandidate {
        distance_km: distance_to(&profile, origin),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortBy;
    use chrono::Utc;

    fn create_candidate(id: &str, rating: f64, rate: f64, lat: Option<f64>, lon: Option<f64>) -> ProviderProfile {
        ProviderProfile {
            id: id.to_string(),
            user_id: format!("u-{}", id),
            display_name: format!("Provider {}", id),
            age: 27,
            gender: "female".to_string(),
            hourly_rate: rate,
            is_verified: true,
            rating,
            review_count: 5,
            latitude: lat,
            longitude: lon,
            bio: None,
            photo_urls: vec![],
            services: vec![],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn request<'a>(filters: &'a DiscoveryFilters, anchor: Option<&'a ProviderProfile>, limit: usize) -> FeedRequest<'a> {
        FeedRequest {
            viewer_id: "viewer",
            filters,
            origin: None,
            anchor,
            limit,
        }
    }

    fn ids(page: &FeedPage) -> Vec<&str> {
        page.cards.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_has_more_implies_full_page() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters::default();
        let candidates: Vec<_> = (0..5)
            .map(|i| create_candidate(&format!("p{}", i), 5.0 - i as f64 * 0.1, 100.0, None, None))
            .collect();

        let page = feed.build_page(&request(&filters, None, 3), candidates);

        assert!(page.has_more);
        assert_eq!(page.cards.len(), 3);
        assert_eq!(page.next_cursor.as_deref(), Some("p2"));
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters::default();
        let candidates = vec![
            create_candidate("p1", 4.0, 100.0, None, None),
            create_candidate("p2", 3.0, 100.0, None, None),
        ];

        let page = feed.build_page(&request(&filters, None, 2), candidates);

        assert!(!page.has_more);
        assert_eq!(page.cards.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_seek_past_anchor() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters::default();
        let candidates: Vec<_> = (0..6)
            .map(|i| create_candidate(&format!("p{}", i), 5.0 - i as f64 * 0.1, 100.0, None, None))
            .collect();

        let first = feed.build_page(&request(&filters, None, 3), candidates.clone());
        let anchor = candidates.iter().find(|c| Some(&c.id) == first.next_cursor.as_ref()).unwrap();
        let second = feed.build_page(&request(&filters, Some(anchor), 3), candidates.clone());

        assert_eq!(ids(&first), vec!["p0", "p1", "p2"]);
        assert_eq!(ids(&second), vec!["p3", "p4", "p5"]);
        assert!(!second.has_more);
    }

    #[test]
    fn test_seek_survives_deleted_anchor_and_inserted_rows() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters::default();
        let mut candidates: Vec<_> = (0..6)
            .map(|i| create_candidate(&format!("p{}", i), 5.0 - i as f64 * 0.1, 100.0, None, None))
            .collect();

        let first = feed.build_page(&request(&filters, None, 3), candidates.clone());
        let anchor = candidates.iter().find(|c| c.id == "p2").cloned().unwrap();

        // Anchor and an earlier row disappear, a better-rated row appears
        candidates.retain(|c| c.id != "p2" && c.id != "p0");
        candidates.push(create_candidate("new", 5.0, 100.0, None, None));

        let second = feed.build_page(&request(&filters, Some(&anchor), 3), candidates);

        assert_eq!(ids(&first), vec!["p0", "p1", "p2"]);
        assert_eq!(ids(&second), vec!["p3", "p4", "p5"]);
    }

    #[test]
    fn test_own_profile_never_returned() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters::default();
        let mut own = create_candidate("mine", 5.0, 100.0, None, None);
        own.user_id = "viewer".to_string();
        let candidates = vec![own, create_candidate("other", 4.0, 100.0, None, None)];

        let page = feed.build_page(&request(&filters, None, 10), candidates);

        assert_eq!(ids(&page), vec!["other"]);
    }

    #[test]
    fn test_distance_sort_and_radius() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters {
            sort_by: Some(SortBy::Distance),
            max_distance_km: Some(50.0),
            ..Default::default()
        };
        let candidates = vec![
            create_candidate("far", 5.0, 100.0, Some(41.5), Some(-74.0)),
            create_candidate("near", 4.0, 100.0, Some(40.72), Some(-74.01)),
            create_candidate("mid", 3.0, 100.0, Some(40.90), Some(-74.10)),
            create_candidate("nowhere", 5.0, 100.0, None, None),
        ];
        let req = FeedRequest {
            origin: Some(GeoPoint { latitude: 40.7128, longitude: -74.0060 }),
            ..request(&filters, None, 10)
        };

        let page = feed.build_page(&req, candidates);

        assert_eq!(ids(&page), vec!["near", "mid"]);
        assert!(page.cards[0].distance_km.unwrap() < page.cards[1].distance_km.unwrap());
    }

    #[test]
    fn test_distance_sort_without_origin_is_recency() {
        let feed = DiscoveryFeed::default();
        let filters = DiscoveryFilters { sort_by: Some(SortBy::Distance), ..Default::default() };
        let mut older = create_candidate("older", 5.0, 100.0, None, None);
        older.created_at = Utc::now() - chrono::Duration::hours(1);
        let newer = create_candidate("newer", 1.0, 100.0, None, None);

        let page = feed.build_page(&request(&filters, None, 10), vec![older, newer]);

        assert_eq!(ids(&page), vec!["newer", "older"]);
        assert!(page.cards.iter().all(|c| c.distance_km.is_none()));
    }

    #[test]
    fn test_limit_clamped_to_max_page() {
        let feed = DiscoveryFeed::new(2);
        let filters = DiscoveryFilters::default();
        let candidates: Vec<_> = (0..5)
            .map(|i| create_candidate(&format!("p{}", i), 4.0, 100.0, None, None))
            .collect();

        let page = feed.build_page(&request(&filters, None, 40), candidates);

        assert_eq!(page.cards.len(), 2);
        assert!(page.has_more);
    }
}
