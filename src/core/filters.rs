use crate::models::{DiscoveryFilters, ProviderProfile};

/// Youngest and oldest age a filter may name
pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 99;

impl DiscoveryFilters {
    /// Fill every unset field from `stored`; fields set here win.
    pub fn merge_with(self, stored: &DiscoveryFilters) -> DiscoveryFilters {
        DiscoveryFilters {
            min_age: self.min_age.or(stored.min_age),
            max_age: self.max_age.or(stored.max_age),
            min_price: self.min_price.or(stored.min_price),
            max_price: self.max_price.or(stored.max_price),
            verified_only: self.verified_only.or(stored.verified_only),
            gender_preferences: self
                .gender_preferences
                .or_else(|| stored.gender_preferences.clone()),
            sort_by: self.sort_by.or(stored.sort_by),
            max_distance_km: self.max_distance_km.or(stored.max_distance_km),
        }
    }

    /// Check cross-field ranges
    pub fn validate_ranges(&self) -> Result<(), String> {
        for age in [self.min_age, self.max_age].into_iter().flatten() {
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return Err(format!("Age must be between {} and {}", MIN_AGE, MAX_AGE));
            }
        }
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err("min_age cannot be greater than max_age".to_string());
            }
        }

        for price in [self.min_price, self.max_price].into_iter().flatten() {
            if !price.is_finite() || price < 0.0 {
                return Err("Price must be a non-negative number".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err("min_price cannot be greater than max_price".to_string());
            }
        }

        if let Some(distance) = self.max_distance_km {
            if !distance.is_finite() || distance <= 0.0 {
                return Err("max_distance_km must be positive".to_string());
            }
        }

        Ok(())
    }

    pub fn verified_only(&self) -> bool {
        self.verified_only.unwrap_or(false)
    }
}

/// Check whether a provider passes the filter set
///
/// Distance is handled separately by the feed since it needs the caller's
/// location.
#[inline]
pub fn matches_filters(profile: &ProviderProfile, filters: &DiscoveryFilters) -> bool {
    if !profile.is_active {
        return false;
    }

    if filters.min_age.is_some_and(|min| profile.age < min)
        || filters.max_age.is_some_and(|max| profile.age > max)
    {
        return false;
    }

    if filters.min_price.is_some_and(|min| profile.hourly_rate < min)
        || filters.max_price.is_some_and(|max| profile.hourly_rate > max)
    {
        return false;
    }

    if filters.verified_only() && !profile.is_verified {
        return false;
    }

    if let Some(genders) = &filters.gender_preferences {
        if !genders.is_empty() && !genders.iter().any(|g| g.eq_ignore_ascii_case(&profile.gender)) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortBy;
    use chrono::Utc;

    fn create_test_profile(age: i32, gender: &str, rate: f64, verified: bool) -> ProviderProfile {
        ProviderProfile {
            id: "p1".to_string(),
            user_id: "u-p1".to_string(),
            display_name: "Test Provider".to_string(),
            age,
            gender: gender.to_string(),
            hourly_rate: rate,
            is_verified: verified,
            rating: 4.5,
            review_count: 10,
            latitude: None,
            longitude: None,
            bio: None,
            photo_urls: vec![],
            services: vec![],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_request_values_win_over_stored() {
        let request = DiscoveryFilters {
            min_age: Some(30),
            sort_by: Some(SortBy::PriceLow),
            ..Default::default()
        };
        let stored = DiscoveryFilters {
            min_age: Some(21),
            max_age: Some(40),
            gender_preferences: Some(vec!["female".to_string()]),
            sort_by: Some(SortBy::Rating),
            ..Default::default()
        };

        let merged = request.merge_with(&stored);

        assert_eq!(merged.min_age, Some(30));
        assert_eq!(merged.max_age, Some(40));
        assert_eq!(merged.sort_by, Some(SortBy::PriceLow));
        assert_eq!(merged.gender_preferences, Some(vec!["female".to_string()]));
    }

    #[test]
    fn test_empty_gender_list_overrides_stored() {
        let request = DiscoveryFilters {
            gender_preferences: Some(vec![]),
            ..Default::default()
        };
        let stored = DiscoveryFilters {
            gender_preferences: Some(vec!["male".to_string()]),
            ..Default::default()
        };

        let merged = request.merge_with(&stored);
        assert!(matches_filters(&create_test_profile(25, "female", 100.0, false), &merged));
    }

    #[test]
    fn test_range_validation() {
        let inverted = DiscoveryFilters { min_age: Some(40), max_age: Some(30), ..Default::default() };
        assert!(inverted.validate_ranges().is_err());

        let underage = DiscoveryFilters { min_age: Some(16), ..Default::default() };
        assert!(underage.validate_ranges().is_err());

        let prices = DiscoveryFilters { min_price: Some(200.0), max_price: Some(100.0), ..Default::default() };
        assert!(prices.validate_ranges().is_err());

        assert!(DiscoveryFilters::default().validate_ranges().is_ok());
    }

    #[test]
    fn test_age_and_price_bounds_inclusive() {
        let filters = DiscoveryFilters {
            min_age: Some(25),
            max_age: Some(30),
            min_price: Some(100.0),
            max_price: Some(200.0),
            ..Default::default()
        };

        assert!(matches_filters(&create_test_profile(25, "female", 100.0, false), &filters));
        assert!(matches_filters(&create_test_profile(30, "female", 200.0, false), &filters));
        assert!(!matches_filters(&create_test_profile(31, "female", 150.0, false), &filters));
        assert!(!matches_filters(&create_test_profile(27, "female", 250.0, false), &filters));
    }

    #[test]
    fn test_verified_only() {
        let filters = DiscoveryFilters { verified_only: Some(true), ..Default::default() };

        assert!(matches_filters(&create_test_profile(25, "female", 100.0, true), &filters));
        assert!(!matches_filters(&create_test_profile(25, "female", 100.0, false), &filters));
    }

    #[test]
    fn test_gender_case_insensitive() {
        let filters = DiscoveryFilters {
            gender_preferences: Some(vec!["female".to_string()]),
            ..Default::default()
        };

        assert!(matches_filters(&create_test_profile(25, "Female", 100.0, false), &filters));
        assert!(!matches_filters(&create_test_profile(25, "male", 100.0, false), &filters));
    }

    #[test]
    fn test_inactive_profile_filtered() {
        let mut profile = create_test_profile(25, "female", 100.0, true);
        profile.is_active = false;

        assert!(!matches_filters(&profile, &DiscoveryFilters::default()));
    }
}
