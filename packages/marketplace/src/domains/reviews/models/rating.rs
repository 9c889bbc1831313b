use serde::{Deserialize, Serialize};

/// A provider's derived rating: mean and count of approved reviews.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: u32,
}

impl RatingSummary {
    /// Always computed from the full set, never from a running sum.
    /// An empty set averages to 0.
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u32), |(sum, count), rating| {
                (sum + u64::from(rating), count.saturating_add(1))
            });

        let average_rating = if count == 0 {
            0.0
        } else {
            sum as f64 / f64::from(count)
        };

        Self {
            average_rating,
            review_count: count,
        }
    }
}
