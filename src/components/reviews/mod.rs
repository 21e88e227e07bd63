//! Customer reviews and the average rating they give a provider.

pub mod models;

pub use models::{Review, ReviewRequest, ReviewUpdate, MAX_RATING, MIN_RATING};

use crate::error::{invalid_input, BookingResult};

/// Reject ratings outside 1-5
pub fn validate_rating(rating: u8) -> BookingResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(invalid_input(&format!(
            "Rating {} is outside {}-{}",
            rating, MIN_RATING, MAX_RATING
        )))
    }
}

/// Mean rating of a provider's reviews rounded to one decimal, 0 without reviews
pub fn average_rating(reviews: &[Review], provider_id: &str) -> f64 {
    let ratings: Vec<u32> = reviews
        .iter()
        .filter(|r| r.provider_id == provider_id)
        .map(|r| u32::from(r.rating))
        .collect();

    if ratings.is_empty() {
        return 0.0;
    }

    let mean = f64::from(ratings.iter().sum::<u32>()) / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, provider_id: &str, rating: u8) -> Review {
        Review {
            id: id.to_string(),
            appointment_id: format!("appt-{}", id),
            provider_id: provider_id.to_string(),
            service_id: "s1".to_string(),
            customer_name: "Mai".to_string(),
            rating,
            comment: String::new(),
            response: None,
            created_at: None,
        }
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_average_rating() {
        let reviews = vec![
            review("r1", "p1", 5),
            review("r2", "p1", 4),
            review("r3", "p1", 4),
            review("r4", "p2", 1),
        ];

        // 13 / 3 = 4.333...
        assert_eq!(average_rating(&reviews, "p1"), 4.3);
        assert_eq!(average_rating(&reviews, "p2"), 1.0);
        assert_eq!(average_rating(&reviews, "p3"), 0.0);
    }

    #[test]
    fn test_review_accepts_stored_names() {
        let json = r#"{
            "id": "r1",
            "appointmentId": "a1",
            "customerId": "c1",
            "employeeId": "e1",
            "serviceId": "s1",
            "rating": 4,
            "comment": "Great",
            "employeeResponse": "Thank you",
            "createdAt": "2024-01-02T10:00:00Z"
        }"#;
        let review: Review = serde_json::from_str(json).unwrap();
        assert_eq!(review.provider_id, "e1");
        assert_eq!(review.response.as_deref(), Some("Thank you"));
        assert!(review.created_at.is_some());
    }
}
