use crate::models::OrderRecord;

/// Canonical one-line summary used to embed an order. Field order and
/// placeholder values are stable, so identical orders always produce the
/// same summary (and, with the hash embedder, the same vector).
pub fn order_summary(order: &OrderRecord) -> String {
    let items = order.items.as_deref().unwrap_or("unknown");
    let rating = order
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unrated".to_string());
    let city = order.city.as_deref().unwrap_or("unknown");

    format!(
        "Order {} from {}: amount {:.2}, status {}, items {}, rating {}, city {}",
        order.id, order.restaurant, order.total, order.status, items, rating, city
    )
}

/// Cosine similarity of two vectors, defined as 0 when either magnitude is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample_order() -> OrderRecord {
        OrderRecord {
            id: "ORD-001".to_string(),
            restaurant: "Tandoori Nights".to_string(),
            placed_at: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            status: OrderStatus::Completed,
            total: 450.5,
            rating: Some(4),
            items: Some("2 x Butter Chicken, 1 x Naan".to_string()),
            city: Some("Pune".to_string()),
        }
    }

    #[test]
    fn test_summary_is_stable() {
        let order = sample_order();
        assert_eq!(order_summary(&order), order_summary(&order));
        assert_eq!(
            order_summary(&order),
            "Order ORD-001 from Tandoori Nights: amount 450.50, status Completed, \
             items 2 x Butter Chicken, 1 x Naan, rating 4, city Pune"
        );
    }

    #[test]
    fn test_summary_uses_placeholders_for_missing_fields() {
        let mut order = sample_order();
        order.rating = None;
        order.items = None;
        order.city = None;

        let summary = order_summary(&order);
        assert!(summary.contains("items unknown"));
        assert!(summary.contains("rating unrated"));
        assert!(summary.contains("city unknown"));
    }

    #[test]
    fn test_cosine_self_similarity_is_one() {
        let v = vec![0.3, -0.5, 0.8, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let v = vec![0.3, -0.5, 0.8];
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
