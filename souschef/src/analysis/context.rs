use crate::models::OrderRecord;

/// Platform commission applied to gross revenue in the estimate block.
const COMMISSION_RATE: f64 = 0.35;

/// Cap on similar-order lines; together with O(1)-size aggregates this keeps
/// the prompt bounded regardless of dataset size.
const MAX_SIMILAR_LINES: usize = 5;

/// Assemble the bounded prompt sent to the model gateway: dataset-wide
/// aggregates, the retrieved orders (most similar first), and the requested
/// response shape. Pure function.
pub fn assemble_context(
    all_orders: &[OrderRecord],
    similar_orders: &[OrderRecord],
    query: &str,
) -> String {
    let total_revenue: f64 = all_orders.iter().map(|o| o.total).sum();
    let completed = all_orders.iter().filter(|o| o.status.is_completed()).count();
    let rejected = all_orders.iter().filter(|o| o.status.is_rejected()).count();
    let commission = total_revenue * COMMISSION_RATE;
    let net = total_revenue * (1.0 - COMMISSION_RATE);

    let ratings: Vec<u8> = all_orders.iter().filter_map(|o| o.rating).collect();
    let avg_rating = if ratings.is_empty() {
        "N/A".to_string()
    } else {
        let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
        format!("{:.1}", f64::from(sum) / ratings.len() as f64)
    };

    let mut similar_block = String::new();
    for order in similar_orders.iter().take(MAX_SIMILAR_LINES) {
        let rating = order
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unrated".to_string());
        similar_block.push_str(&format!(
            "- {}: {:.2}, {}, rating {}, items {}, city {}\n",
            order.restaurant,
            order.total,
            order.status,
            rating,
            order.items.as_deref().unwrap_or("unknown"),
            order.city.as_deref().unwrap_or("unknown"),
        ));
    }
    if similar_block.is_empty() {
        similar_block.push_str("(no similar historical orders found)\n");
    }

    format!(
        "Operator question: {query}\n\n\
         Full dataset:\n\
         - Orders: {count}\n\
         - Total revenue: {total_revenue:.2}\n\
         - Average rating: {avg_rating}\n\
         - Completed orders: {completed}\n\
         - Rejected orders: {rejected}\n\
         - Estimated platform commission (35%): {commission:.2}\n\
         - Estimated net revenue (65%): {net:.2}\n\n\
         Most similar historical orders:\n\
         {similar_block}\n\
         Respond with data-driven insights grounded in the numbers above, then 2-5 ranked \
         recommendations as a numbered list (most impactful first, concrete action steps on \
         the lines below each), and a short risk note if relevant.",
        count = all_orders.len(),
    )
}
