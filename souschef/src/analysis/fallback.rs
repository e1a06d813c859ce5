//! Deterministic rule-based analysis used whenever no model endpoint is
//! reachable. Routes the query to a topic template by keyword, fills the
//! template with statistics over the retrieved orders, and emits enumerated
//! text in the same shape the model is asked for, so the response parser
//! handles both paths identically.

use crate::models::OrderRecord;

const DISCLOSURE: &str = "---\nNote: this analysis was produced by the built-in rule-based \
analyzer, not an AI model. Start an inference server (for example Ollama on \
http://localhost:11434) and set SOUSCHEF_MODEL_BASE_URL to enable AI-enhanced analysis.";

/// Statistics over the retrieved subset only (not the full dataset).
struct RetrievalStats {
    count: usize,
    completed: usize,
    rejected: usize,
    /// Percentage in [0, 100].
    completion_rate: f64,
    avg_rating: Option<f64>,
    avg_value: f64,
    total_value: f64,
    /// First retrieved order's restaurant, i.e. the closest match.
    top_restaurant: String,
}

impl RetrievalStats {
    fn from_orders(orders: &[OrderRecord]) -> Self {
        let count = orders.len();
        let completed = orders.iter().filter(|o| o.status.is_completed()).count();
        let rejected = orders.iter().filter(|o| o.status.is_rejected()).count();
        let total_value: f64 = orders.iter().map(|o| o.total).sum();

        let ratings: Vec<u8> = orders.iter().filter_map(|o| o.rating).collect();
        let avg_rating = if ratings.is_empty() {
            None
        } else {
            let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
            Some(f64::from(sum) / ratings.len() as f64)
        };

        Self {
            count,
            completed,
            rejected,
            completion_rate: if count == 0 {
                0.0
            } else {
                completed as f64 / count as f64 * 100.0
            },
            avg_rating,
            avg_value: if count == 0 {
                0.0
            } else {
                total_value / count as f64
            },
            total_value,
            top_restaurant: orders
                .first()
                .map(|o| o.restaurant.clone())
                .unwrap_or_else(|| "your top restaurant".to_string()),
        }
    }

    fn avg_rating_text(&self) -> String {
        self.avg_rating
            .map(|r| format!("{r:.1}/5"))
            .unwrap_or_else(|| "unrated".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Ratings,
    Rejections,
    Menu,
    Revenue,
    Demand,
    Operations,
    General,
}

/// Keyword routing in fixed priority order; the first matching topic wins.
fn route_topic(query: &str) -> Topic {
    const TOPICS: &[(Topic, &[&str])] = &[
        (Topic::Ratings, &["rating", "customer", "satisfaction"]),
        (Topic::Rejections, &["rejection", "reject", "fail", "issue"]),
        (Topic::Menu, &["menu", "item", "popular", "dish"]),
        (Topic::Revenue, &["revenue", "profit", "margin", "earning"]),
        (Topic::Demand, &["time", "peak", "demand", "trend"]),
        (
            Topic::Operations,
            &["operation", "improve", "strategy", "efficiency"],
        ),
    ];

    let lower = query.to_lowercase();
    for (topic, keywords) in TOPICS {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return *topic;
        }
    }
    Topic::General
}

/// Produce analysis text for the query from the retrieved orders alone.
/// Deterministic: identical inputs always yield identical output.
pub fn local_analysis(similar_orders: &[OrderRecord], query: &str, operator: &str) -> String {
    let stats = RetrievalStats::from_orders(similar_orders);

    if stats.count == 0 {
        return format!(
            "Hello {operator}. No historical data matches your question \"{query}\" yet, so \
             there is nothing to compare against.\n\n\
             1. Load more order history to improve retrieval coverage.\n\
             Import recent CSV exports so similar orders can be found.\n\
             2. Rephrase the question using terms that appear in your orders.\n\
             Mention restaurants, cities, or dish names from your data.\n\n\
             {DISCLOSURE}"
        );
    }

    let topic = route_topic(query);
    tracing::debug!(?topic, count = stats.count, "Routing query to local analysis template");

    let body = match topic {
        Topic::Ratings => ratings_analysis(&stats),
        Topic::Rejections => rejections_analysis(&stats),
        Topic::Menu => menu_analysis(&stats, similar_orders),
        Topic::Revenue => revenue_analysis(&stats),
        Topic::Demand => demand_analysis(&stats),
        Topic::Operations => operations_analysis(&stats),
        Topic::General => general_analysis(&stats),
    };

    format!(
        "Hello {operator}, here is what the {count} most relevant orders show.\n\n{body}\n\n{DISCLOSURE}",
        count = stats.count,
    )
}

fn ratings_analysis(stats: &RetrievalStats) -> String {
    let tone = match stats.avg_rating {
        Some(r) if r >= 4.0 => "strong: customers are broadly satisfied",
        Some(r) if r >= 3.0 => "middling: satisfaction is inconsistent",
        Some(_) => "weak: customer satisfaction needs urgent attention",
        None => "unknown: these orders carry no ratings",
    };

    format!(
        "Customer satisfaction across these orders averages {rating}, which is {tone}. \
         {completed} of {count} orders completed ({rate:.0}%), and the average order value \
         is {avg:.2}.\n\n\
         1. Follow up with customers who rated below 4 to find recurring quality complaints.\n\
         Read recent low-rating feedback for {top}.\n\
         Fix the two most-cited packaging or temperature problems first.\n\
         2. Reward high-rating customers with targeted repeat-order offers.\n\
         A small discount on their usual menu items keeps satisfied customers ordering.\n\
         3. Track the rating trend weekly instead of reacting to single reviews.",
        rating = stats.avg_rating_text(),
        completed = stats.completed,
        count = stats.count,
        rate = stats.completion_rate,
        avg = stats.avg_value,
        top = stats.top_restaurant,
    )
}

fn rejections_analysis(stats: &RetrievalStats) -> String {
    let health = if stats.completion_rate < 60.0 {
        "well below a healthy benchmark"
    } else {
        "within a workable range, but worth tightening"
    };

    format!(
        "Of the {count} matching orders, {completed} completed and {rejected} were rejected, \
         a completion rate of {rate:.0}%, {health}. Average order value is {avg:.2}, so every \
         rejection costs real revenue.\n\n\
         1. Audit the busiest acceptance windows at {top} for capacity-driven rejections.\n\
         Log the rejection reason for every shift.\n\
         Set a completion-rate target of at least 85%.\n\
         2. Sync menu availability in real time so out-of-stock items stop triggering rejections.\n\
         Disable unavailable dishes the moment stock runs out.\n\
         3. Review operational staffing against the current {rate:.0}% completion rate.\n\
         Add prep capacity before your peak ordering hours.",
        count = stats.count,
        completed = stats.completed,
        rejected = stats.rejected,
        rate = stats.completion_rate,
        avg = stats.avg_value,
        top = stats.top_restaurant,
    )
}

fn menu_analysis(stats: &RetrievalStats, orders: &[OrderRecord]) -> String {
    let with_items = orders.iter().filter(|o| o.items.is_some()).count();

    format!(
        "Menu signal from the {count} closest orders: {with_items} carry item details, led by \
         {top}. Average order value is {avg:.2} with an average rating of {rating}.\n\n\
         1. Promote the menu items that appear most often in completed orders.\n\
         Feature them at the top of the listing.\n\
         2. Bundle slow-moving dishes with the popular items to lift order value above {avg:.2}.\n\
         3. Retire menu items that appear mainly in rejected or low-rated orders.",
        count = stats.count,
        with_items = with_items,
        top = stats.top_restaurant,
        avg = stats.avg_value,
        rating = stats.avg_rating_text(),
    )
}

fn revenue_analysis(stats: &RetrievalStats) -> String {
    let commission = stats.total_value * 0.35;
    let net = stats.total_value * 0.65;

    format!(
        "These {count} orders total {total:.2} in gross revenue, roughly {commission:.2} of \
         which goes to platform commission (35%), leaving about {net:.2} net. Average order \
         value is {avg:.2} at a {rate:.0}% completion rate.\n\n\
         1. Raise average order value past {avg:.2} with add-on prompts at checkout.\n\
         Suggest sides and drinks that pair with the most-ordered mains.\n\
         2. Recover revenue lost to the {rejected} rejected orders before chasing new demand.\n\
         3. Negotiate or offset the 35% commission by pushing direct-order channels for repeat customers.",
        count = stats.count,
        total = stats.total_value,
        commission = commission,
        net = net,
        avg = stats.avg_value,
        rate = stats.completion_rate,
        rejected = stats.rejected,
    )
}

fn demand_analysis(stats: &RetrievalStats) -> String {
    format!(
        "Demand signal from the {count} closest orders: {completed} completed at an average \
         value of {avg:.2}, with {top} the strongest match for this question. Completion \
         rate sits at {rate:.0}%.\n\n\
         1. Map order timestamps to find your true peak demand windows.\n\
         Staff and prep for the two busiest hours instead of spreading thin.\n\
         2. Pre-prepare the highest-volume items before predicted peaks.\n\
         3. Use off-peak promotions to flatten the demand curve and keep the kitchen utilized.",
        count = stats.count,
        completed = stats.completed,
        avg = stats.avg_value,
        top = stats.top_restaurant,
        rate = stats.completion_rate,
    )
}

fn operations_analysis(stats: &RetrievalStats) -> String {
    let focus = if stats.completion_rate < 60.0 {
        "completion rate, which is currently the weakest operational number"
    } else {
        "throughput and consistency, since completion is already acceptable"
    };

    format!(
        "Operationally, these {count} orders complete at {rate:.0}% with an average rating of \
         {rating} and an average value of {avg:.2}. The first lever to pull is {focus}.\n\n\
         1. Standardize prep checklists for the top sellers at {top}.\n\
         Consistent prep times cut both rejections and bad ratings.\n\
         2. Set one weekly operations review against completion rate, rating, and order value.\n\
         3. Automate order-acceptance rules so the kitchen only sees orders it can fulfil.",
        count = stats.count,
        rate = stats.completion_rate,
        rating = stats.avg_rating_text(),
        avg = stats.avg_value,
        top = stats.top_restaurant,
        focus = focus,
    )
}

fn general_analysis(stats: &RetrievalStats) -> String {
    format!(
        "Across the {count} most relevant orders: {completed} completed ({rate:.0}%), average \
         rating {rating}, average order value {avg:.2}, total value {total:.2}. {top} is the \
         closest match to your question.\n\n\
         1. Focus on the completion rate first; it compounds into revenue and ratings.\n\
         2. Compare {top} against your other restaurants on rating and order value.\n\
         3. Re-run this analysis with a more specific question about ratings, rejections, \
         menu, revenue, or demand for a deeper answer.",
        count = stats.count,
        completed = stats.completed,
        rate = stats.completion_rate,
        rating = stats.avg_rating_text(),
        avg = stats.avg_value,
        total = stats.total_value,
        top = stats.top_restaurant,
    )
}
