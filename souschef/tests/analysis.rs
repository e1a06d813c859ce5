//! End-to-end pipeline tests: knowledge base build, retrieval, gateway
//! fallback, and recommendation parsing.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use souschef::analysis::{local_analysis, parse_recommendations};
use souschef::config::{Config, EmbeddingsConfig, ModelConfig};
use souschef::{DecisionEngine, OrderRecord, OrderStatus, SousChefError};

const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9";

fn test_config() -> Config {
    Config {
        embeddings: EmbeddingsConfig {
            strategy: "hash".to_string(),
            dimensions: 64,
        },
        model: ModelConfig {
            model: "llama3".to_string(),
            base_url: UNREACHABLE_BASE_URL.to_string(),
            timeout_secs: 5,
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 512,
        },
    }
}

fn order(i: usize, status: OrderStatus, rating: Option<u8>) -> OrderRecord {
    OrderRecord {
        id: format!("ORD-{i:03}"),
        restaurant: if i % 2 == 0 {
            "Tandoori Nights".to_string()
        } else {
            "Dragon Wok".to_string()
        },
        placed_at: Utc
            .timestamp_millis_opt(1_700_000_000_000 + i as i64 * 3_600_000)
            .unwrap(),
        status,
        total: 200.0 + i as f64 * 25.0,
        rating,
        items: Some("1 x House Special".to_string()),
        city: Some("Pune".to_string()),
    }
}

/// 10 orders: 6 completed, 4 rejected; 5 rated with an average of 4.2.
fn synthetic_orders() -> Vec<OrderRecord> {
    let ratings = [Some(4), Some(4), Some(4), Some(4), Some(5)];
    let mut orders: Vec<OrderRecord> = (0..6)
        .map(|i| order(i, OrderStatus::Completed, ratings.get(i).copied().flatten()))
        .collect();
    orders.extend((6..10).map(|i| order(i, OrderStatus::Rejected, None)));
    orders
}

async fn built_engine(orders: &[OrderRecord]) -> DecisionEngine {
    let mut engine = DecisionEngine::new(&test_config()).unwrap();
    engine.build_knowledge_base(orders).await;
    engine
}

#[tokio::test]
async fn test_empty_order_store_is_a_precondition_failure() {
    let engine = DecisionEngine::new(&test_config()).unwrap();
    let error = engine
        .analyze("anything", &[], "Asha", UNREACHABLE_BASE_URL)
        .await
        .unwrap_err();
    assert!(matches!(error, SousChefError::EmptyOrderStore));
}

#[tokio::test]
async fn test_build_then_stats_counts_every_order() {
    let orders = synthetic_orders();
    let engine = built_engine(&orders).await;

    let stats = engine.stats();
    assert!(stats.ready);
    assert_eq!(stats.embeddings_count, 10);
}

#[tokio::test]
async fn test_unreachable_gateway_falls_back_to_rejection_analysis() {
    let orders = synthetic_orders();
    let engine = built_engine(&orders).await;
    let query = "How can I reduce rejection rate?";

    let analysis = engine
        .analyze(query, &orders, "Asha", UNREACHABLE_BASE_URL)
        .await
        .unwrap();

    assert!(!analysis.ai_generated);
    assert!(!analysis.recommendations.is_empty());
    assert!(analysis.similar_orders.len() <= 3);
    assert_eq!(analysis.query, query);

    // The executive summary must report the completion percentage of the
    // retrieved subset, not the full dataset.
    let similar = engine.retrieve_similar_orders(query, 5).await;
    let completed = similar.iter().filter(|o| o.status.is_completed()).count();
    let expected_rate = format!("{:.0}%", completed as f64 / similar.len() as f64 * 100.0);

    assert!(
        analysis.executive_summary.contains(&expected_rate),
        "summary '{}' should contain '{}'",
        analysis.executive_summary,
        expected_rate
    );
    assert!(analysis.executive_summary.contains("completion rate"));
    assert!(analysis.executive_summary.contains("rejected"));
}

#[tokio::test]
async fn test_fallback_output_matches_local_analyzer_exactly() {
    let orders = synthetic_orders();
    let engine = built_engine(&orders).await;
    let query = "How can I reduce rejection rate?";

    let analysis = engine
        .analyze(query, &orders, "Asha", UNREACHABLE_BASE_URL)
        .await
        .unwrap();

    let similar = engine.retrieve_similar_orders(query, 5).await;
    let expected_text = local_analysis(&similar, query, "Asha");
    assert_eq!(
        analysis.recommendations,
        parse_recommendations(&expected_text)
    );
}

#[tokio::test]
async fn test_reachable_gateway_produces_ai_generated_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Your revenue picture is stable.\n\n1. Expand the menu with two seasonal dishes\nPilot them on weekends\n2. Reward repeat customers with credits"
        })))
        .mount(&server)
        .await;

    let orders = synthetic_orders();
    let engine = built_engine(&orders).await;

    let analysis = engine
        .analyze("How do I grow?", &orders, "Asha", &server.uri())
        .await
        .unwrap();

    assert!(analysis.ai_generated);
    assert_eq!(analysis.executive_summary, "Your revenue picture is stable.");
    assert_eq!(analysis.recommendations.len(), 2);
    assert_eq!(
        analysis.recommendations[0].action_items,
        vec!["Pilot them on weekends".to_string()]
    );
}

#[tokio::test]
async fn test_retrieval_is_capped_and_ordered() {
    let orders = synthetic_orders();
    let engine = built_engine(&orders).await;

    let top3 = engine.retrieve_similar_orders("rejected orders", 3).await;
    let top5 = engine.retrieve_similar_orders("rejected orders", 5).await;

    assert_eq!(top3.len(), 3);
    assert_eq!(top5.len(), 5);
    // A smaller k must be a prefix of a larger k for the same query.
    assert_eq!(top3, top5[..3].to_vec());
}

#[tokio::test]
async fn test_reset_requires_rebuild_before_retrieval() {
    let orders = synthetic_orders();
    let mut engine = built_engine(&orders).await;

    engine.reset();
    assert!(!engine.stats().ready);
    assert!(engine
        .retrieve_similar_orders("anything", 5)
        .await
        .is_empty());
}
