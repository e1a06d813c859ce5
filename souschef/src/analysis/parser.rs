//! Turns free-form model (or fallback analyzer) text into structured
//! recommendations. Never fails and never returns an empty list.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Recommendation, RecommendationCategory};

const MAX_ACTION_ITEMS: usize = 5;
const MAX_SENTENCE_FALLBACK: usize = 3;
const ECHO_MAX_CHARS: usize = 120;

fn enumerator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+[.)]|[-*•])\s+").expect("valid enumerator pattern"))
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,3})\s*%").expect("valid percent pattern"))
}

/// True when a (trimmed) line starts an enumerated recommendation.
pub(crate) fn is_enumerated(line: &str) -> bool {
    enumerator_re().is_match(line)
}

fn is_horizontal_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-' || c == '=' || c == '*')
}

/// Parse response text into ordered recommendations.
///
/// Enumerated lines (`1.`, `2)`, `-`, `*`, `•`) start a recommendation; the
/// plain lines below each become its action items. Text with no enumeration
/// is split on sentence boundaries instead, and empty input yields a single
/// default recommendation, so callers always get at least one entry.
pub fn parse_recommendations(text: &str) -> Vec<Recommendation> {
    if text.trim().is_empty() {
        return vec![default_recommendation(text)];
    }

    let mut recommendations: Vec<Recommendation> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_horizontal_rule(trimmed) {
            // Before the first enumerator a rule is just a separator; after
            // it, the rule ends the recommendation block and anything below
            // is a footer, not an action item.
            if recommendations.is_empty() {
                continue;
            }
            break;
        }

        if let Some(found) = enumerator_re().find(trimmed) {
            let insight = trimmed[found.end()..].trim().to_string();
            if insight.is_empty() {
                continue;
            }
            recommendations.push(Recommendation {
                category: RecommendationCategory::infer(&insight),
                insight,
                action_items: Vec::new(),
                confidence: 0.0,
            });
        } else if let Some(current) = recommendations.last_mut() {
            if current.action_items.len() < MAX_ACTION_ITEMS {
                current.action_items.push(trimmed.to_string());
            }
        }
        // Prose before the first enumerator is the summary, not an action item.
    }

    if recommendations.is_empty() {
        return sentence_fallback(text);
    }

    for recommendation in &mut recommendations {
        recommendation.confidence =
            confidence_for(&recommendation.insight, recommendation.action_items.len());
    }

    recommendations
}

/// Deterministic confidence heuristic: an explicit percentage in the insight
/// wins (clamped to 0.99); otherwise score by how much concrete signal the
/// recommendation carries. Display-only.
fn confidence_for(insight: &str, action_items: usize) -> f32 {
    if let Some(caps) = percent_re().captures(insight) {
        if let Ok(percent) = caps[1].parse::<f32>() {
            return (percent / 100.0).clamp(0.0, 0.99);
        }
    }

    let cited_figures = insight.chars().filter(|c| c.is_ascii_digit()).count().min(4) as f32;
    let base = 0.6 + 0.05 * action_items.min(3) as f32 + 0.02 * cited_figures;
    base.min(0.9)
}

fn sentence_fallback(text: &str) -> Vec<Recommendation> {
    let recommendations: Vec<Recommendation> = text
        .split_terminator(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take(MAX_SENTENCE_FALLBACK)
        .map(|sentence| Recommendation {
            category: RecommendationCategory::infer(sentence),
            insight: sentence.to_string(),
            action_items: vec!["Review the full analysis text for details.".to_string()],
            confidence: confidence_for(sentence, 1),
        })
        .collect();

    if recommendations.is_empty() {
        vec![default_recommendation(text)]
    } else {
        recommendations
    }
}

fn default_recommendation(text: &str) -> Recommendation {
    let echo: String = text.trim().chars().take(ECHO_MAX_CHARS).collect();
    Recommendation {
        category: RecommendationCategory::General,
        insight: format!("General analysis: {echo}"),
        action_items: vec![
            "Re-run the analysis once order data or a model endpoint is available.".to_string(),
        ],
        confidence: 0.5,
    }
}
