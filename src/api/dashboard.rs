use crate::transport::{ApiRequest, Transport};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_PERIOD: &str = "monthly";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    #[serde(deserialize_with = "text_or_number")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl StatCard {
    fn zero(title: &str, icon: &str, color: &str) -> Self {
        Self {
            title: title.to_string(),
            value: "0".to_string(),
            icon: Some(icon.to_string()),
            color: Some(color.to_string()),
        }
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub stats: Vec<StatCard>,
    /// Chart series and anything else the server sends, passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardSummary {
    /// Placeholder shown when the summary cannot be loaded.
    pub fn fallback() -> Self {
        Self {
            stats: vec![
                StatCard::zero("Total Leads", "👥", "#e0e7ff"),
                StatCard::zero("Active Deals", "💼", "#d1fae5"),
                StatCard::zero("Closed Deals", "🎒", "#fee2e2"),
                StatCard::zero("Monthly Revenue", "💰", "#fde68a"),
            ],
            extra: Map::new(),
        }
    }
}

#[derive(Clone)]
pub struct DashboardApi {
    transport: Arc<dyn Transport>,
}

impl DashboardApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Never fails: any transport or decode problem degrades to
    /// [`DashboardSummary::fallback`].
    pub async fn summary(&self, period: &str) -> DashboardSummary {
        let period = if period.trim().is_empty() {
            DEFAULT_PERIOD
        } else {
            period.trim()
        };
        let request = ApiRequest::get("/dashboard/").query("period", period);

        match self.transport.send(request).await {
            Ok(response) => response.decode().unwrap_or_else(|err| {
                warn!(error = %err, "Dashboard payload unreadable; using fallback");
                DashboardSummary::fallback()
            }),
            Err(err) => {
                warn!(error = %err, period, "Dashboard request failed; using fallback");
                DashboardSummary::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_zero_valued() {
        let summary = DashboardSummary::fallback();
        let titles = summary
            .stats
            .iter()
            .map(|card| card.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            vec!["Total Leads", "Active Deals", "Closed Deals", "Monthly Revenue"]
        );
        assert!(summary.stats.iter().all(|card| card.value == "0"));
    }

    #[test]
    fn test_numeric_values_are_read_as_text() {
        let summary: DashboardSummary = serde_json::from_value(serde_json::json!({
            "stats": [{"title": "Total Leads", "value": 42}],
            "chart": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(summary.stats[0].value, "42");
        assert!(summary.extra.contains_key("chart"));
    }
}
