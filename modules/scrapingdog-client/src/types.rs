use serde::{Deserialize, Deserializer, Serialize};

/// Query parameters for `GET /serp`.
#[derive(Debug, Clone, Serialize)]
pub struct SerpParams<'a> {
    pub api_key: &'a str,
    pub q: &'a str,
    /// Two-letter country code the results are localized for.
    pub gl: &'a str,
}

/// The subset of a Scrapingdog SERP payload we read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpResponse {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub organic_results: Vec<OrganicResult>,
}

/// One organic (unpaid) result, in rank order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub link: Option<String>,
}

/// A non-array `organic_results` reads as empty. Entries that fail to parse
/// are kept as blanks so positions of the remaining entries don't shift.
fn list_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<OrganicResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}
