//! Records exchanged with the remote scraping service.
//!
//! Every optional field the server may omit is `Option` or defaulted so that
//! sparse payloads decode cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ValidationError;

/// Identity of a scrape job: the service addresses jobs by keyword and
/// location, never by a server-issued id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchKey {
    pub keyword: String,
    pub location: String,
}

impl SearchKey {
    /// Validates raw user input and trims it into a key.
    pub fn parse(keyword: &str, location: &str) -> Result<Self, ValidationError> {
        let keyword = keyword.trim();
        let location = location.trim();
        if keyword.is_empty() {
            return Err(ValidationError::MissingKeyword);
        }
        if location.is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        Ok(Self {
            keyword: keyword.to_string(),
            location: location.to_string(),
        })
    }

    /// Loose comparison used when the server echoes the key back, since it
    /// may normalise case or whitespace.
    pub fn matches(&self, keyword: &str, location: &str) -> bool {
        self.keyword.eq_ignore_ascii_case(keyword.trim())
            && self.location.eq_ignore_ascii_case(location.trim())
    }
}

impl std::fmt::Display for SearchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} in {:?}", self.keyword, self.location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
}

impl Progress {
    /// Clamps `processed` so it never exceeds `total`.
    pub fn normalized(self) -> Self {
        Self {
            processed: self.processed.min(self.total),
            total: self.total,
        }
    }

    /// Completion rounded to the nearest whole percent; 0 while the total is unknown.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let processed = u128::from(self.processed.min(self.total));
        let total = u128::from(self.total);
        ((processed * 100 + total / 2) / total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.processed >= self.total
    }
}

/// Status string some deployments include in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteJobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// One answer from the start-job or status endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub total_found: u64,
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_scraped: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<RemoteJobStatus>,
}

/// A single scraped business listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BusinessRecord")]
pub struct Business {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: Option<u64>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Wire form of [`Business`]. Records may carry `_id`, `id`, or both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusinessRecord {
    #[serde(rename = "_id", default)]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    total_reviews: Option<u64>,
    #[serde(default)]
    category: Option<String>,
}

impl TryFrom<BusinessRecord> for Business {
    type Error = String;

    fn try_from(record: BusinessRecord) -> Result<Self, Self::Error> {
        let id = record
            .object_id
            .or(record.id)
            .ok_or_else(|| format!("business {:?} has no _id", record.name))?;
        Ok(Self {
            id,
            name: record.name,
            address: record.address,
            phone: record.phone,
            website: record.website,
            rating: record.rating,
            total_reviews: record.total_reviews,
            category: record.category,
        })
    }
}

impl Business {
    /// True only for an absolute `http`/`https` URL.
    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(is_web_url)
    }
}

fn is_web_url(raw: &str) -> bool {
    match url::Url::parse(raw.trim()) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            total: 0,
            pages: 0,
        }
    }
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// A page of the global listing as returned by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BusinessPage {
    pub items: Vec<Business>,
    pub pagination: Pagination,
}

/// Parameters for one page request of the global listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: Option<SearchKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Search,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteFilter {
    With,
    Without,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub export_type: ExportType,
    #[serde(rename = "hasWebsite", skip_serializing_if = "Option::is_none")]
    pub has_website: Option<WebsiteFilter>,
}

impl ExportRequest {
    /// Export of the current search, optionally split on website presence.
    pub fn search(key: &SearchKey, has_website: Option<WebsiteFilter>) -> Self {
        Self {
            keyword: Some(key.keyword.clone()),
            location: Some(key.location.clone()),
            export_type: ExportType::Search,
            has_website,
        }
    }

    /// Export of every stored record.
    pub fn all() -> Self {
        Self {
            keyword: None,
            location: None,
            export_type: ExportType::All,
            has_website: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.export_type == ExportType::Search {
            let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
            if !present(&self.keyword) || !present(&self.location) {
                return Err(ValidationError::SearchExportWithoutKey);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub file_name: String,
    pub file_path: String,
    #[serde(default)]
    pub total_records: u64,
}

/// One entry of the server's record of past searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub total_found: Option<u64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_scraped: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 strings, null, or anything else (treated as absent).
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business_with_site(site: Option<&str>) -> Business {
        Business {
            id: "b1".into(),
            website: site.map(str::to_string),
            ..Business::default()
        }
    }

    #[test]
    fn website_predicate_requires_absolute_http_url() {
        assert!(business_with_site(Some("https://cafe.example.com")).has_website());
        assert!(business_with_site(Some("HTTP://cafe.example.com/menu")).has_website());
        assert!(!business_with_site(Some("cafe.example.com")).has_website());
        assert!(!business_with_site(Some("ftp://cafe.example.com")).has_website());
        assert!(!business_with_site(Some("")).has_website());
        assert!(!business_with_site(None).has_website());
    }

    #[test]
    fn business_accepts_either_or_both_id_keys() {
        let both: Business =
            serde_json::from_str(r#"{"_id":"abc","id":"abc","name":"Bean","address":"1 Main"}"#)
                .unwrap();
        assert_eq!(both.id, "abc");
        assert_eq!(both.name, "Bean");

        let virtual_only: Business = serde_json::from_str(r#"{"id":"v1"}"#).unwrap();
        assert_eq!(virtual_only.id, "v1");

        let encoded = serde_json::to_value(&both).unwrap();
        assert_eq!(encoded["_id"], "abc");

        assert!(serde_json::from_str::<Business>(r#"{"name":"Nameless"}"#).is_err());
    }

    #[test]
    fn percent_rounds_and_handles_unknown_total() {
        assert_eq!(Progress { processed: 5, total: 12 }.percent(), 42);
        assert_eq!(
            Progress {
                processed: u64::MAX / 2,
                total: u64::MAX
            }
            .percent(),
            50
        );
        assert_eq!(Progress { processed: 1, total: 8 }.percent(), 13);
        assert_eq!(Progress { processed: 3, total: 0 }.percent(), 0);
        assert_eq!(Progress { processed: 20, total: 10 }.percent(), 100);
    }

    #[test]
    fn search_key_trims_and_rejects_blank_input() {
        let key = SearchKey::parse("  coffee shop ", "Austin").unwrap();
        assert_eq!(key.keyword, "coffee shop");
        assert_eq!(SearchKey::parse(" ", "Austin"), Err(ValidationError::MissingKeyword));
        assert_eq!(SearchKey::parse("coffee", ""), Err(ValidationError::MissingLocation));
    }

    #[test]
    fn sparse_business_and_snapshot_decode() {
        let business: Business =
            serde_json::from_str(r#"{"_id":"abc","name":"Bean","address":"1 Main"}"#).unwrap();
        assert_eq!(business.id, "abc");
        assert_eq!(business.rating, None);

        let snapshot: JobSnapshot = serde_json::from_str(
            r#"{"keyword":"coffee","location":"Austin","totalFound":3,"lastScraped":"not a date"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.total_found, 3);
        assert_eq!(snapshot.progress, None);
        assert_eq!(snapshot.last_scraped, None);
    }

    #[test]
    fn export_request_serializes_wire_names() {
        let key = SearchKey::parse("coffee", "Austin").unwrap();
        let json = serde_json::to_value(ExportRequest::search(&key, Some(WebsiteFilter::With)))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "keyword": "coffee",
                "location": "Austin",
                "exportType": "search",
                "hasWebsite": "with"
            })
        );
        let all = serde_json::to_value(ExportRequest::all()).unwrap();
        assert_eq!(all, serde_json::json!({ "exportType": "all" }));
    }
}
