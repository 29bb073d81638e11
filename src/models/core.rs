// src/models/core.rs
// Wire shapes for the company register and the ranked candidates built from
// them. Register responses are canonicalized here (optional fields, snippet
// fallback) so the scoring logic never sees the raw API quirks.

use serde::{Deserialize, Serialize};

/// Structured address parts returned by the register search API when no flat
/// snippet is present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterAddress {
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

/// A single raw hit from the register search endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterSearchItem {
    pub company_number: Option<String>,
    pub title: Option<String>,
    pub company_status: Option<String>,
    pub address_snippet: Option<String>,
    pub address: Option<RegisterAddress>,
    #[serde(default)]
    pub sic_codes: Vec<String>,
}

impl RegisterSearchItem {
    /// Flat address text: the snippet when present, otherwise the structured
    /// parts joined with ", ".
    pub fn address_text(&self) -> String {
        if let Some(snippet) = &self.address_snippet {
            if !snippet.is_empty() {
                return snippet.clone();
            }
        }

        let Some(address) = &self.address else {
            return String::new();
        };

        let parts: Vec<&str> = [
            address.address_line_1.as_deref(),
            address.address_line_2.as_deref(),
            address.locality.as_deref(),
            address.region.as_deref(),
            address.postal_code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterSearchResponse {
    #[serde(default)]
    pub items: Vec<RegisterSearchItem>,
}

/// Company profile returned by the register for a known identifier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterProfile {
    pub company_number: Option<String>,
    pub company_status: Option<String>,
    #[serde(default)]
    pub sic_codes: Vec<String>,
}

/// Agency/employer classification derived from industrial classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgClassification {
    Employer,
    Agency,
    Unknown,
}

/// A ranked register candidate for an employer name query. Request-scoped,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerCandidate {
    pub company_number: String,
    pub title: String,
    pub status: String,
    pub address_snippet: String,
    pub sic_codes: Vec<String>,
    pub score: f64,
    pub reasons: Vec<String>,
    pub org_classification: OrgClassification,
    pub classification_reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_text_prefers_snippet() {
        let item = RegisterSearchItem {
            address_snippet: Some("1 Main St, Leeds".to_string()),
            address: Some(RegisterAddress {
                locality: Some("Sheffield".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(item.address_text(), "1 Main St, Leeds");
    }

    #[test]
    fn test_address_text_joins_structured_parts() {
        let item = RegisterSearchItem {
            address: Some(RegisterAddress {
                address_line_1: Some("1 Main St".to_string()),
                locality: Some("Leeds".to_string()),
                postal_code: Some("LS1 1AA".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(item.address_text(), "1 Main St, Leeds, LS1 1AA");
    }

    #[test]
    fn test_address_text_empty_when_nothing_present() {
        assert_eq!(RegisterSearchItem::default().address_text(), "");
    }
}
