//! Field registry: which table column comes from which category output.
//!
//! Mirrors the shape of the extraction outputs. Each category's precise pass
//! emits a JSON object with one well-known key (`key_name`) holding either a
//! per-series map or a scalar; per-series entries carry the normalized value
//! under `value_key` and the quoted document text under `supporting_text`.

use serde::{Deserialize, Serialize};

/// Extraction category: one pair of LLM passes per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PreferredShareNames,
    Dates,
    CompanyShares,
    IssuePrice,
    ConversionPrice,
    Dividends,
    LiqPrefOrder,
    LiqPref,
    ParticipationRights,
    ParticipationCap,
}

impl Category {
    /// All categories in extraction order. `PreferredShareNames` must run
    /// first: later categories interpolate its output into their prompts.
    pub const ALL: [Category; 10] = [
        Category::PreferredShareNames,
        Category::Dates,
        Category::CompanyShares,
        Category::IssuePrice,
        Category::ConversionPrice,
        Category::Dividends,
        Category::LiqPrefOrder,
        Category::LiqPref,
        Category::ParticipationRights,
        Category::ParticipationCap,
    ];

    /// Stable label used in storage keys and manifests.
    pub fn label(&self) -> &'static str {
        match self {
            Category::PreferredShareNames => "preferred_share_names",
            Category::Dates => "dates",
            Category::CompanyShares => "company_shares",
            Category::IssuePrice => "issue_price",
            Category::ConversionPrice => "conversion_price",
            Category::Dividends => "dividends",
            Category::LiqPrefOrder => "liq_pref_order",
            Category::LiqPref => "liq_pref",
            Category::ParticipationRights => "participation_rights",
            Category::ParticipationCap => "participation_cap",
        }
    }

    /// Whether this category's prompts take the discovered share-name list.
    pub fn wants_share_names(&self) -> bool {
        !matches!(self, Category::PreferredShareNames | Category::Dates)
    }
}

/// A column in the main per-series table, sourced from a precise output.
pub struct PreciseField {
    /// Column name in the output table.
    pub column: &'static str,
    /// Category whose precise output holds the data.
    pub category: Category,
    /// Top-level JSON key in that output.
    pub key_name: &'static str,
    /// Per-series value key.
    pub value_key: &'static str,
    /// Parse the value as a number (thousands separators tolerated).
    pub numeric: bool,
}

/// Per-series columns of the main table, in output order.
pub const PRECISE_FIELDS: &[PreciseField] = &[
    PreciseField {
        column: "preferred_shares",
        category: Category::CompanyShares,
        key_name: "preferred_shares_per_preferred_stock",
        value_key: "number_of_shares",
        numeric: true,
    },
    PreciseField {
        column: "issue_price",
        category: Category::IssuePrice,
        key_name: "issue_price_per_preferred_stock",
        value_key: "issue_price",
        numeric: true,
    },
    PreciseField {
        column: "conversion_price",
        category: Category::ConversionPrice,
        key_name: "conversion_price_per_preferred_stock",
        value_key: "conversion_price",
        numeric: true,
    },
    PreciseField {
        column: "liq_pref",
        category: Category::LiqPref,
        key_name: "liquidation_preference",
        value_key: "multiple",
        numeric: true,
    },
    PreciseField {
        column: "liq_pref_order",
        category: Category::LiqPrefOrder,
        key_name: "liquidation_preference_order",
        value_key: "rank",
        numeric: true,
    },
    PreciseField {
        column: "participation_rights",
        category: Category::ParticipationRights,
        key_name: "participation_rights",
        value_key: "participation",
        numeric: false,
    },
    PreciseField {
        column: "cap",
        category: Category::ParticipationCap,
        key_name: "participation_cap",
        value_key: "cap",
        numeric: false,
    },
    PreciseField {
        column: "dividend_pct",
        category: Category::Dividends,
        key_name: "dividend_output",
        value_key: "dividend_pct",
        numeric: true,
    },
    PreciseField {
        column: "dividend_per_share",
        category: Category::Dividends,
        key_name: "dividend_output",
        value_key: "dividend_per_share",
        numeric: true,
    },
    PreciseField {
        column: "cumulative",
        category: Category::Dividends,
        key_name: "dividend_output",
        value_key: "dividend_cumulative",
        numeric: false,
    },
];

/// A column in the supporting-text table.
///
/// Categories with per-series JSON align `supporting_text` per series; the
/// rest attach the whole raw extract to every row.
pub struct SupportField {
    pub column: &'static str,
    pub category: Category,
    /// Per-series JSON key, or `None` to use the raw blob.
    pub key_name: Option<&'static str>,
}

/// Supporting-text columns, in output order.
pub const SUPPORT_FIELDS: &[SupportField] = &[
    SupportField {
        column: "preferred_shares",
        category: Category::CompanyShares,
        key_name: Some("preferred_shares_per_preferred_stock"),
    },
    SupportField {
        column: "issue_price",
        category: Category::IssuePrice,
        key_name: Some("issue_price_per_preferred_stock"),
    },
    SupportField {
        column: "conversion_price",
        category: Category::ConversionPrice,
        key_name: Some("conversion_price_per_preferred_stock"),
    },
    SupportField {
        column: "liq_pref",
        category: Category::LiqPref,
        key_name: None,
    },
    SupportField {
        column: "liq_pref_order",
        category: Category::LiqPrefOrder,
        key_name: None,
    },
    SupportField {
        column: "participation_rights",
        category: Category::ParticipationRights,
        key_name: None,
    },
    SupportField {
        column: "cap",
        category: Category::ParticipationCap,
        key_name: None,
    },
    SupportField {
        column: "dividends",
        category: Category::Dividends,
        key_name: None,
    },
];

/// A document-level scalar field (not per-series).
pub struct OtherField {
    pub name: &'static str,
    pub category: Category,
    /// Key of the precise value.
    pub key_name: &'static str,
    /// Supporting-text keys tried in order against the raw output.
    pub supporting_text_keys: &'static [&'static str],
}

/// Document-level fields, in output order.
pub const OTHER_FIELDS: &[OtherField] = &[
    OtherField {
        name: "company_name",
        category: Category::CompanyShares,
        key_name: "company_name",
        supporting_text_keys: &["company_name_supporting_text"],
    },
    OtherField {
        name: "common_shares",
        category: Category::CompanyShares,
        key_name: "common_shares",
        supporting_text_keys: &["common_shares_supporting_text"],
    },
    OtherField {
        name: "incorporation_date",
        category: Category::Dates,
        key_name: "incorporation_date",
        supporting_text_keys: &[
            "incorporation_date_supporting_text",
            "incorporation_supporting_text",
        ],
    },
    OtherField {
        name: "delivery_date",
        category: Category::Dates,
        key_name: "document_delivery_date",
        supporting_text_keys: &["document_delivery_date_supporting_text"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_names_run_first() {
        assert_eq!(Category::ALL[0], Category::PreferredShareNames);
        assert!(!Category::ALL[0].wants_share_names());
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<_> = Category::ALL.iter().map(|c| c.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Category::ALL.len());
    }
}
