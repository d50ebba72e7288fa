//! End-to-end pipeline test: two-pass extraction over a scripted model,
//! then alignment-driven table assembly.
//!
//! The scripted completions deliberately spell series names differently per
//! category ("Series A", "Series A Preferred Stock", "Series B-1 Preferred")
//! so the join exercises canonicalization, not string equality.

use coi_reader::{
    build_tables, write_main_csv, write_support_csv, CellValue, CoiExtractor, MemoryStore,
    DocumentStore, NOT_FOUND,
};
use llm_client::MockChatModel;

const DOCUMENT: &str = "CERTIFICATE OF INCORPORATION OF ACME, INC. \
    The Corporation is authorized to issue Series A Preferred Stock, \
    Series B-1 Preferred Stock and Seed Preferred Stock.";

/// Scripted completions in call order: (raw, precise) per category, in
/// `Category::ALL` order.
fn scripted_model() -> MockChatModel {
    let responses = [
        // preferred_share_names
        "\"The Corporation is authorized to issue Series A Preferred Stock, \
         Series B-1 Preferred Stock and Seed Preferred Stock.\"",
        r#"{"preferred_share_names": ["Series A", "Series B-1", "Seed Preferred Stock"]}"#,
        // dates
        "\"This Certificate was delivered on October 28, 2024. The Corporation \
         was incorporated on January 15, 2020.\"",
        r#"{"incorporation_date": "2020-01-15",
            "incorporation_date_supporting_text": "incorporated on January 15, 2020",
            "document_delivery_date": "2024-10-28",
            "document_delivery_date_supporting_text": "delivered on October 28, 2024"}"#,
        // company_shares
        "\"Acme, Inc. is authorized to issue 10,000,000 shares of Common Stock, \
         1,000,000 shares of Series A and 500,000 shares of Series B-1.\"",
        r#"{"company_name": "Acme, Inc.",
            "company_name_supporting_text": "Acme, Inc. is authorized",
            "common_shares": "10,000,000",
            "common_shares_supporting_text": "10,000,000 shares of Common Stock",
            "preferred_shares_per_preferred_stock": {
              "Series A Preferred Stock": {"number_of_shares": "1,000,000", "supporting_text": "1,000,000 shares of Series A"},
              "Series B-1 Preferred Stock": {"number_of_shares": "500,000", "supporting_text": "500,000 shares of Series B-1"}}}"#,
        // issue_price
        "\"The Original Issue Price is $1.00 for Series A, $2.50 for Series B-1 \
         and $0.50 for the Seed Preferred.\"",
        r#"{"issue_price_per_preferred_stock": {
              "Series A": {"issue_price": 1.0, "supporting_text": "$1.00 for Series A"},
              "Series B-1 Preferred": {"issue_price": 2.5, "supporting_text": "$2.50 for Series B-1"},
              "Seed Preferred Stock": {"issue_price": 0.5, "supporting_text": "$0.50 for the Seed Preferred"}}}"#,
        // conversion_price
        "\"Conversion prices follow the issue prices, save for Series B-1 at $1.25.\"",
        r#"{"conversion_price_per_preferred_stock": {
              "Series A": {"conversion_price": 1.0, "supporting_text": "conversion at $1.00"},
              "Series B-1": {"conversion_price": 1.25, "supporting_text": "Series B-1 at $1.25"},
              "Seed": {"conversion_price": 0.5, "supporting_text": "conversion at $0.50"}}}"#,
        // dividends
        "\"Series A accrues cumulative dividends at 8% of the Original Issue \
         Price; Series B-1 carries $0.20 per share when declared.\"",
        r#"{"dividend_output": {
              "Series A": {"dividend_pct": 0.08, "dividend_per_share": 0, "dividend_cumulative": "yes", "supporting_text": "8% cumulative"},
              "Series B-1": {"dividend_pct": 0, "dividend_per_share": 0.2, "dividend_cumulative": "no", "supporting_text": "$0.20 per share"},
              "Seed": {"dividend_pct": 0, "dividend_per_share": 0, "dividend_cumulative": "no", "supporting_text": "none stated"}}}"#,
        // liq_pref_order
        "\"Series B-1 ranks senior to Series A, which ranks senior to Seed.\"",
        r#"{"liquidation_preference_order": {
              "Series B-1": {"rank": 1, "supporting_text": "ranks senior"},
              "Series A": {"rank": 2, "supporting_text": "ranks senior to Seed"},
              "Seed": {"rank": 3, "supporting_text": "junior"}}}"#,
        // liq_pref
        "\"Each series carries 1x, except Series B-1 at 1.5x.\"",
        r#"{"liquidation_preference": {
              "Series A": {"multiple": 1.0, "supporting_text": "1x"},
              "Series B-1": {"multiple": 1.5, "supporting_text": "1.5x"},
              "Seed": {"multiple": 1.0, "supporting_text": "1x"}}}"#,
        // participation_rights
        "\"All preferred is non-participating.\"",
        r#"{"participation_rights": {
              "Series A": {"participation": "non-participating", "supporting_text": "non-participating"},
              "Series B-1": {"participation": "non-participating", "supporting_text": "non-participating"},
              "Seed": {"participation": "non-participating", "supporting_text": "non-participating"}}}"#,
        // participation_cap
        "\"Series B-1 participation is capped at 2x.\"",
        r#"{"participation_cap": {
              "Series B-1": {"cap": "2x", "supporting_text": "capped at 2x"}}}"#,
    ];

    responses
        .into_iter()
        .fold(MockChatModel::new(), |mock, r| mock.with_scripted(r))
}

#[tokio::test]
async fn test_full_pipeline() {
    let store = MemoryStore::new();
    store
        .put("inbox/acme 2024-10-28 COI.txt", DOCUMENT)
        .await
        .unwrap();

    let model = scripted_model();
    let extractor = CoiExtractor::new(&model, &store);
    let manifest = extractor
        .run_extraction("inbox/acme 2024-10-28 COI.txt")
        .await
        .unwrap();

    assert_eq!(
        manifest.preferred_share_names,
        vec!["Series A", "Series B-1", "Seed Preferred Stock"]
    );
    assert_eq!(manifest.categories.len(), 10);

    // The manifest is itself persisted.
    let manifest_json = store
        .get("outputs/config_json/acme 2024-10-28 COI/mock/config.json")
        .await
        .unwrap();
    assert!(manifest_json.is_some());

    let tables = build_tables(&store, &manifest).await.unwrap();

    // Rows sorted by share name.
    let names: Vec<_> = tables.rows.iter().map(|r| r.share_name.as_str()).collect();
    assert_eq!(names, vec!["Seed Preferred Stock", "Series A", "Series B-1"]);

    let series_a = &tables.rows[1];
    assert_eq!(series_a.get("preferred_shares").as_number(), Some(1_000_000.0));
    assert_eq!(series_a.get("issue_price").as_number(), Some(1.0));
    assert_eq!(series_a.get("invested").as_number(), Some(1_000_000.0));
    assert_eq!(series_a.get("conversion_ratio").as_number(), Some(1.0));
    // Per-share dividend derived from the stated rate.
    assert_eq!(series_a.get("dividend_pct").as_number(), Some(0.08));
    assert_eq!(series_a.get("dividend_per_share").as_number(), Some(0.08));
    assert_eq!(series_a.get("cumulative").render(), "yes");

    let series_b1 = &tables.rows[2];
    // Rate derived from the stated per-share amount.
    assert_eq!(series_b1.get("dividend_pct").as_number(), Some(0.08));
    assert_eq!(series_b1.get("dividend_per_share").as_number(), Some(0.2));
    assert_eq!(series_b1.get("conversion_ratio").as_number(), Some(2.0));
    assert_eq!(series_b1.get("invested").as_number(), Some(1_250_000.0));
    assert_eq!(series_b1.get("liq_pref_order").as_number(), Some(1.0));
    assert_eq!(series_b1.get("cap").render(), "2x");

    let seed = &tables.rows[0];
    // Seed was absent from company_shares: cells stay missing, never a row drop.
    assert_eq!(*seed.get("preferred_shares"), CellValue::Missing);
    assert_eq!(*seed.get("invested"), CellValue::Missing);
    assert_eq!(seed.get("issue_price").as_number(), Some(0.5));

    // Supporting text aligns per series where quoted, sentinel otherwise.
    let seed_support = &tables.support[0];
    assert_eq!(seed_support.values["preferred_shares"], NOT_FOUND);
    assert_eq!(
        tables.support[1].values["issue_price"],
        "$1.00 for Series A"
    );

    // Document-level fields.
    assert_eq!(tables.other["company_name"].value, "Acme, Inc.");
    assert_eq!(tables.other["incorporation_date"].value, "2020-01-15");

    // CSV output parses back with one record per series.
    let main_csv = write_main_csv(&tables).unwrap();
    let mut reader = csv::Reader::from_reader(main_csv.as_slice());
    assert_eq!(reader.records().count(), 3);

    let support_csv = write_support_csv(&tables).unwrap();
    assert!(String::from_utf8(support_csv).unwrap().contains(NOT_FOUND));
}

#[tokio::test]
async fn test_missing_document_is_typed_error() {
    let store = MemoryStore::new();
    let model = MockChatModel::new();
    let extractor = CoiExtractor::new(&model, &store);

    let err = extractor.run_extraction("inbox/missing.txt").await.unwrap_err();
    assert!(matches!(err, coi_reader::CoiError::DocumentNotFound { .. }));
}
