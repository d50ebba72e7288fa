//! Extraction prompts, one pair per category.
//!
//! The raw pass quotes the document verbatim so a reviewer can check the
//! precise pass against it; the precise pass normalizes the raw quotes into a
//! JSON object with the key the [`crate::fields`] registry expects. Prompts
//! are plain templates with `{document}`, `{raw_extract}` and `{share_names}`
//! slots.

use crate::fields::Category;

/// Prompt pair for one category.
pub struct CategoryTemplates {
    pub raw: &'static str,
    pub precise: &'static str,
}

impl CategoryTemplates {
    /// Render the raw-pass prompt.
    pub fn render_raw(&self, document: &str, share_names: Option<&str>) -> String {
        fill(self.raw, document, share_names)
    }

    /// Render the precise-pass prompt over the raw pass output.
    pub fn render_precise(&self, raw_extract: &str, share_names: Option<&str>) -> String {
        fill(self.precise, raw_extract, share_names)
    }
}

fn fill(template: &str, text: &str, share_names: Option<&str>) -> String {
    template
        .replace("{document}", text)
        .replace("{raw_extract}", text)
        .replace("{share_names}", share_names.unwrap_or(""))
}

/// Look up the prompt pair for a category.
pub fn templates(category: Category) -> CategoryTemplates {
    match category {
        Category::PreferredShareNames => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. Quote every sentence \
                  that names a class or series of preferred stock.\n\nDocument:\n{document}",
            precise: "From the quoted text below, list every preferred stock series name \
                  exactly as designated. Respond with a single JSON object and nothing \
                  else, shaped as:\n\
                  {\"preferred_share_names\": [\"<series name>\", ...]}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::Dates => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. Quote the sentences \
                  stating the incorporation date and the date this certificate was \
                  delivered or filed.\n\nDocument:\n{document}",
            precise: "From the quoted text below, extract the dates. Respond with a single \
                  JSON object and nothing else, shaped as:\n\
                  {\"incorporation_date\": \"<date>\", \
                  \"incorporation_date_supporting_text\": \"<quote>\", \
                  \"document_delivery_date\": \"<date>\", \
                  \"document_delivery_date_supporting_text\": \"<quote>\"}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::CompanyShares => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote the company name and every sentence stating \
                  authorized common shares or authorized shares per preferred series.\n\n\
                  Document:\n{document}",
            precise: "From the quoted text below, extract share counts for these series: \
                  {share_names}. Respond with a single JSON object and nothing else, \
                  shaped as:\n\
                  {\"company_name\": \"<name>\", \
                  \"company_name_supporting_text\": \"<quote>\", \
                  \"common_shares\": \"<count>\", \
                  \"common_shares_supporting_text\": \"<quote>\", \
                  \"preferred_shares_per_preferred_stock\": {\"<series>\": \
                  {\"number_of_shares\": \"<count>\", \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::IssuePrice => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence stating an original issue \
                  price (or original purchase price) for a preferred series.\n\n\
                  Document:\n{document}",
            precise: "From the quoted text below, extract the per-series issue price for \
                  these series: {share_names}. Respond with a single JSON object and \
                  nothing else, shaped as:\n\
                  {\"issue_price_per_preferred_stock\": {\"<series>\": \
                  {\"issue_price\": <number>, \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::ConversionPrice => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence stating a conversion price \
                  for a preferred series.\n\nDocument:\n{document}",
            precise: "From the quoted text below, extract the per-series conversion price \
                  for these series: {share_names}. Respond with a single JSON object and \
                  nothing else, shaped as:\n\
                  {\"conversion_price_per_preferred_stock\": {\"<series>\": \
                  {\"conversion_price\": <number>, \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::Dividends => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence describing dividend rates, \
                  per-share dividend amounts, or whether dividends accrue cumulatively.\n\n\
                  Document:\n{document}",
            precise: "From the quoted text below, extract dividend terms for these series: \
                  {share_names}. Use 0 where a rate or amount is not stated. Respond with \
                  a single JSON object and nothing else, shaped as:\n\
                  {\"dividend_output\": {\"<series>\": {\"dividend_pct\": <number>, \
                  \"dividend_per_share\": <number>, \"dividend_cumulative\": \
                  \"<yes/no>\", \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::LiqPrefOrder => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence establishing the order of \
                  liquidation preference among series.\n\nDocument:\n{document}",
            precise: "From the quoted text below, rank these series by liquidation \
                  preference (1 = paid first): {share_names}. Respond with a single JSON \
                  object and nothing else, shaped as:\n\
                  {\"liquidation_preference_order\": {\"<series>\": \
                  {\"rank\": <number>, \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::LiqPref => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence stating the liquidation \
                  preference multiple for a preferred series.\n\nDocument:\n{document}",
            precise: "From the quoted text below, extract the liquidation preference \
                  multiple for these series: {share_names}. Respond with a single JSON \
                  object and nothing else, shaped as:\n\
                  {\"liquidation_preference\": {\"<series>\": \
                  {\"multiple\": <number>, \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::ParticipationRights => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence describing whether holders \
                  participate with common stock after their preference is paid.\n\n\
                  Document:\n{document}",
            precise: "From the quoted text below, state participation rights for these \
                  series: {share_names}. Respond with a single JSON object and nothing \
                  else, shaped as:\n\
                  {\"participation_rights\": {\"<series>\": {\"participation\": \
                  \"<participating/non-participating>\", \"supporting_text\": \
                  \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
        Category::ParticipationCap => CategoryTemplates {
            raw: "You are reading a certificate of incorporation. The preferred series \
                  are: {share_names}. Quote every sentence stating a cap on \
                  participation for a preferred series.\n\nDocument:\n{document}",
            precise: "From the quoted text below, extract the participation cap for these \
                  series: {share_names}. Respond with a single JSON object and nothing \
                  else, shaped as:\n\
                  {\"participation_cap\": {\"<series>\": {\"cap\": \"<cap or none>\", \
                  \"supporting_text\": \"<quote>\"}}}\n\n\
                  Quoted text:\n{raw_extract}",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_templates() {
        for category in Category::ALL {
            let t = templates(category);
            assert!(!t.raw.is_empty());
            assert!(t.precise.contains("JSON"), "{:?}", category);
        }
    }

    #[test]
    fn test_render_fills_slots() {
        let t = templates(Category::IssuePrice);
        let prompt = t.render_raw("THE DOCUMENT", Some("Series A, Series B"));
        assert!(prompt.contains("THE DOCUMENT"));
        assert!(prompt.contains("Series A, Series B"));
        assert!(!prompt.contains("{document}"));
        assert!(!prompt.contains("{share_names}"));
    }

    #[test]
    fn test_share_names_categories_reference_slot() {
        for category in Category::ALL {
            if category.wants_share_names() {
                assert!(
                    templates(category).raw.contains("{share_names}"),
                    "{:?} should interpolate share names",
                    category
                );
            }
        }
    }
}
