//! Campaign resolution and member pagination against the Patreon API.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use patreon_client::types::{
    CampaignDocument, MembersDocument, STATUS_ACTIVE_PATRON, TYPE_CAMPAIGN, TYPE_TIER,
};
use patreon_client::{parse_members_page, PatreonClient};

use crate::dump::{FilePageDump, NullSink, PageSink};
use crate::report;

/// Placeholder stored for members whose name collapses to nothing.
const MISSING_NAME: &str = "_none_";

/// The one campaign attached to the access token.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: String,
    pub creator_id: String,
}

/// An active patron. One per member id; a repeat of the same id on a later
/// page overwrites the earlier entry.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub tier_ids: Vec<String>,
    pub pledge_amount_cents: i64,
}

/// Tier id -> tier title, accumulated across all member pages.
pub type TierLookup = HashMap<String, String>;

/// Source of raw member-page bodies. Implemented by [`PatreonClient`];
/// tests substitute canned pages.
#[async_trait]
pub trait MemberPageSource {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl MemberPageSource for PatreonClient {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get_raw(url).await?)
    }
}

/// Run the whole pipeline: resolve the campaign, walk its member pages,
/// print the roster to stdout.
pub async fn run(client: &PatreonClient, debug: bool) -> Result<()> {
    let Some(campaign) = resolve_campaign(client).await? else {
        return Ok(());
    };
    tracing::debug!(
        campaign_id = %campaign.id,
        creator_id = %campaign.creator_id,
        "campaign resolved"
    );

    tracing::info!("fetching members details");
    let first_url = PatreonClient::first_members_page_url(&campaign.id);
    let mut sink: Box<dyn PageSink> = if debug {
        Box::new(FilePageDump::new(".".into()))
    } else {
        Box::new(NullSink)
    };
    let (members, tiers) = fetch_all_members(client, first_url, sink.as_mut()).await?;

    report::print_roster(std::io::stdout().lock(), &members, &tiers)
        .context("failed to write report")?;
    Ok(())
}

/// Fetch the campaign attached to the token. `None` (after printing an
/// explanation) means the response did not hold exactly one campaign record;
/// that is a surprise worth a human look, not a crash.
pub async fn resolve_campaign(client: &PatreonClient) -> Result<Option<Campaign>> {
    tracing::info!("fetching campaign details");
    let doc = client
        .fetch_campaigns()
        .await
        .context("failed to fetch campaigns")?;

    match campaign_from_document(&doc) {
        Ok(campaign) => Ok(Some(campaign)),
        Err(explanation) => {
            println!("{}", explanation);
            Ok(None)
        }
    }
}

/// Extract the single campaign from the response document, or explain why
/// the document is not usable.
fn campaign_from_document(doc: &CampaignDocument) -> std::result::Result<Campaign, String> {
    if doc.data.len() != 1 {
        return Err(format!(
            "The number of campaigns is {}, which I don't understand. I was expecting exactly 1. Exiting.",
            doc.data.len()
        ));
    }

    let record = &doc.data[0];
    if record.kind != TYPE_CAMPAIGN {
        return Err(format!("The response is not a campaign: type=={}", record.kind));
    }

    Ok(Campaign {
        id: record.id.clone(),
        creator_id: record.relationships.creator.data.id.clone(),
    })
}

/// Walk every member page starting from `first_url`, following the
/// server-supplied `links.next` cursor until it runs out. Returns the
/// accumulated members keyed by member id, plus the tier lookup.
pub async fn fetch_all_members(
    source: &dyn MemberPageSource,
    first_url: String,
    sink: &mut dyn PageSink,
) -> Result<(HashMap<String, Member>, TierLookup)> {
    let mut members = HashMap::new();
    let mut tiers = TierLookup::new();

    let mut next_url = Some(first_url);
    let mut pages = 0usize;
    while let Some(url) = next_url {
        let body = source
            .fetch_page(&url)
            .await
            .with_context(|| format!("failed to fetch member page {}", pages + 1))?;
        pages += 1;
        sink.record(pages, &body);

        let page = parse_members_page(&body)
            .with_context(|| format!("failed to decode member page {}", pages))?;
        if pages == 1 {
            tracing::debug!(total = page.meta.total, "campaign reports member total");
        }

        absorb_page(&page, &mut members, &mut tiers);

        next_url = page.links.next().map(str::to_owned);
        if pages % 10 == 0 {
            tracing::info!(pages, "fetched member pages");
        }
    }

    tracing::info!(pages, members = members.len(), "member pagination complete");
    Ok((members, tiers))
}

/// Fold one decoded page into the running accumulators. Tier records from
/// `included` extend the lookup; only active patrons become members.
fn absorb_page(
    page: &MembersDocument,
    members: &mut HashMap<String, Member>,
    tiers: &mut TierLookup,
) {
    for inc in &page.included {
        if inc.kind != TYPE_TIER {
            continue;
        }
        tiers.insert(inc.id.clone(), inc.attributes.title.clone());
    }

    for record in &page.data {
        if record.attributes.patron_status.as_deref() != Some(STATUS_ACTIVE_PATRON) {
            continue;
        }

        let mut full_name =
            report::collapse_whitespace(record.attributes.full_name.as_deref().unwrap_or(""));
        if full_name.is_empty() {
            full_name = MISSING_NAME.to_string();
        }

        let tier_ids = record
            .relationships
            .currently_entitled_tiers
            .data
            .iter()
            .map(|tier| tier.id.clone())
            .collect();

        members.insert(
            record.id.clone(),
            Member {
                id: record.id.clone(),
                email: record.attributes.email.clone().unwrap_or_default(),
                full_name,
                tier_ids,
                pledge_amount_cents: record.attributes.currently_entitled_amount_cents,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Serves canned page bodies in order and records the URLs requested.
    struct FixtureSource {
        pages: Vec<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl FixtureSource {
        fn new(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched_urls(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MemberPageSource for FixtureSource {
        async fn fetch_page(&self, url: &str) -> Result<Vec<u8>> {
            let mut fetched = self.fetched.lock().unwrap();
            let index = fetched.len();
            fetched.push(url.to_string());
            Ok(self.pages[index].as_bytes().to_vec())
        }
    }

    fn member_record(id: &str, name: &str, status: &str, tier: &str) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "type": "member",
                "attributes": {{
                    "currently_entitled_amount_cents": 500,
                    "email": "{id}@x.com",
                    "full_name": "{name}",
                    "patron_status": "{status}"
                }},
                "relationships": {{
                    "currently_entitled_tiers": {{ "data": [ {{ "id": "{tier}", "type": "tier" }} ] }}
                }}
            }}"#
        )
    }

    #[tokio::test]
    async fn pagination_follows_next_links_until_exhausted() {
        let source = FixtureSource::new(&[
            r#"{ "data": [], "links": { "next": "https://example.test/p2" } }"#,
            r#"{ "data": [], "links": { "next": "https://example.test/p3" } }"#,
            r#"{ "data": [], "links": { "next": "" } }"#,
        ]);

        let mut sink = NullSink;
        let (members, _) =
            fetch_all_members(&source, "https://example.test/p1".into(), &mut sink)
                .await
                .unwrap();

        assert!(members.is_empty());
        assert_eq!(
            source.fetched_urls(),
            vec![
                "https://example.test/p1",
                "https://example.test/p2",
                "https://example.test/p3",
            ]
        );
    }

    #[tokio::test]
    async fn only_active_patrons_are_kept() {
        let page = format!(
            r#"{{ "data": [ {}, {}, {} ] }}"#,
            member_record("M1", "Jane Doe", "active_patron", "T1"),
            member_record("M2", "John Roe", "former_patron", "T1"),
            member_record("M3", "Ann Poe", "declined_patron", "T1"),
        );
        let source = FixtureSource::new(&[&page]);

        let mut sink = NullSink;
        let (members, _) = fetch_all_members(&source, "p1".into(), &mut sink)
            .await
            .unwrap();

        assert_eq!(members.len(), 1);
        assert!(members.contains_key("M1"));
    }

    #[tokio::test]
    async fn member_names_are_collapsed_and_defaulted() {
        let page = format!(
            r#"{{ "data": [ {}, {} ] }}"#,
            member_record("M1", "  Jane   Doe ", "active_patron", "T1"),
            member_record("M2", "   ", "active_patron", "T1"),
        );
        let source = FixtureSource::new(&[&page]);

        let mut sink = NullSink;
        let (members, _) = fetch_all_members(&source, "p1".into(), &mut sink)
            .await
            .unwrap();

        assert_eq!(members["M1"].full_name, "JaneDoe");
        assert_eq!(members["M2"].full_name, "_none_");
    }

    #[tokio::test]
    async fn later_page_overwrites_repeated_member_id() {
        let page1 = format!(
            r#"{{ "data": [ {} ], "links": {{ "next": "p2" }} }}"#,
            member_record("M1", "Old Name", "active_patron", "T1"),
        );
        let page2 = format!(
            r#"{{ "data": [ {} ] }}"#,
            member_record("M1", "New Name", "active_patron", "T2"),
        );
        let source = FixtureSource::new(&[&page1, &page2]);

        let mut sink = NullSink;
        let (members, _) = fetch_all_members(&source, "p1".into(), &mut sink)
            .await
            .unwrap();

        assert_eq!(members.len(), 1);
        assert_eq!(members["M1"].full_name, "NewName");
        assert_eq!(members["M1"].tier_ids, vec!["T2"]);
    }

    #[tokio::test]
    async fn tier_lookup_spans_pages() {
        let page1 = r#"{
            "data": [],
            "included": [ { "id": "T1", "type": "tier", "attributes": { "title": "Gold Tier" } } ],
            "links": { "next": "p2" }
        }"#;
        let page2 = format!(
            r#"{{ "data": [ {} ] }}"#,
            member_record("M1", "Jane Doe", "active_patron", "T1"),
        );
        let source = FixtureSource::new(&[page1, &page2]);

        let mut sink = NullSink;
        let (members, tiers) = fetch_all_members(&source, "p1".into(), &mut sink)
            .await
            .unwrap();

        assert_eq!(tiers.get("T1").map(String::as_str), Some("Gold Tier"));
        assert_eq!(
            report::entitled_tier_names(&members["M1"], &tiers),
            vec!["GoldTier"]
        );
    }

    #[tokio::test]
    async fn non_tier_includes_are_ignored() {
        let page = r#"{
            "data": [],
            "included": [
                { "id": "U1", "type": "user", "attributes": { "title": "not a tier" } },
                { "id": "T1", "type": "tier", "attributes": { "title": "Bronze" } }
            ]
        }"#;
        let source = FixtureSource::new(&[page]);

        let mut sink = NullSink;
        let (_, tiers) = fetch_all_members(&source, "p1".into(), &mut sink)
            .await
            .unwrap();

        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers.get("T1").map(String::as_str), Some("Bronze"));
    }

    #[tokio::test]
    async fn undecodable_page_aborts_the_walk() {
        let source = FixtureSource::new(&["this is not json"]);

        let mut sink = NullSink;
        let result = fetch_all_members(&source, "p1".into(), &mut sink).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn single_patron_end_to_end() {
        let page = r#"{
            "data": [
                {
                    "id": "M1",
                    "type": "member",
                    "attributes": {
                        "currently_entitled_amount_cents": 500,
                        "email": "j@x.com",
                        "full_name": "Jane  Doe",
                        "patron_status": "active_patron"
                    },
                    "relationships": {
                        "currently_entitled_tiers": { "data": [ { "id": "T1", "type": "tier" } ] }
                    }
                }
            ],
            "included": [
                { "id": "T1", "type": "tier", "attributes": { "title": "Gold Tier" } }
            ],
            "links": { "next": "" },
            "meta": { "total": 1 }
        }"#;
        let source = FixtureSource::new(&[page]);

        let mut sink = NullSink;
        let (members, tiers) = fetch_all_members(&source, "p1".into(), &mut sink)
            .await
            .unwrap();

        let mut out = Vec::new();
        report::print_roster(&mut out, &members, &tiers).unwrap();
        assert_eq!(
            std::str::from_utf8(&out).unwrap(),
            "fullName=JaneDoe email=j@x.com pledgeAmount:500, tiers: GoldTier\n"
        );
    }

    #[test]
    fn campaign_document_must_hold_exactly_one_campaign() {
        let empty: CampaignDocument = serde_json::from_str(r#"{ "data": [] }"#).unwrap();
        assert!(campaign_from_document(&empty).is_err());

        let two: CampaignDocument = serde_json::from_str(
            r#"{ "data": [ { "id": "C1", "type": "campaign" }, { "id": "C2", "type": "campaign" } ] }"#,
        )
        .unwrap();
        assert!(campaign_from_document(&two).is_err());

        let wrong_type: CampaignDocument =
            serde_json::from_str(r#"{ "data": [ { "id": "C1", "type": "goal" } ] }"#).unwrap();
        assert!(campaign_from_document(&wrong_type).is_err());
    }

    #[test]
    fn campaign_extraction_takes_id_and_creator() {
        let doc: CampaignDocument = serde_json::from_str(
            r#"{
                "data": [
                    {
                        "id": "C1",
                        "type": "campaign",
                        "relationships": { "creator": { "data": { "id": "U9", "type": "user" } } }
                    }
                ]
            }"#,
        )
        .unwrap();

        let campaign = campaign_from_document(&doc).unwrap();
        assert_eq!(campaign.id, "C1");
        assert_eq!(campaign.creator_id, "U9");
    }
}
