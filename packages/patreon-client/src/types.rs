use serde::Deserialize;

/// Resource type tag on campaign records.
pub const TYPE_CAMPAIGN: &str = "campaign";

/// Resource type tag on tier records in `included`.
pub const TYPE_TIER: &str = "tier";

/// `patron_status` value for members with a live pledge.
pub const STATUS_ACTIVE_PATRON: &str = "active_patron";

/// `{ id, type }` reference used inside relationship objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Response document for `GET /campaigns?include=creator`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignDocument {
    #[serde(default)]
    pub data: Vec<CampaignResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignResource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub relationships: CampaignRelationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignRelationships {
    #[serde(default)]
    pub creator: ToOneRelationship,
}

/// To-one relationship wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToOneRelationship {
    #[serde(default)]
    pub data: ResourceRef,
}

/// To-many relationship wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToManyRelationship {
    #[serde(default)]
    pub data: Vec<ResourceRef>,
}

/// Response document for one page of `GET /campaigns/{id}/members`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembersDocument {
    #[serde(default)]
    pub data: Vec<MemberResource>,
    #[serde(default)]
    pub included: Vec<IncludedResource>,
    #[serde(default)]
    pub links: PageLinks,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberResource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub relationships: MemberRelationships,
    #[serde(default)]
    pub attributes: MemberAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberRelationships {
    #[serde(default)]
    pub currently_entitled_tiers: ToManyRelationship,
}

/// Member attributes requested via `fields[member]`. Patreon sends `null`
/// for some of these on followers and former patrons, hence the `Option`s.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberAttributes {
    #[serde(default)]
    pub currently_entitled_amount_cents: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub patron_status: Option<String>,
}

/// Included record. Several include types come back on a member page; only
/// tier records carry a title we use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludedResource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: IncludedAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludedAttributes {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

impl PageLinks {
    /// Cursor for the next page; `None` when the field is absent or empty.
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
}
