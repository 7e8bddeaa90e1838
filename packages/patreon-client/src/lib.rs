//! Pure Patreon OAuth2 v2 REST API client.
//!
//! A minimal client for the Patreon creator API. Supports fetching the
//! campaign attached to an access token and walking that campaign's member
//! list page by page.
//!
//! # Example
//!
//! ```rust,ignore
//! use patreon_client::PatreonClient;
//!
//! let client = PatreonClient::new("creator-access-token".into());
//!
//! let campaigns = client.fetch_campaigns().await?;
//! for campaign in &campaigns.data {
//!     println!("{}", campaign.id);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{PatreonError, Result};
pub use types::{CampaignDocument, MembersDocument};

const BASE_URL: &str = "https://www.patreon.com/api/oauth2/v2";

pub struct PatreonClient {
    client: reqwest::Client,
    token: String,
}

impl PatreonClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Authenticated GET returning the raw response body. A non-success
    /// status becomes [`PatreonError::Api`] carrying the body text.
    pub async fn get_raw(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PatreonError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }

    /// Fetch the campaigns attached to the access token, creator included.
    pub async fn fetch_campaigns(&self) -> Result<CampaignDocument> {
        tracing::debug!("requesting campaign list");
        let url = format!("{}/campaigns?include=creator", BASE_URL);
        let body = self.get_raw(&url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// URL of the first member page for a campaign. Later pages come from
    /// each page's `links.next` verbatim and must not be reconstructed.
    pub fn first_members_page_url(campaign_id: &str) -> String {
        format!(
            "{}/campaigns/{}/members\
             ?fields%5Bmember%5D=email%2Cfull_name%2Cpatron_status%2Ccurrently_entitled_amount_cents\
             &fields%5Btier%5D=title\
             &fields%5Buser%5D=email\
             &include=currently_entitled_tiers%2Cpledge_history%2Cuser",
            BASE_URL, campaign_id
        )
    }
}

/// Decode one raw member page body.
pub fn parse_members_page(body: &[u8]) -> Result<MembersDocument> {
    Ok(serde_json::from_slice(body)?)
}
