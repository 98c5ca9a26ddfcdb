use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use super::query::{build_search_request, SearchRequest, OPERATION_NAME};
use crate::models::Listing;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("marketplace request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("marketplace returned undecodable json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("marketplace query errors: {0}")]
    GraphQl(String),
    #[error("no edges found in response: {0}")]
    MissingEdges(String),
}

/// Anything that can hand the watcher a fresh page of listings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, FetchError>;
}

pub struct GetgemsClient {
    client: reqwest::Client,
    endpoint: String,
    request: SearchRequest,
}

impl GetgemsClient {
    pub fn new(endpoint: &str, collection_address: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-apollo-operation-name"),
            HeaderValue::from_static(OPERATION_NAME),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            request: build_search_request(collection_address),
        })
    }
}

#[async_trait]
impl ListingSource for GetgemsClient {
    async fn fetch_listings(&self) -> Result<Vec<Listing>, FetchError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&self.request)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        debug!("Marketplace responded {} ({} bytes)", status, bytes.len());

        let body: Value = serde_json::from_slice(&bytes)?;
        parse_search_response(body)
    }
}

/// Pull the listings out of a `nftSearch` response envelope.
pub fn parse_search_response(mut body: Value) -> Result<Vec<Listing>, FetchError> {
    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
        return Err(FetchError::GraphQl(errors.to_string()));
    }

    const EDGES: &str = "/data/alphaNftItemSearch/edges";
    if !body.pointer(EDGES).map_or(false, Value::is_array) {
        return Err(FetchError::MissingEdges(body.to_string()));
    }
    let edges = body.pointer_mut(EDGES).map(Value::take).unwrap_or_default();

    let mut listings = Vec::new();
    if let Value::Array(edges) = edges {
        for mut edge in edges {
            let node = edge.get_mut("node").map(Value::take).unwrap_or(Value::Null);
            listings.push(serde_json::from_value::<Listing>(node)?);
        }
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::extract_price;
    use serde_json::json;

    #[test]
    fn test_parse_listings_from_edges() {
        let body = json!({
            "data": {
                "alphaNftItemSearch": {
                    "edges": [
                        { "node": {
                            "address": "EQ-one",
                            "name": "+888 0444 0001",
                            "sale": { "__typename": "NftSaleFixPrice", "fullPrice": "5000000000" },
                            "warningBanner": null
                        }},
                        { "node": {
                            "address": "EQ-two",
                            "name": "+888 0123 0002",
                            "sale": null,
                            "warningBanner": { "title": "Restricted" }
                        }}
                    ]
                }
            }
        });

        let listings = parse_search_response(body).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].address, "EQ-one");
        assert_eq!(extract_price(&listings[0]), 5_000_000_000);
        assert!(listings[1].warning_banner);
        assert!(listings[1].sale.is_none());
    }

    #[test]
    fn test_node_with_null_fields_does_not_fail_page() {
        let body = json!({
            "data": {
                "alphaNftItemSearch": {
                    "edges": [
                        { "node": {
                            "address": "EQ-lucky",
                            "name": "Lucky 4",
                            "sale": { "__typename": "NftSaleFixPrice", "fullPrice": "5000000000" },
                            "warningBanner": null
                        }},
                        { "node": { "address": null, "name": null, "sale": null } }
                    ]
                }
            }
        });

        let listings = parse_search_response(body).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name, "Lucky 4");
        assert_eq!(listings[1].name, "");
        assert!(listings[1].sale.is_none());
    }

    #[test]
    fn test_graphql_errors_are_reported() {
        let body = json!({ "errors": [{ "message": "PersistedQueryNotFound" }] });
        match parse_search_response(body) {
            Err(FetchError::GraphQl(msg)) => assert!(msg.contains("PersistedQueryNotFound")),
            other => panic!("expected GraphQl error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_edges_is_reported() {
        for body in [
            json!({ "data": null }),
            json!({ "data": { "alphaNftItemSearch": {} } }),
            json!({ "data": { "alphaNftItemSearch": { "edges": "nope" } } }),
        ] {
            assert!(matches!(
                parse_search_response(body),
                Err(FetchError::MissingEdges(_))
            ));
        }
    }

    #[test]
    fn test_empty_edges_is_not_an_error() {
        let body = json!({ "data": { "alphaNftItemSearch": { "edges": [] } }, "errors": null });
        assert!(parse_search_response(body).unwrap().is_empty());
    }
}
