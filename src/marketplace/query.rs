use serde::Serialize;
use serde_json::json;

pub const OPERATION_NAME: &str = "nftSearch";
pub const PERSISTED_QUERY_HASH: &str =
    "5157c5387ebe1ade6140489ed747a553840f6c3dffe03bb09e92ab565076e29d";
pub const PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "operationName")]
    pub operation_name: &'static str,
    pub variables: SearchVariables,
    pub extensions: Extensions,
}

/// `query` and `sort` are JSON documents sent as strings.
#[derive(Debug, Clone, Serialize)]
pub struct SearchVariables {
    pub query: String,
    pub attributes: Option<String>,
    pub sort: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Extensions {
    #[serde(rename = "persistedQuery")]
    pub persisted_query: PersistedQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersistedQuery {
    pub version: u32,
    #[serde(rename = "sha256Hash")]
    pub sha256_hash: &'static str,
}

/// Search for on-sale items of one collection, cheapest first.
pub fn build_search_request(collection_address: &str) -> SearchRequest {
    let filter = json!({
        "$and": [
            { "collectionAddress": collection_address }
        ]
    });
    let sort = json!([
        { "isOnSale": { "order": "desc" } },
        { "price": { "order": "asc" } },
        { "index": { "order": "asc" } }
    ]);

    SearchRequest {
        operation_name: OPERATION_NAME,
        variables: SearchVariables {
            query: filter.to_string(),
            attributes: None,
            sort: sort.to_string(),
            count: PAGE_SIZE,
        },
        extensions: Extensions {
            persisted_query: PersistedQuery {
                version: 1,
                sha256_hash: PERSISTED_QUERY_HASH,
            },
        },
    }
}
