/// One value emitted on a live query's sequence.
///
/// Mirrors a normal GraphQL response shape (`data`/`errors`/`extensions`)
/// plus the `isLive: true` marker spec.md §3 invariant 5 requires on
/// every emitted live result (and only on those).
#[derive(Debug, Clone, serde::Serialize)]
pub struct LiveResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "isLive")]
    pub is_live: bool,
}
