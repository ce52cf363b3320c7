use serde::Deserialize;

/// Construction options for a [`LiveQueryStore`](crate::LiveQueryStore).
///
/// Deliberately small and `Deserialize`-able: the store itself does not
/// load configuration from anywhere (that remains the embedder's
/// concern), but embedders that already have a config-loading layer
/// should be able to deserialize a `StoreConfig` directly out of it
/// instead of hand-assembling one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// When set, every emitted live result carries
    /// `extensions.liveResourceIdentifier`: the lexicographically sorted
    /// list of identifiers the result currently depends on.
    pub include_identifier_extension: bool,

    /// Name of the non-null ID field that triggers the object-identifier
    /// rule (`TypeName:idValue`). Defaults to `"id"`.
    pub id_field_name: String,

    /// Number of slots in a live query's output channel (spec.md §4.2:
    /// "bounded internal buffer of at least one slot"). Defaults to `1`;
    /// raising it lets a run push ahead of a slow-polling consumer
    /// instead of awaiting `pull` as soon as the buffer fills.
    pub channel_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            include_identifier_extension: false,
            id_field_name: "id".to_string(),
            channel_buffer_size: 1,
        }
    }
}
