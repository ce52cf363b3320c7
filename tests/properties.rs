use std::sync::Arc;

use futures::StreamExt;
use graphql_live_query::{parse, ExecuteOutcome, ExecuteRequest, LiveQueryStore, StoreConfig};
use proptest::prelude::*;

mod common;
use common::{Db, TestSchema};

async fn sorted_identifier_list(ids: &[String]) -> Vec<String> {
    let db = Arc::new(Db::default());
    for id in ids {
        db.insert(id, "title");
    }
    let schema = TestSchema::new(db);
    let store = LiveQueryStore::new(StoreConfig {
        include_identifier_extension: true,
        ..StoreConfig::default()
    });
    let document = Arc::new(parse("query @live { posts { id title } }").unwrap());

    let mut stream = match store.execute(ExecuteRequest::new(schema, document, "Query", (), ())).await.unwrap() {
        ExecuteOutcome::Live(stream) => stream,
        ExecuteOutcome::Once(_) => unreachable!(),
    };
    let first = stream.next().await.unwrap();
    let extensions = first.extensions.unwrap();
    extensions
        .get("liveResourceIdentifier")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

proptest! {
    // P7: extensions.liveResourceIdentifier is always sorted and deduplicated,
    // regardless of how many posts (and therefore how many Post:<id> object
    // identifiers) a run happens to touch.
    #[test]
    fn extension_identifier_list_is_sorted_and_deduplicated(ids in proptest::collection::vec("[a-z]{1,4}", 0..10)) {
        let rendered = tokio::runtime::Runtime::new().unwrap().block_on(sorted_identifier_list(&ids));

        let mut sorted = rendered.clone();
        sorted.sort_unstable();
        prop_assert_eq!(rendered.clone(), sorted);

        let mut deduped = rendered.clone();
        deduped.dedup();
        prop_assert_eq!(rendered.len(), deduped.len());
    }
}

#[tokio::test]
async fn fragment_spreads_and_inline_fragments_extract_the_same_identifiers_as_inlining_by_hand() {
    let db = Arc::new(Db::default());
    db.insert("1", "Hello");

    let via_fragment = sorted_identifier_list_for(
        db.clone(),
        r#"
        query @live {
            post(id: "1") { ...PostFields }
        }
        fragment PostFields on Post {
            id
            title
        }
        "#,
    )
    .await;

    let inlined = sorted_identifier_list_for(
        db,
        r#"query @live { post(id: "1") { id title } }"#,
    )
    .await;

    assert_eq!(via_fragment, inlined);
}

async fn sorted_identifier_list_for(db: Arc<Db>, source: &str) -> Vec<String> {
    let schema = TestSchema::new(db);
    let store = LiveQueryStore::new(StoreConfig {
        include_identifier_extension: true,
        ..StoreConfig::default()
    });
    let document = Arc::new(parse(source).unwrap());

    let mut stream = match store.execute(ExecuteRequest::new(schema, document, "Query", (), ())).await.unwrap() {
        ExecuteOutcome::Live(stream) => stream,
        ExecuteOutcome::Once(_) => unreachable!(),
    };
    let first = stream.next().await.unwrap();
    let extensions = first.extensions.unwrap();
    let mut ids: Vec<String> = extensions
        .get("liveResourceIdentifier")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    ids.sort_unstable();
    ids
}
