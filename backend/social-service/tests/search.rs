mod common;

use common::{ids, Fixture};
use social_service::ServiceError;

async fn corpus() -> Fixture {
    let fx = Fixture::with_users(&[(1, "alice"), (2, "bob")]).await;
    fx.seed_post(1, 1, 100, "Rust is fun").await;
    fx.seed_post(2, 2, 200, "learning rust today").await;
    fx.seed_post(3, 1, 300, "rustacean meetup tonight").await;
    fx.seed_post(4, 2, 400, "100% coverage").await;
    fx.seed_post(5, 2, 400, "nothing to see").await;
    fx
}

#[tokio::test]
async fn test_search_is_case_sensitive_substring() {
    let fx = corpus().await;

    let page = fx.services.search.search("rust", None, None).await.unwrap();
    assert_eq!(ids(&page.items), vec![3, 2]);
    assert!(!page.has_more);

    let page = fx.services.search.search("Rust", None, None).await.unwrap();
    assert_eq!(ids(&page.items), vec![1]);
}

#[tokio::test]
async fn test_search_ignores_follow_graph() {
    let fx = corpus().await;
    // nobody follows anybody, search still sees every author
    let page = fx.services.search.search("u", None, None).await.unwrap();
    let authors: Vec<i64> = page.items.iter().map(|p| p.author_id).collect();
    assert!(authors.contains(&1) && authors.contains(&2));
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let fx = corpus().await;

    let page = fx.services.search.search("%", None, None).await.unwrap();
    assert_eq!(ids(&page.items), vec![4]);

    let page = fx.services.search.search("_", None, None).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_search_paginates_with_cursor() {
    let fx = corpus().await;

    let first = fx.services.search.search("o", None, Some(2)).await.unwrap();
    // "o" hits posts 5, 4 (both t=400, id tie-break), 2 and 3
    assert_eq!(ids(&first.items), vec![5, 4]);
    assert!(first.has_more);

    let second = fx
        .services
        .search
        .search("o", first.next_cursor.as_deref(), Some(2))
        .await
        .unwrap();
    assert_eq!(ids(&second.items), vec![3, 2]);
    assert!(!second.has_more);
}

#[tokio::test]
async fn test_whitespace_keyword_matches_literally() {
    let fx = Fixture::with_users(&[(1, "alice")]).await;
    fx.seed_post(1, 1, 100, "Rust is fun").await;
    fx.seed_post(2, 1, 200, "nospace").await;

    let page = fx.services.search.search(" ", None, None).await.unwrap();
    assert_eq!(ids(&page.items), vec![1]);

    let page = fx.services.search.search("  ", None, None).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_search_rejects_empty_keyword_and_bad_cursor() {
    let fx = corpus().await;

    let err = fx.services.search.search("", None, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    let err = fx
        .services
        .search
        .search("rust", Some("bm90LWEtY3Vyc29y"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}
