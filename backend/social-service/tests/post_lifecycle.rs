//! Users, posts and comment ownership

mod common;

use common::{new_user, Fixture};
use social_service::domain::{ProfileUpdate, Role};
use social_service::{ServiceError, SocialRepository};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_register_defaults_role_to_user() {
    let fx = Fixture::with_users(&[]).await;

    let user = fx.services.users.register(new_user("dora")).await.unwrap();
    assert_eq!(user.role, Role::User);
    assert!(fx.services.users.exists_by_username("dora").await.unwrap());

    let mut admin = new_user("root");
    admin.role = Some(Role::Admin);
    let admin = fx.services.users.register(admin).await.unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(fx.services.users.find_by_id(admin.id).await.unwrap().username, "root");
}

#[tokio::test]
async fn test_display_name_reaches_profile() {
    let fx = Fixture::with_users(&[]).await;

    let mut input = new_user("dora");
    input.name = Some("Dora Explorer".to_string());
    let user = fx.services.users.register(input).await.unwrap();
    assert_eq!(user.name.as_deref(), Some("Dora Explorer"));

    let profile = fx.services.users.get_profile("dora").await.unwrap();
    assert_eq!(profile.name.as_deref(), Some("Dora Explorer"));

    let plain = fx.services.users.register(new_user("nameless")).await.unwrap();
    assert_eq!(plain.name, None);
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let fx = Fixture::with_users(&[(1, "alice")]).await;

    let err = fx.services.users.register(new_user("alice")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let err = fx.services.users.register(new_user("")).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    let err = fx
        .services
        .users
        .register(new_user(&"x".repeat(31)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    let mut no_email = new_user("nomail");
    no_email.email = "  ".to_string();
    let err = fx.services.users.register(no_email).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn test_update_profile_changes_only_mutable_fields() {
    let fx = Fixture::with_users(&[(1, "alice")]).await;

    let updated = fx
        .services
        .users
        .update_profile(
            1,
            ProfileUpdate {
                email: None,
                bio: Some("hello there".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio, "hello there");
    assert_eq!(updated.email, "alice@example.com");
    assert_eq!(updated.username, "alice");

    let err = fx
        .services
        .users
        .update_profile(404, ProfileUpdate { email: Some("a@b.c".into()), bio: None })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = fx
        .services
        .users
        .update_profile(1, ProfileUpdate { email: Some(String::new()), bio: None })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn test_create_post_validates_and_joins_author() {
    let fx = Fixture::with_users(&[(1, "alice")]).await;
    let posts = &fx.services.posts;

    let post = posts
        .create_post(1, "first post", Some("https://cdn.example.com/1.jpg"))
        .await
        .unwrap();
    assert_eq!(post.author_id, 1);
    assert_eq!(post.author_username, "alice");
    assert_eq!(post.image_url.as_deref(), Some("https://cdn.example.com/1.jpg"));
    assert_eq!(posts.get_post(post.id).await.unwrap(), post);

    let err = posts.create_post(1, "", None).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    let err = posts.create_post(1, &"y".repeat(1001), None).await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));

    let err = posts.create_post(404, "ghost", None).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_deleting_post_removes_its_comments() {
    let fx = Fixture::with_users(&[(1, "alice"), (2, "bob")]).await;
    fx.seed_post(10, 1, 100, "doomed").await;
    fx.seed_post(11, 1, 110, "survivor").await;
    let posts = &fx.services.posts;

    let c1 = posts.add_comment(10, 2, "first!").await.unwrap();
    posts.add_comment(10, 1, "thanks").await.unwrap();
    let kept = posts.add_comment(11, 2, "still here").await.unwrap();
    assert_eq!(fx.repo.inner.comment_count().await, 3);

    posts.delete_post(10, 1).await.unwrap();

    assert!(matches!(posts.get_post(10).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(posts.list_comments(10).await, Err(ServiceError::NotFound(_))));
    assert!(fx.repo.comments_for_post(10).await.unwrap().is_empty());
    assert_eq!(fx.repo.find_comment(c1.id).await.unwrap(), None);
    assert_eq!(fx.repo.inner.comment_count().await, 1);
    assert_eq!(posts.list_comments(11).await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn test_only_author_deletes_post() {
    let fx = Fixture::with_users(&[(1, "alice"), (2, "bob")]).await;
    fx.seed_post(10, 1, 100, "mine").await;

    let err = fx.services.posts.delete_post(10, 2).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert!(fx.services.posts.get_post(10).await.is_ok());

    let err = fx.services.posts.delete_post(99, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_comments_are_ordered_and_removable() {
    let fx = Fixture::with_users(&[(1, "alice"), (2, "bob"), (3, "carol")]).await;
    fx.seed_post(10, 1, 100, "post").await;
    fx.seed_post(20, 3, 100, "other post").await;
    let posts = &fx.services.posts;

    let a = posts.add_comment(10, 2, "a").await.unwrap();
    let b = posts.add_comment(10, 3, "b").await.unwrap();
    let c = posts.add_comment(10, 2, "c").await.unwrap();

    let listed: Vec<i64> = posts.list_comments(10).await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(listed, vec![a.id, b.id, c.id]);

    // neither comment author nor post author
    let err = posts.remove_comment(10, a.id, 3).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    // wrong owning post
    let err = posts.remove_comment(20, a.id, 2).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    posts.remove_comment(10, a.id, 2).await.unwrap();
    posts.remove_comment(10, b.id, 1).await.unwrap();

    let remaining = posts.list_comments(10).await.unwrap();
    assert_eq!(remaining, vec![c]);
    assert_eq!(fx.repo.find_comment(a.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_comment_requires_existing_post_and_author() {
    let fx = Fixture::with_users(&[(1, "alice")]).await;
    fx.seed_post(10, 1, 100, "post").await;

    let err = fx.services.posts.add_comment(99, 1, "hi").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = fx.services.posts.add_comment(10, 404, "hi").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = fx.services.posts.add_comment(10, 1, " ").await.unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
}

#[tokio::test]
async fn test_comment_on_post_deleted_mid_request_is_not_found() {
    let fx = Fixture::with_users(&[(1, "alice"), (2, "bob")]).await;
    fx.seed_post(10, 1, 100, "short-lived").await;
    fx.repo.delete_post_before_comment.store(true, Ordering::SeqCst);

    let err = fx.services.posts.add_comment(10, 2, "too late").await.unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
    assert!(matches!(fx.services.posts.get_post(10).await, Err(ServiceError::NotFound(_))));
    assert_eq!(fx.repo.inner.comment_count().await, 0);
}
