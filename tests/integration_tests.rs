use almofasir::config::SlugConfig;
use almofasir::models::{ArticleStatus, CreateArticle, SlugLookup, UpdateArticle};
use almofasir::services::articles::{self, ArticleError};
use almofasir::services::audit::audit_slugs;
use almofasir::services::reslug::{reslug_articles, ReslugOptions, ReslugOutcome};
use almofasir::services::slug::validate;
use almofasir::Database;

fn create_test_db() -> Database {
    let name = format!("test_db_{}", uuid::Uuid::new_v4().simple());
    let db = Database::open_memory(&name).expect("Failed to create test database");
    db.migrate().expect("Failed to run migrations");
    db
}

fn article(title: &str) -> CreateArticle {
    CreateArticle {
        title: title.to_string(),
        slug: None,
        body: String::new(),
        status: ArticleStatus::Published,
    }
}

fn legacy(title: &str, slug: &str) -> CreateArticle {
    CreateArticle {
        slug: Some(slug.to_string()),
        ..article(title)
    }
}

mod article_integration_tests {
    use super::*;

    #[test]
    fn test_create_article_generates_slug() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created =
            articles::create_article(&db, &slugs, article("تفسير حلم الأسد في المنام")).unwrap();

        assert_eq!(created.slug, "تفسير-حلم-الاسد");
        assert_eq!(created.status, ArticleStatus::Published);
        assert!(created.published_at.is_some());

        let fetched = articles::get_article_by_slug(&db, "تفسير-حلم-الاسد")
            .unwrap()
            .expect("article should exist");
        assert_eq!(fetched.id, created.id);
    }

    #[test]
    fn test_duplicate_titles_get_counter() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let first = articles::create_article(&db, &slugs, article("رؤية الثعبان الأسود")).unwrap();
        let second = articles::create_article(&db, &slugs, article("رؤية الثعبان الأسود")).unwrap();
        let third = articles::create_article(&db, &slugs, article("رؤية الثعبان الأسود")).unwrap();

        assert_eq!(first.slug, "رؤيه-الثعبان-الاسود");
        assert_eq!(second.slug, "رؤيه-الثعبان-الاسود-2");
        assert_eq!(third.slug, "رؤيه-الثعبان-الاسود-3");
    }

    #[test]
    fn test_title_without_slug_uses_fallback() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created = articles::create_article(&db, &slugs, article("ما في")).unwrap();

        let tail: String = created.id.chars().skip(created.id.chars().count() - 6).collect();
        assert_eq!(created.slug, format!("تفسير-حلم-{}", tail));
        assert!(validate(&created.slug).is_ok());
    }

    #[test]
    fn test_reserved_slugs_are_skipped() {
        let db = create_test_db();
        let slugs = SlugConfig {
            reserved: vec!["تفسير-حلم-الاسد".to_string()],
            ..SlugConfig::default()
        };

        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        assert_eq!(created.slug, "تفسير-حلم-الاسد-2");
    }

    #[test]
    fn test_explicit_invalid_slug_is_rejected() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let err = articles::create_article(&db, &slugs, legacy("حلم", "حلم-حلم")).unwrap_err();
        match err.downcast_ref::<ArticleError>() {
            Some(ArticleError::InvalidSlug { slug, reason }) => {
                assert_eq!(slug, "حلم-حلم");
                assert_eq!(reason.code(), "consecutive_duplicate");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_taken_slug_is_rejected() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        let err = articles::create_article(&db, &slugs, legacy("أسد", "تفسير-حلم-الاسد"))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ArticleError>(),
            Some(ArticleError::SlugTaken(_))
        ));
    }

    #[test]
    fn test_update_slug_records_redirect() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        let updated = articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                slug: Some("حلم-الاسد-الكبير".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.slug, "حلم-الاسد-الكبير");

        match articles::lookup_slug(&db, "تفسير-حلم-الاسد").unwrap() {
            Some(SlugLookup::Moved { current_slug }) => assert_eq!(current_slug, "حلم-الاسد-الكبير"),
            other => panic!("expected redirect, got {:?}", other),
        }
        assert!(matches!(
            articles::lookup_slug(&db, "حلم-الاسد-الكبير").unwrap(),
            Some(SlugLookup::Live(_))
        ));
    }

    #[test]
    fn test_redirected_slug_is_not_reused() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                title: Some("رؤية الأسد الكبير".to_string()),
                regenerate_slug: true,
                ..Default::default()
            },
        )
        .unwrap();

        let other = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        assert_eq!(other.slug, "تفسير-حلم-الاسد-2");
    }

    #[test]
    fn test_article_can_reclaim_its_old_slug() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                slug: Some("حلم-الاسد".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let restored = articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                slug: Some("تفسير-حلم-الاسد".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(restored.slug, "تفسير-حلم-الاسد");
        assert!(matches!(
            articles::lookup_slug(&db, "تفسير-حلم-الاسد").unwrap(),
            Some(SlugLookup::Live(_))
        ));
        assert!(matches!(
            articles::lookup_slug(&db, "حلم-الاسد").unwrap(),
            Some(SlugLookup::Moved { .. })
        ));
    }

    #[test]
    fn test_update_missing_article() {
        let db = create_test_db();
        let err = articles::update_article(&db, &SlugConfig::default(), "nope", UpdateArticle::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArticleError>(),
            Some(ArticleError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_published_skips_drafts() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        articles::create_article(&db, &slugs, article("رؤية الثعبان الأسود")).unwrap();
        articles::create_article(
            &db,
            &slugs,
            CreateArticle {
                status: ArticleStatus::Draft,
                ..article("حلم البحر الهادئ")
            },
        )
        .unwrap();

        assert_eq!(articles::count_published(&db).unwrap(), 2);
        assert_eq!(articles::list_published(&db, 10, 0).unwrap().len(), 2);
        assert_eq!(articles::list_published(&db, 1, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_article_removes_redirects() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                slug: Some("حلم-الاسد".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(articles::delete_article(&db, &created.id).unwrap());
        assert!(articles::lookup_slug(&db, "تفسير-حلم-الاسد").unwrap().is_none());
        assert!(!articles::delete_article(&db, &created.id).unwrap());
    }

    #[test]
    fn test_fallback_from_unusual_import_id() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let imported =
            articles::import_article(&db, &slugs, Some("post 12/3".to_string()), article("ما في"))
                .unwrap()
                .expect("import should insert");

        assert_eq!(imported.id, "post 12/3");
        assert_eq!(imported.slug, "تفسير-حلم-ost123");
        assert!(validate(&imported.slug).is_ok());
    }

    #[test]
    fn test_list_published_with_huge_offset() {
        let db = create_test_db();
        articles::create_article(&db, &SlugConfig::default(), article("تفسير حلم الأسد")).unwrap();

        assert!(articles::list_published(&db, 10, usize::MAX).unwrap().is_empty());
        assert_eq!(articles::list_published(&db, usize::MAX, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_import_keeps_free_legacy_slug() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let imported = articles::import_article(
            &db,
            &slugs,
            Some("legacy-1".to_string()),
            legacy("تفسير حلم الأسد", "حلم"),
        )
        .unwrap()
        .expect("first import inserts");
        assert_eq!(imported.id, "legacy-1");
        assert_eq!(imported.slug, "حلم");

        let again = articles::import_article(
            &db,
            &slugs,
            Some("legacy-1".to_string()),
            legacy("تفسير حلم الأسد", "حلم"),
        )
        .unwrap();
        assert!(again.is_none());

        let clash = articles::import_article(&db, &slugs, None, legacy("تفسير حلم الأسد", "حلم"))
            .unwrap()
            .expect("new id inserts");
        assert_eq!(clash.slug, "تفسير-حلم-الاسد");
    }
}

mod reslug_integration_tests {
    use super::*;

    fn import(db: &Database, id: &str, title: &str, slug: &str) {
        articles::import_article(db, &SlugConfig::default(), Some(id.to_string()), legacy(title, slug))
            .unwrap()
            .expect("import should insert");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let db = create_test_db();
        import(&db, "a1", "تفسير حلم الأسد", "تفسير-تفسير-حلم");

        let report = reslug_articles(
            &db,
            &SlugConfig::default(),
            ReslugOptions {
                dry_run: true,
                only_invalid: false,
            },
        )
        .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.changed, 1);
        assert_eq!(report.entries[0].new_slug, "تفسير-حلم-الاسد");
        let stored = articles::get_article_by_id(&db, "a1").unwrap().unwrap();
        assert_eq!(stored.slug, "تفسير-تفسير-حلم");
    }

    #[test]
    fn test_reslug_fixes_invalid_slugs_and_redirects() {
        let db = create_test_db();
        import(&db, "a1", "تفسير حلم الأسد", "تفسير-تفسير-حلم");
        import(&db, "a2", "رؤية الثعبان", "حلم");

        let report = reslug_articles(&db, &SlugConfig::default(), ReslugOptions::default()).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.changed, 2);
        let a1 = articles::get_article_by_id(&db, "a1").unwrap().unwrap();
        let a2 = articles::get_article_by_id(&db, "a2").unwrap().unwrap();
        assert_eq!(a1.slug, "تفسير-حلم-الاسد");
        assert_eq!(a2.slug, "رؤيه-الثعبان");

        match articles::lookup_slug(&db, "حلم").unwrap() {
            Some(SlugLookup::Moved { current_slug }) => assert_eq!(current_slug, "رؤيه-الثعبان"),
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_reslug_swaps_slugs_between_articles() {
        let db = create_test_db();
        import(&db, "a1", "تفسير حلم الأسد", "قديم-اول");
        import(&db, "a2", "رؤية القطط", "تفسير-حلم-الاسد");

        reslug_articles(&db, &SlugConfig::default(), ReslugOptions::default()).unwrap();

        let a1 = articles::get_article_by_id(&db, "a1").unwrap().unwrap();
        let a2 = articles::get_article_by_id(&db, "a2").unwrap().unwrap();
        assert_eq!(a1.slug, "تفسير-حلم-الاسد");
        assert_eq!(a2.slug, "رؤيه-القطط");

        // the old slug of a2 is live again and must not redirect
        match articles::lookup_slug(&db, "تفسير-حلم-الاسد").unwrap() {
            Some(SlugLookup::Live(found)) => assert_eq!(found.id, "a1"),
            other => panic!("expected live article, got {:?}", other),
        }
        assert!(matches!(
            articles::lookup_slug(&db, "قديم-اول").unwrap(),
            Some(SlugLookup::Moved { .. })
        ));
    }

    #[test]
    fn test_reslug_reports_collisions_and_fallbacks() {
        let db = create_test_db();
        import(&db, "a1", "تفسير حلم الثعبان", "قديم-اول");
        import(&db, "a2", "تفسير حلم الثعبان", "قديم-ثاني");
        import(&db, "abcdef123456", "ما هو", "قديم-ثالث");

        let report = reslug_articles(&db, &SlugConfig::default(), ReslugOptions::default()).unwrap();

        assert_eq!(report.changed, 1);
        assert_eq!(report.collisions, 1);
        assert_eq!(report.fallbacks, 1);

        let fallback = report
            .entries
            .iter()
            .find(|e| e.id == "abcdef123456")
            .unwrap();
        assert_eq!(fallback.outcome, ReslugOutcome::Fallback);
        assert_eq!(fallback.new_slug, "تفسير-حلم-123456");

        let collided = report
            .entries
            .iter()
            .find(|e| e.outcome == ReslugOutcome::ChangedCollision)
            .unwrap();
        assert_eq!(collided.new_slug, "تفسير-حلم-الثعبان-2");

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["entries"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["outcome"] == "changed+collision"));
    }

    #[test]
    fn test_reslug_only_invalid_keeps_valid_slugs() {
        let db = create_test_db();
        import(&db, "a1", "تفسير حلم الأسد", "اسد-قديم");
        import(&db, "a2", "حلم البحر", "حلم");

        let report = reslug_articles(
            &db,
            &SlugConfig::default(),
            ReslugOptions {
                dry_run: false,
                only_invalid: true,
            },
        )
        .unwrap();

        assert_eq!(report.kept, 1);
        assert_eq!(report.changed, 1);
        assert_eq!(
            articles::get_article_by_id(&db, "a1").unwrap().unwrap().slug,
            "اسد-قديم"
        );
        assert_eq!(
            articles::get_article_by_id(&db, "a2").unwrap().unwrap().slug,
            "حلم-البحر"
        );
    }

    #[test]
    fn test_reslug_respects_other_articles_redirects() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let moved = articles::create_article(&db, &slugs, article("رؤية الثعبان الأسود")).unwrap();
        articles::update_article(
            &db,
            &slugs,
            &moved.id,
            UpdateArticle {
                slug: Some("حلم-جديد".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        import(&db, "b1", "رؤية الثعبان الأسود", "bad");

        let report = reslug_articles(
            &db,
            &slugs,
            ReslugOptions {
                dry_run: false,
                only_invalid: true,
            },
        )
        .unwrap();

        let entry = report.entries.iter().find(|e| e.id == "b1").unwrap();
        assert_eq!(entry.new_slug, "رؤيه-الثعبان-الاسود-2");
        assert_eq!(entry.outcome, ReslugOutcome::ChangedCollision);

        match articles::lookup_slug(&db, "رؤيه-الثعبان-الاسود").unwrap() {
            Some(SlugLookup::Moved { current_slug }) => assert_eq!(current_slug, "حلم-جديد"),
            other => panic!("old url must keep redirecting, got {:?}", other),
        }
    }

    #[test]
    fn test_reslug_reclaims_own_redirect() {
        let db = create_test_db();
        let slugs = SlugConfig::default();

        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                slug: Some("حلم-الاسد-القديم".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let report = reslug_articles(&db, &slugs, ReslugOptions::default()).unwrap();
        assert_eq!(report.changed, 1);
        assert_eq!(report.collisions, 0);

        match articles::lookup_slug(&db, "تفسير-حلم-الاسد").unwrap() {
            Some(SlugLookup::Live(found)) => assert_eq!(found.id, created.id),
            other => panic!("expected live article, got {:?}", other),
        }
        match articles::lookup_slug(&db, "حلم-الاسد-القديم").unwrap() {
            Some(SlugLookup::Moved { current_slug }) => assert_eq!(current_slug, "تفسير-حلم-الاسد"),
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_reslug_is_stable_on_second_run() {
        let db = create_test_db();
        import(&db, "a1", "تفسير حلم الأسد", "تفسير-تفسير-حلم");
        import(&db, "a2", "تفسير حلم الأسد", "حلم");

        reslug_articles(&db, &SlugConfig::default(), ReslugOptions::default()).unwrap();
        let second = reslug_articles(&db, &SlugConfig::default(), ReslugOptions::default()).unwrap();

        assert_eq!(second.unchanged, 2);
        assert_eq!(second.moved().count(), 0);
    }
}

mod audit_integration_tests {
    use super::*;

    #[test]
    fn test_audit_tallies_reasons() {
        let db = create_test_db();
        let slugs = SlugConfig::default();
        for (id, slug) in [
            ("a1", "تفسير-حلم-الاسد"),
            ("a2", "حلم"),
            ("a3", "تفسير-تفسير-حلم"),
            ("a4", "a-b-a-b"),
            ("a5", "اسد"),
        ] {
            articles::import_article(&db, &slugs, Some(id.to_string()), legacy("عنوان", slug))
                .unwrap()
                .unwrap();
        }

        let report = audit_slugs(&db, &slugs, 2).unwrap();

        assert_eq!(report.total, 5);
        assert_eq!(report.valid, 1);
        assert_eq!(report.invalid, 4);
        assert_eq!(report.by_reason.get("too_few_tokens"), Some(&2));
        assert_eq!(report.by_reason.get("consecutive_duplicate"), Some(&1));
        assert_eq!(report.by_reason.get("duplicated_phrase"), Some(&1));
        assert_eq!(report.samples.len(), 2);
    }
}

mod import_integration_tests {
    use super::*;
    use almofasir::cli::import::import_dir_articles;

    #[test]
    fn test_import_markdown_directory() {
        let db = create_test_db();
        let dir = std::env::temp_dir().join(format!("almofasir_import_{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(
            dir.join("001.md"),
            "---\nid: dream-001\ntitle: تفسير حلم الأسد\nstatus: published\n---\nرؤية الأسد تدل على القوة",
        )
        .unwrap();
        std::fs::write(
            dir.join("002.md"),
            "---\nid: dream-002\ntitle: رؤية البحر\nslug: legacy-sea\n---\nالبحر",
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let (imported, skipped) = import_dir_articles(&db, &SlugConfig::default(), &dir).unwrap();
        assert_eq!((imported, skipped), (2, 0));

        let first = articles::get_article_by_id(&db, "dream-001").unwrap().unwrap();
        assert_eq!(first.slug, "تفسير-حلم-الاسد");
        assert_eq!(first.status, ArticleStatus::Published);
        assert_eq!(first.body, "رؤية الأسد تدل على القوة");

        let second = articles::get_article_by_id(&db, "dream-002").unwrap().unwrap();
        assert_eq!(second.slug, "legacy-sea");
        assert_eq!(second.status, ArticleStatus::Draft);

        let (imported, skipped) = import_dir_articles(&db, &SlugConfig::default(), &dir).unwrap();
        assert_eq!((imported, skipped), (0, 2));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

mod api_integration_tests {
    use super::*;
    use almofasir::web::{self, AppState};
    use almofasir::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
[site]
title = "المفسر"
url = "https://example.com"

[database]
path = ":memory:"
"#;

    fn app() -> (Router, Database) {
        let config: Config = toml::from_str(CONFIG).unwrap();
        let db = create_test_db();
        let state = Arc::new(AppState::new(config, db.clone()));
        (web::router(state), db)
    }

    fn article_uri(slug: &str) -> String {
        let mut url = url::Url::parse("http://localhost/api/v1/articles/").unwrap();
        url.path_segments_mut().unwrap().pop_if_empty().push(slug);
        url.path().to_string()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_slug_endpoint() {
        let (app, _db) = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/slugs",
                serde_json::json!({ "text": "تفسير حلم الأسد في المنام" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["slug"], "تفسير-حلم-الاسد");
        assert_eq!(body["data"]["valid"], true);

        let response = app
            .oneshot(post_json(
                "/api/v1/slugs",
                serde_json::json!({ "text": "تفسير حلم الأسد", "max_tokens": 2 }),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["slug"], "تفسير-حلم");
    }

    #[tokio::test]
    async fn test_generate_slug_degenerate_input() {
        let (app, _db) = app();
        let response = app
            .oneshot(post_json("/api/v1/slugs", serde_json::json!({ "text": "في من" })))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["slug"], "");
        assert_eq!(body["data"]["valid"], false);
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let (app, _db) = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/slugs/validate",
                serde_json::json!({ "slug": "تفسير-حلم-تفسير-حلم" }),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["valid"], false);
        assert_eq!(body["data"]["reason"], "duplicated phrase pattern");

        let response = app
            .oneshot(post_json(
                "/api/v1/slugs/validate",
                serde_json::json!({ "slug": "تفسير-حلم-النمر-خوف" }),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"], serde_json::json!({ "valid": true }));
    }

    #[tokio::test]
    async fn test_create_and_fetch_article() {
        let (app, _db) = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/articles",
                serde_json::json!({ "title": "تفسير حلم الأسد", "status": "published" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["data"]["slug"], "تفسير-حلم-الاسد");

        let response = app
            .clone()
            .oneshot(get(&article_uri("تفسير-حلم-الاسد")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["title"], "تفسير حلم الأسد");

        let response = app.oneshot(get("/api/v1/articles")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_moved_article_redirects() {
        let (app, db) = app();
        let slugs = SlugConfig::default();
        let created = articles::create_article(&db, &slugs, article("تفسير حلم الأسد")).unwrap();
        articles::update_article(
            &db,
            &slugs,
            &created.id,
            UpdateArticle {
                slug: Some("حلم-الاسد".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let response = app.oneshot(get(&article_uri("تفسير-حلم-الاسد"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION].to_str().unwrap(),
            article_uri("حلم-الاسد")
        );
    }

    #[tokio::test]
    async fn test_drafts_are_not_served() {
        let (app, db) = app();
        let slugs = SlugConfig::default();
        let draft = articles::create_article(
            &db,
            &slugs,
            CreateArticle {
                status: ArticleStatus::Draft,
                ..article("تفسير حلم الأسد")
            },
        )
        .unwrap();
        articles::update_article(
            &db,
            &slugs,
            &draft.id,
            UpdateArticle {
                slug: Some("حلم-الاسد".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let response = app.clone().oneshot(get(&article_uri("حلم-الاسد"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // a redirect to a draft does not leak its new slug
        let response = app
            .clone()
            .oneshot(get(&article_uri("تفسير-حلم-الاسد")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        articles::update_article(
            &db,
            &slugs,
            &draft.id,
            UpdateArticle {
                status: Some(ArticleStatus::Published),
                ..Default::default()
            },
        )
        .unwrap();
        let response = app.oneshot(get(&article_uri("حلم-الاسد"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_articles_with_huge_page() {
        let (app, db) = app();
        articles::create_article(&db, &SlugConfig::default(), article("تفسير حلم الأسد")).unwrap();

        let uri = format!("/api/v1/articles?page={}&per_page=50", usize::MAX);
        let response = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"], serde_json::json!([]));
        assert_eq!(body["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_missing_article_is_404() {
        let (app, _db) = app();
        let response = app.oneshot(get(&article_uri("غير-موجود"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_taken_and_invalid_slugs_are_rejected() {
        let (app, _db) = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/articles",
                serde_json::json!({ "title": "تفسير حلم الأسد" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/articles",
                serde_json::json!({ "title": "أسد", "slug": "تفسير-حلم-الاسد" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(post_json(
                "/api/v1/articles",
                serde_json::json!({ "title": "أسد", "slug": "اسد" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_article_endpoint() {
        let (app, db) = app();
        let created =
            articles::create_article(&db, &SlugConfig::default(), article("تفسير حلم الأسد")).unwrap();

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/articles/id/{}", created.id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "title": "رؤية الأسد الغاضب", "regenerate_slug": true }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["slug"], "رؤيه-الاسد-الغاضب");
    }
}
