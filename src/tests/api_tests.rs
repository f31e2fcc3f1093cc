#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};

    use crate::metadata::test_support::write_png_with_text;
    use crate::tests::support::{body_bytes, body_json, put_file, put_image, relpaths, set_mtime, TestApp};

    fn seed_five(app: &TestApp) {
        for (i, name) in ["a.png", "b.png", "c.png", "d.png", "e.png"].iter().enumerate() {
            put_file(app.output(), name, b"x", 100 + i as u64);
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let app = TestApp::new();
        seed_five(&app);
        put_file(app.output(), "notes.txt", b"x", 500);

        let res = app.get("/assets_plus/output/list").await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(relpaths(&json), vec!["e.png", "d.png", "c.png", "b.png", "a.png"]);
        assert_eq!(json["has_more"], false);
        assert!(json.get("cursor").is_none());
        assert_eq!(json["newest_mtime"], 104);
        assert_eq!(json["items"][0]["type"], "image");
        assert_eq!(json["items"][0]["filename"], "e.png");
    }

    #[tokio::test]
    async fn test_cursor_walk_visits_every_item_once() {
        let app = TestApp::new();
        seed_five(&app);
        // Gleiche mtime: Reihenfolge über relpath
        put_file(app.output(), "sub/z.png", b"x", 102);

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..10 {
            let uri = match &cursor {
                Some(c) => format!("/assets_plus/output/list?limit=2&cursor={}", c),
                None => "/assets_plus/output/list?limit=2".to_string(),
            };
            let json = body_json(app.get(&uri).await).await;
            seen.extend(relpaths(&json));
            if json["has_more"] == false {
                assert!(json.get("cursor").is_none());
                break;
            }
            cursor = Some(json["cursor"].as_str().unwrap().to_string());
        }
        assert_eq!(seen, vec!["e.png", "d.png", "c.png", "sub/z.png", "b.png", "a.png"]);
    }

    #[tokio::test]
    async fn test_poll_since_is_inclusive() {
        let app = TestApp::new();
        seed_five(&app);
        let json = body_json(app.get("/assets_plus/output/list?since=103").await).await;
        assert_eq!(relpaths(&json), vec!["e.png", "d.png"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_query() {
        let app = TestApp::new();
        put_file(app.output(), "a.png", b"x", 10);
        put_file(app.output(), "b.JPG", b"x", 11);
        put_file(app.output(), "deep/er/c.png", b"x", 12);

        let jpg = body_json(app.get("/assets_plus/output/list?extensions=jpg").await).await;
        assert_eq!(relpaths(&jpg), vec!["b.JPG"]);

        let flat = body_json(app.get("/assets_plus/output/list?recursive=false").await).await;
        assert_eq!(relpaths(&flat), vec!["b.JPG", "a.png"]);

        let shallow = body_json(app.get("/assets_plus/output/list?scan_depth=1").await).await;
        assert_eq!(relpaths(&shallow), vec!["b.JPG", "a.png"]);

        let unlimited = body_json(app.get("/assets_plus/output/list?scan_depth=-1").await).await;
        assert_eq!(relpaths(&unlimited).len(), 3);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_parameters() {
        let app = TestApp::new();
        assert_eq!(app.get("/assets_plus/elsewhere/list").await.status(), StatusCode::NOT_FOUND);

        let res = app.get("/assets_plus/output/list?cursor=nonsense").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"]["code"], "VALIDATION_ERROR");

        assert_eq!(app.get("/assets_plus/output/list?limit=ten").await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_config_json_shapes_the_listing() {
        let app = TestApp::new();
        seed_five(&app);
        std::fs::write(
            app.state.config.storage.panel_config_path(),
            json!({"list_limit": "2", "allowed_extensions": ["webp"]}).to_string(),
        )
        .unwrap();
        put_file(app.output(), "f.webp", b"x", 1);

        let cfg = body_json(app.get("/assets_plus/config").await).await;
        assert_eq!(cfg["list_limit"], 2);
        assert_eq!(cfg["allowed_extensions"], json!([".webp"]));

        let json = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(relpaths(&json), vec!["f.webp"]);
    }

    #[tokio::test]
    async fn test_thumbnail_is_rendered_then_cached() {
        let app = TestApp::new();
        put_image(app.output(), "big.png", 200, 100, 50);

        let res = app.get("/assets_plus/output/thumb?relpath=big.png&w=64&h=64").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "private, max-age=604800");
        let png = body_bytes(res).await;
        let thumb = image::load_from_memory(&png).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (64, 32));

        let again = app.get("/assets_plus/output/thumb?relpath=big.png&w=64&h=64").await;
        assert_eq!(again.status(), StatusCode::OK);
        let m = app.state.metrics.get_snapshot();
        assert_eq!(m.thumbnails_rendered, 1);
        assert_eq!(m.thumb_cache_hits, 1);
    }

    #[tokio::test]
    async fn test_thumbnail_errors() {
        let app = TestApp::new();
        put_file(app.output(), "broken.png", b"not really a png", 1);

        assert_eq!(
            app.get("/assets_plus/output/thumb?relpath=broken.png").await.status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        let missing_param = app.get("/assets_plus/output/thumb").await;
        assert_eq!(missing_param.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(missing_param).await["error"]["message"], "relpath is required");
        assert_eq!(app.get("/assets_plus/output/thumb?relpath=gone.png").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            app.get("/assets_plus/output/thumb?relpath=../user/x.png").await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_video_thumbnail_is_the_file() {
        let app = TestApp::new();
        put_file(app.input(), "clip.mp4", b"fake video bytes", 1);
        let res = app.get("/assets_plus/input/thumb?relpath=clip.mp4").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_bytes(res).await, b"fake video bytes");
    }

    #[tokio::test]
    async fn test_meta_returns_embedded_workflow() {
        let app = TestApp::new();
        write_png_with_text(&app.output().join("wf.png"), &[("workflow", "{\"nodes\":[]}"), ("parameters", "x")]);

        let json = body_json(app.get("/assets_plus/output/meta?relpath=wf.png").await).await;
        assert_eq!(json["relpath"], "wf.png");
        assert_eq!(json["metadata"], json!({"workflow": "{\"nodes\":[]}"}));

        let list = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(list["items"][0]["has_workflow"], true);
    }

    #[tokio::test]
    async fn test_file_supports_ranges() {
        let app = TestApp::new();
        put_file(app.output(), "a.webp", b"0123456789", 1);

        let full = app.get("/assets_plus/output/file?relpath=a.webp").await;
        assert_eq!(full.status(), StatusCode::OK);
        assert_eq!(body_bytes(full).await, b"0123456789");

        let req = Request::builder()
            .uri("/assets_plus/output/file?relpath=a.webp")
            .header(header::RANGE, "bytes=2-4")
            .body(Body::empty())
            .unwrap();
        let part = app.send(req).await;
        assert_eq!(part.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_bytes(part).await, b"234");
    }

    #[tokio::test]
    async fn test_hide_then_regenerate() {
        let app = TestApp::new();
        put_file(app.output(), "a.png", b"x", 10);
        put_file(app.output(), "b.png", b"x", 11);

        let res = app
            .post_json("/assets_plus/output/delete", json!({"relpaths": ["a.png", "missing.png"], "mode": "hide"}))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json, json!({"removed": ["a.png"], "failed": ["missing.png"], "mode": "hide"}));
        assert!(app.output().join("a.png").exists());
        assert!(app.state.config.storage.hidden_index_path().exists());

        let list = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(relpaths(&list), vec!["b.png"]);

        // Neu erzeugt: andere mtime, wieder sichtbar
        set_mtime(&app.output().join("a.png"), 20);
        let list = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(relpaths(&list), vec!["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn test_hidden_markers_are_per_root() {
        let app = TestApp::new();
        put_file(app.output(), "same.png", b"x", 10);
        put_file(app.input(), "same.png", b"x", 10);

        app.post_json("/assets_plus/input/delete", json!({"relpaths": ["same.png"], "mode": "hide"})).await;

        let input = body_json(app.get("/assets_plus/input/list").await).await;
        assert!(relpaths(&input).is_empty());
        let output = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(relpaths(&output), vec!["same.png"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_assets_delete_and_hide_the_link_only() {
        let app = TestApp::new();
        put_file(app.output(), "real.png", b"pixels", 10);
        std::os::unix::fs::symlink(app.output().join("real.png"), app.output().join("link.png")).unwrap();
        std::os::unix::fs::symlink(app.output().join("real.png"), app.output().join("alias.png")).unwrap();

        let list = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(relpaths(&list), vec!["alias.png", "link.png", "real.png"]);

        let json = body_json(
            app.post_json("/assets_plus/output/delete", json!({"relpaths": ["link.png"], "mode": "trash"})).await,
        )
        .await;
        assert_eq!(json["removed"], json!(["link.png"]));
        assert!(std::fs::symlink_metadata(app.output().join("link.png")).is_err());
        assert_eq!(std::fs::read(app.output().join("real.png")).unwrap(), b"pixels");

        app.post_json("/assets_plus/output/delete", json!({"relpaths": ["alias.png"], "mode": "hide"})).await;
        let list = body_json(app.get("/assets_plus/output/list").await).await;
        assert_eq!(relpaths(&list), vec!["real.png"]);
    }

    #[tokio::test]
    async fn test_delete_uses_configured_default_mode() {
        let app = TestApp::new();
        put_file(app.output(), "a.png", b"x", 10);
        std::fs::write(
            app.state.config.storage.panel_config_path(),
            json!({"default_delete_mode": "delete"}).to_string(),
        )
        .unwrap();

        let json = body_json(app.post_json("/assets_plus/output/delete", json!({"relpaths": ["a.png"]})).await).await;
        assert_eq!(json["mode"], "delete");
        assert_eq!(json["removed"], json!(["a.png"]));
        assert!(!app.output().join("a.png").exists());
        assert_eq!(app.state.metrics.get_snapshot().files_deleted, 1);
    }

    #[tokio::test]
    async fn test_delete_validates_body() {
        let app = TestApp::new();
        let not_list = app.post_json("/assets_plus/output/delete", json!({"relpaths": "a.png"})).await;
        assert_eq!(not_list.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(not_list).await["error"]["message"], "relpaths must be a list");

        let bad_mode = app.post_json("/assets_plus/output/delete", json!({"relpaths": [], "mode": "shred"})).await;
        assert_eq!(bad_mode.status(), StatusCode::BAD_REQUEST);

        let empty = body_json(app.post_json("/assets_plus/output/delete", json!({"mode": "delete"})).await).await;
        assert_eq!(empty, json!({"removed": [], "failed": [], "mode": "delete"}));

        let mixed = body_json(
            app.post_json("/assets_plus/output/delete", json!({"relpaths": [7, "../x.png"], "mode": "delete"})).await,
        )
        .await;
        assert_eq!(mixed["failed"], json!(["../x.png", "7"]));
    }

    #[tokio::test]
    async fn test_i18n_negotiates_locale() {
        let app = TestApp::new();
        let de = body_json(app.get("/assets_plus/i18n?locale=de-AT").await).await;
        assert_eq!(de["locale"], "de");
        assert_eq!(de["messages"]["confirm.cancel"], "Abbrechen");

        let fallback = body_json(app.get("/assets_plus/i18n?locale=tlh").await).await;
        assert_eq!(fallback["locale"], "en");

        let default = body_json(app.get("/assets_plus/i18n").await).await;
        assert_eq!(default["locale"], "en");
    }

    #[tokio::test]
    async fn test_thumb_clear_empties_cache() {
        let app = TestApp::new();
        put_image(app.output(), "a.png", 40, 40, 1);
        put_image(app.input(), "b.png", 40, 40, 1);
        app.get("/assets_plus/output/thumb?relpath=a.png").await;
        app.get("/assets_plus/input/thumb?relpath=b.png").await;

        let res = app.post_json("/assets_plus/thumb/clear", Value::Null).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["removed"], 2);
        assert!(json["freed_bytes"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_bearer_token_guards_panel_api() {
        let app = TestApp::with_config(|cfg| {
            if let Some(security) = cfg.security.as_mut() {
                security.auth_token = Some("s3cret".to_string());
            }
        });

        assert_eq!(app.get("/assets_plus/config").await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.get("/healthz").await.status(), StatusCode::OK);

        let req = Request::builder()
            .uri("/assets_plus/config")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(req).await.status(), StatusCode::OK);
    }
}
