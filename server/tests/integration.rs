//! Integration Tests for Reefpoint Server
//!
//! These tests verify the full flow of the HTTP endpoints: image and label
//! set management, point generation, CPC upload, and export.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

// ============================================================================
// HTTP Route Integration Tests
// ============================================================================

mod http_routes {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint_returns_ok() {
        let app = create_test_app();

        let (status, json) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_register_and_list_images() {
        let app = create_test_app();

        let (status, image) = post_json(
            &app,
            "/api/images",
            json!({"name": "quad_1.jpg", "width": 2000, "height": 1500}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(image["name"], "quad_1.jpg");
        assert_eq!(image["point_count"], 0);
        assert_eq!(image["status"], "unclassified");
        assert_eq!(image["verbose_status"], "not_started");

        let (status, images) = get_json(&app, "/api/images").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(images.as_array().map(|a| a.len()), Some(1));
    }

    #[tokio::test]
    async fn test_register_duplicate_image_name_rejected() {
        let app = create_test_app();

        let body = json!({"name": "quad_1.jpg", "width": 2000, "height": 1500});
        let (status, _) = post_json(&app, "/api/images", body.clone()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, error) = post_json(&app, "/api/images", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "duplicate_image_name");
    }

    #[tokio::test]
    async fn test_labelset_round_trip() {
        let app = create_test_app();

        let labels = json!({"labels": [
            {"name": "Pocillopora", "code": "POC"},
            {"name": "Crustose coralline algae", "code": "CCA"},
        ]});
        let (status, _) = post_json(&app, "/api/labelset", labels).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(&app, "/api/labelset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["labels"][0]["code"], "POC");
        assert_eq!(body["labels"][1]["code"], "CCA");
    }

    #[tokio::test]
    async fn test_duplicate_label_codes_rejected() {
        let app = create_test_app();

        let labels = json!({"labels": [
            {"name": "A", "code": "POC"},
            {"name": "B", "code": "poc"},
        ]});
        let (status, error) = post_json(&app, "/api/labelset", labels).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "invalid_label_set");
    }

    #[tokio::test]
    async fn test_generate_grid_points() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        let (status, body) = post_json(
            &app,
            &format!("/api/images/{}/points/generate", image_id),
            json!({"mode": "grid", "rows": 2, "columns": 3}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["point_count"], 6);
        assert_eq!(body["points"][0]["number"], 1);

        let (_, annotations) =
            get_json(&app, &format!("/api/images/{}/annotations", image_id)).await;
        assert_eq!(annotations["counts"]["unclassified"], 6);
        assert_eq!(annotations["verbose_status"], "not_started");
    }

    #[tokio::test]
    async fn test_generate_points_unknown_image_is_404() {
        let app = create_test_app();

        let (status, error) = post_json(
            &app,
            "/api/images/00000000-0000-0000-0000-000000000000/points/generate",
            json!({"mode": "random", "count": 10}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["code"], "image_not_found");
    }

    #[tokio::test]
    async fn test_generate_zero_points_rejected() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        let (status, error) = post_json(
            &app,
            &format!("/api/images/{}/points/generate", image_id),
            json!({"mode": "random", "count": 0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "invalid_point_spec");
    }

    #[tokio::test]
    async fn test_annotation_status_progression() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;
        let annotations_uri = format!("/api/images/{}/annotations", image_id);

        post_json(
            &app,
            &format!("/api/images/{}/points/generate", image_id),
            json!({"mode": "grid", "rows": 2, "columns": 2}),
        )
        .await;

        // One machine suggestion: still unclassified, verbose unconfirmed.
        let (status, body) = post_json(
            &app,
            &annotations_uri,
            json!({"point_number": 1, "label_code": "POC", "confirmed": false}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unclassified");
        assert_eq!(body["verbose_status"], "unconfirmed");

        // Machine suggestions everywhere: unconfirmed.
        for point in 2..=4 {
            post_json(
                &app,
                &annotations_uri,
                json!({"point_number": point, "label_code": "CCA", "confirmed": false}),
            )
            .await;
        }
        let (_, body) = get_json(&app, &annotations_uri).await;
        assert_eq!(body["status"], "unconfirmed");
        assert_eq!(body["verbose_status"], "unconfirmed");

        // One human confirmation: partially confirmed.
        let (_, body) = post_json(
            &app,
            &annotations_uri,
            json!({"point_number": 1, "label_code": "POC", "confirmed": true}),
        )
        .await;
        assert_eq!(body["status"], "unconfirmed");
        assert_eq!(body["verbose_status"], "partially_confirmed");

        // All confirmed: confirmed.
        for point in 2..=4 {
            post_json(
                &app,
                &annotations_uri,
                json!({"point_number": point, "label_code": "CCA", "confirmed": true}),
            )
            .await;
        }
        let (_, body) = get_json(&app, &annotations_uri).await;
        assert_eq!(body["status"], "confirmed");
        assert_eq!(body["verbose_status"], "confirmed");
        assert_eq!(body["counts"]["confirmed"], 4);
    }

    #[tokio::test]
    async fn test_set_annotation_unknown_code_rejected() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        post_json(
            &app,
            &format!("/api/images/{}/points/generate", image_id),
            json!({"mode": "grid", "rows": 1, "columns": 1}),
        )
        .await;

        let (status, error) = post_json(
            &app,
            &format!("/api/images/{}/annotations", image_id),
            json!({"point_number": 1, "label_code": "ZZZ", "confirmed": true}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "unknown_label_code");
    }
}

// ============================================================================
// CPC Upload Tests
// ============================================================================

mod cpc_upload {
    use super::*;

    #[tokio::test]
    async fn test_upload_parses_matches_and_commits() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        let (status, body) = post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_and_notes", "files": [
                {"filename": "01.cpc", "content": sample_cpc(r"D:\Site A\Transect 1\01.jpg")},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uploaded"][0]["filename"], "01.cpc");
        assert_eq!(body["uploaded"][0]["image_name"], "Site A/Transect 1/01.jpg");
        assert_eq!(body["uploaded"][0]["point_count"], 2);
        assert_eq!(body["skipped"].as_array().map(|a| a.len()), Some(0));

        let (_, annotations) =
            get_json(&app, &format!("/api/images/{}/annotations", image_id)).await;
        assert_eq!(annotations["points"][0]["row"], 68);
        assert_eq!(annotations["points"][0]["column"], 294);
        assert_eq!(
            annotations["points"][0]["annotation"]["label_code"],
            "POC+BL"
        );
        assert_eq!(annotations["points"][1]["annotation"]["label_code"], "CCA");
        assert_eq!(annotations["status"], "confirmed");
    }

    #[tokio::test]
    async fn test_upload_skips_unmatched_files() {
        let app = create_test_app();
        seed_source(&app).await;

        let (status, body) = post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_and_notes", "files": [
                {"filename": "99.cpc", "content": sample_cpc(r"D:\Site A\Transect 1\99.jpg")},
                {"filename": "01.cpc", "content": sample_cpc(r"D:\Site A\Transect 1\01.jpg")},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skipped"][0], "99.cpc");
        assert_eq!(body["uploaded"].as_array().map(|a| a.len()), Some(1));
    }

    #[tokio::test]
    async fn test_upload_parse_error_aborts_batch() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        let (status, error) = post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_and_notes", "files": [
                {"filename": "01.cpc", "content": sample_cpc(r"D:\Site A\Transect 1\01.jpg")},
                {"filename": "bad.cpc", "content": "\"codes\",\"x.jpg\",17280\r\n"},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "cpc_parse_error");
        assert_eq!(
            error["error"],
            "bad.cpc: Line 1: Expected 6 comma-separated tokens, found 3"
        );

        // No partial commit: the valid first file must not have landed.
        let (_, annotations) =
            get_json(&app, &format!("/api/images/{}/annotations", image_id)).await;
        assert_eq!(annotations["points"].as_array().map(|a| a.len()), Some(0));
    }

    #[tokio::test]
    async fn test_upload_without_label_set_rejected() {
        let app = create_test_app();
        post_json(
            &app,
            "/api/images",
            json!({"name": "01.jpg", "width": 1152, "height": 864}),
        )
        .await;

        let (status, error) = post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_only", "files": [
                {"filename": "01.cpc", "content": sample_cpc(r"D:\01.jpg")},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "no_label_set");
    }

    #[tokio::test]
    async fn test_upload_unknown_label_code_names_point() {
        let app = create_test_app();
        seed_source(&app).await;

        let content = sample_cpc(r"D:\Site A\Transect 1\01.jpg")
            .replace(r#""2","CCA","Notes","""#, r#""2","ZZZ","Notes","""#);
        let (status, error) = post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_and_notes", "files": [
                {"filename": "01.cpc", "content": content},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "cpc_import_error");
        assert_eq!(
            error["error"],
            "01.cpc: Point 2: label code 'ZZZ' is not in the label set"
        );
    }
}

// ============================================================================
// Export Tests
// ============================================================================

mod export {
    use super::*;

    #[tokio::test]
    async fn test_cpc_export_from_scratch() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        post_json(
            &app,
            &format!("/api/images/{}/points/generate", image_id),
            json!({"mode": "grid", "rows": 1, "columns": 1}),
        )
        .await;
        post_json(
            &app,
            &format!("/api/images/{}/annotations", image_id),
            json!({"point_number": 1, "label_code": "POC", "confirmed": true}),
        )
        .await;

        let (status, text) =
            get_text(&app, &format!("/api/images/{}/export.cpc", image_id)).await;
        assert_eq!(status, StatusCode::OK);

        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            lines[0],
            r#""C:\CPCe codes\codes.txt","C:\Reef images\Site A\Transect 1\01.jpg",17280,12960,1152,864"#
        );
        assert_eq!(lines[1], "0,12960");
        assert_eq!(lines[5], "1");
        assert_eq!(lines[7], r#""1","POC","Notes","""#);
        // 1 header + 4 corners + 1 count + 1 position + 1 label + 28 headers
        assert_eq!(text.split("\r\n").count() - 1, 36);
    }

    #[tokio::test]
    async fn test_cpc_export_round_trips_uploaded_file() {
        let app = create_test_app();
        let image_id = seed_source(&app).await;

        let content = sample_cpc(r"D:\Site A\Transect 1\01.jpg");
        let (status, _) = post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_and_notes", "files": [
                {"filename": "01.cpc", "content": content},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, text) = get_text(
            &app,
            &format!("/api/images/{}/export.cpc?policy=id_and_notes", image_id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, content);
    }

    #[tokio::test]
    async fn test_cpc_export_unknown_image_is_404() {
        let app = create_test_app();

        let (status, _) = get_text(
            &app,
            "/api/images/00000000-0000-0000-0000-000000000000/export.cpc",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_csv_export() {
        let app = create_test_app();
        seed_source(&app).await;

        post_json(
            &app,
            "/api/cpc/upload",
            json!({"policy": "id_and_notes", "files": [
                {"filename": "01.cpc", "content": sample_cpc(r"D:\Site A\Transect 1\01.jpg")},
            ]}),
        )
        .await;

        let (status, csv) = get_text(&app, "/api/export/annotations.csv").await;
        assert_eq!(status, StatusCode::OK);

        let lines: Vec<&str> = csv.trim_end().split("\r\n").collect();
        assert_eq!(lines[0], "Name,Row,Column,Label");
        assert_eq!(lines[1], "Site A/Transect 1/01.jpg,68,294,POC+BL");
        assert_eq!(lines[2], "Site A/Transect 1/01.jpg,467,655,CCA");
    }
}
