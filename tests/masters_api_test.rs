use axum::http::{Method, StatusCode};

mod common;
use common::setup;

#[tokio::test]
async fn test_masters_list_in_id_order() {
    let app = setup().await;
    for name in ["Rust", "Go", "Python"] {
        app.skill(name).await;
    }

    let (status, json) = app.get("/masters/skills").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|skill| skill["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Rust", "Go", "Python"]);
}

#[tokio::test]
async fn test_states_embed_country() {
    let app = setup().await;
    let india = app.country("India", "IN").await;
    app.state("Kerala", india).await;

    let (status, json) = app.get("/masters/states").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["name"], "Kerala");
    assert_eq!(json["data"][0]["countryId"], india);
    assert_eq!(json["data"][0]["country"]["name"], "India");
}

#[tokio::test]
async fn test_every_master_kind_is_routed() {
    let app = setup().await;

    for kind in [
        "industries",
        "companies",
        "sectors",
        "services",
        "states",
        "skills",
        "countries",
        "colleges",
    ] {
        let (status, json) = app.get(&format!("/masters/{kind}")).await;
        assert_eq!(status, StatusCode::OK, "{kind}");
        assert!(json["data"].as_array().unwrap().is_empty(), "{kind}");
    }
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup().await;

    let (status, json) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let (status, json) = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let paths = json["paths"].as_object().unwrap();
    for prefix in [
        "/api/v1/directory/students",
        "/api/v1/directory/corporates",
        "/api/v1/directory/colleges",
        "/api/v1/directory/professionals",
        "/api/v1/directory/masters/states",
    ] {
        assert!(
            paths.keys().any(|path| path.starts_with(prefix)),
            "{prefix} missing from {:?}",
            paths.keys().collect::<Vec<_>>()
        );
    }

    let list = paths
        .iter()
        .find(|(path, _)| path.trim_end_matches('/') == "/api/v1/directory/students")
        .map(|(_, item)| item["get"]["responses"]["200"].to_string())
        .unwrap();
    let document = json.to_string();
    assert!(
        list.contains("totalItems") || (list.contains("ListEnvelope") && document.contains("totalItems")),
        "{list}"
    );

    let one = paths
        .iter()
        .find(|(path, _)| path.ends_with("/corporates/{id}"))
        .map(|(_, item)| item["get"]["responses"]["200"].to_string())
        .unwrap();
    assert!(one.contains("DataEnvelope") || one.contains("\"data\""), "{one}");
}
