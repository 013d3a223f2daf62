#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use trikona_directory::{
    AppConfig, AppState, app, database,
    entities::{
        college_master, company_master, country, industry, sector, service, skill, state, user,
    },
};

pub const BASE: &str = "/api/v1/directory";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

pub async fn setup() -> TestApp {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    database::create_tables(&db)
        .await
        .expect("Failed to create schema");
    let router = app(AppState::new(db.clone(), AppConfig::default()));
    TestApp { router, db }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({status}): {}", String::from_utf8_lossy(&bytes))
            })
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, &format!("{BASE}{path}"), None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, &format!("{BASE}{path}"), Some(body))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, &format!("{BASE}{path}"), Some(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, &format!("{BASE}{path}"), None)
            .await
    }

    /// POST and return the created record's id, failing loudly on anything but 201.
    pub async fn create(&self, path: &str, body: Value) -> i64 {
        let (status, json) = self.post(path, body).await;
        assert_eq!(status, StatusCode::CREATED, "create {path} failed: {json}");
        json["data"]["id"].as_i64().expect("created record has an id")
    }

    pub async fn user(&self, first_name: &str, last_name: &str) -> i32 {
        user::ActiveModel {
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            email: Set(format!(
                "{}.{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase()
            )),
            role: Set("member".to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert user")
        .id
    }

    pub async fn skill(&self, name: &str) -> i32 {
        skill::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert skill")
        .id
    }

    pub async fn college_master(&self, name: &str) -> i32 {
        college_master::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert college master")
        .id
    }

    pub async fn company(&self, name: &str) -> i32 {
        company_master::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert company")
        .id
    }

    pub async fn industry(&self, name: &str) -> i32 {
        industry::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert industry")
        .id
    }

    pub async fn sector(&self, name: &str) -> i32 {
        sector::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert sector")
        .id
    }

    pub async fn service(&self, name: &str) -> i32 {
        service::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert service")
        .id
    }

    pub async fn country(&self, name: &str, iso_code: &str) -> i32 {
        country::ActiveModel {
            name: Set(name.to_owned()),
            iso_code: Set(iso_code.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert country")
        .id
    }

    pub async fn state(&self, name: &str, country_id: i32) -> i32 {
        state::ActiveModel {
            name: Set(name.to_owned()),
            country_id: Set(country_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert state")
        .id
    }
}

/// Sorted ids of a list response's `data`.
pub fn ids(json: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = json["data"]
        .as_array()
        .expect("data is an array")
        .iter()
        .map(|item| item["id"].as_i64().expect("item has an id"))
        .collect();
    ids.sort_unstable();
    ids
}
