use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use parquet::arrow::ArrowWriter;
use roster::config::Config;
use roster::server::create_app;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

/// Write a 25-row user dataset. Deliberately has no registrationDate
/// column: that column is known to be absent from some upstream files.
fn write_dataset(path: &Path) {
    let mut first_names = vec![
        "Anna".to_string(),
        "Bob".to_string(),
        "Juan".to_string(),
        "Maria".to_string(),
    ];
    for i in 4..25 {
        first_names.push(format!("User{:02}", i));
    }

    let n = first_names.len();
    let last_names: Vec<String> = (0..n).map(|i| format!("Last{:02}", i)).collect();
    let emails: Vec<String> = first_names
        .iter()
        .map(|f| format!("{}@example.com", f.to_lowercase()))
        .collect();
    let genders: Vec<&str> = (0..n)
        .map(|i| if i % 2 == 0 { "Female" } else { "Male" })
        .collect();
    let countries: Vec<&str> = (0..n)
        .map(|i| if i < 10 { "Spain" } else { "Norway" })
        .collect();
    let titles: Vec<&str> = (0..n).map(|_| "Engineer").collect();
    let comments: Vec<&str> = (0..n).map(|_| "imported").collect();
    let birth_dates: Vec<String> = (0..n)
        .map(|i| {
            if i == 0 {
                // month/day/4-digit-year fallback pattern
                "4/7/1983".to_string()
            } else {
                format!("19{:02}-01-15", 70 + (i % 30))
            }
        })
        .collect();
    let salaries: Vec<f64> = (0..n).map(|i| 30000.0 + 1000.0 * i as f64).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("firstName", DataType::Utf8, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("email", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("country", DataType::Utf8, true),
        Field::new("title", DataType::Utf8, true),
        Field::new("comments", DataType::Utf8, true),
        Field::new("birthDate", DataType::Utf8, true),
        Field::new("salary", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(first_names)),
            Arc::new(StringArray::from(last_names)),
            Arc::new(StringArray::from(emails)),
            Arc::new(StringArray::from(genders)),
            Arc::new(StringArray::from(countries)),
            Arc::new(StringArray::from(titles)),
            Arc::new(StringArray::from(comments)),
            Arc::new(StringArray::from(birth_dates)),
            Arc::new(Float64Array::from(salaries)),
        ],
    )
    .unwrap();

    let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn test_app(dir: &TempDir) -> Router {
    let dataset = dir.path().join("userdata.parquet");
    write_dataset(&dataset);

    let mut config = Config::default();
    config.dataset.path = dataset.to_string_lossy().to_string();

    create_app(&config).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").unwrap().as_str().unwrap(), "healthy");
}

#[tokio::test]
async fn test_missing_dataset_refuses_to_start() {
    let mut config = Config::default();
    config.dataset.path = "/nonexistent/userdata.parquet".to_string();
    assert!(create_app(&config).is_err());
}

#[tokio::test]
async fn test_default_page_shape() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/api/userdata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 25);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    // Every record serializes all ten fields under their semantic names
    let first = &body["data"][0];
    for key in [
        "firstName",
        "lastName",
        "email",
        "gender",
        "country",
        "title",
        "comments",
        "registrationDate",
        "birthDate",
        "salary",
    ] {
        assert!(first.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(first["firstName"], "Anna");
}

#[tokio::test]
async fn test_last_page_is_partial() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/api/userdata?page=3&pageSize=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["totalCount"], 25);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 3);
    assert_eq!(body["data"][0]["firstName"], "User20");
}

#[tokio::test]
async fn test_page_beyond_last_is_empty() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/api/userdata?page=100&pageSize=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalCount"], 25);

    // Arbitrarily large page numbers are degenerate, not errors
    let (status, body) = get(
        &app,
        "/api/userdata?page=9223372036854775807&pageSize=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalCount"], 25);
}

#[tokio::test]
async fn test_contains_filter_matches_substring() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/api/userdata?firstName=an").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["firstName"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Anna"));
    assert!(names.contains(&"Juan"));
}

#[tokio::test]
async fn test_zero_match_filter() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/api/userdata?gender=Female&minSalary=500000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalCount"], 0);
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn test_combined_filters() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // Countries: rows 0..10 Spain, rest Norway; even rows Female
    let (status, body) = get(&app, "/api/userdata?country=spain&gender=female").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn test_salary_range_inclusive() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // Salaries are 30000 + 1000*i; bounds land exactly on rows 2 and 4
    let (status, body) = get(&app, "/api/userdata?minSalary=32000&maxSalary=34000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 3);
}

#[tokio::test]
async fn test_birth_date_fallback_parse() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, body) = get(&app, "/api/userdata?firstName=Anna").await;
    let birth = body["data"][0]["birthDate"].as_str().unwrap();
    assert!(birth.starts_with("1983-04-07"), "got {}", birth);
}

#[tokio::test]
async fn test_absent_registration_date_defaults_to_minimum() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, body) = get(&app, "/api/userdata?pageSize=25").await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 25);

    let first = rows[0]["registrationDate"].as_str().unwrap().to_string();
    assert!(first.starts_with('-'), "expected minimum timestamp, got {}", first);
    for row in rows {
        assert_eq!(row["registrationDate"].as_str().unwrap(), first);
    }
}

#[tokio::test]
async fn test_birth_date_range_filter() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    // Only Anna (4/7/1983) was born in April 1983; row 13 is 1983-01-15
    let (status, body) = get(
        &app,
        "/api/userdata?birthDateFrom=1983-04-01&birthDateTo=1983-04-30",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["data"][0]["firstName"], "Anna");
}

#[tokio::test]
async fn test_invalid_page_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, _) = get(&app, "/api/userdata?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/userdata?pageSize=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_date_bound_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, _) = get(&app, "/api/userdata?birthDateFrom=notadate").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_repeated_request_is_identical() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, a) = get(&app, "/api/userdata?firstName=an&page=1&pageSize=2").await;
    let (_, b) = get(&app, "/api/userdata?firstName=an&page=1&pageSize=2").await;
    assert_eq!(a, b);
}
