mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

async fn seed_substation(app: &axum::Router, token: &str) -> Result<i64> {
    let (status, created) = common::send(
        app,
        "POST",
        "/subestacoes",
        Some(token),
        Some(common::substation_payload("SP1", &[])),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "seed failed: {}", created);
    Ok(created["id"].as_i64().expect("id"))
}

fn network_payload(code: &str, substation_id: Option<i64>) -> Value {
    let mut payload = json!({
        "code": code,
        "name": format!("Feeder {}", code),
        "nominal_voltage": "13.8",
    });
    if let Some(id) = substation_id {
        payload["substation_id"] = json!(id);
    }
    payload
}

#[tokio::test]
async fn crud_flow() -> Result<()> {
    let app = common::test_app();
    let token = common::login(&app).await?;
    let substation_id = seed_substation(&app, &token).await?;

    let (status, created) = common::send(
        &app,
        "POST",
        "/redesmt",
        Some(&token),
        Some(network_payload("MT001", Some(substation_id))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().expect("id");
    assert_eq!(created["code"], json!("MT001"));
    assert_eq!(created["substation_id"].as_i64(), Some(substation_id));

    let (status, listed) = common::send(&app, "GET", "/redesmt", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(|a| a.len()), Some(1));

    let (status, fetched) =
        common::send(&app, "GET", &format!("/redesmt/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], json!("Feeder MT001"));

    let (status, _) =
        common::send(&app, "DELETE", &format!("/redesmt/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        common::send(&app, "GET", &format!("/redesmt/{}", id), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn network_without_substation_is_invalid() -> Result<()> {
    let app = common::test_app();
    let token = common::login(&app).await?;

    let (status, body) = common::send(
        &app,
        "POST",
        "/redesmt",
        Some(&token),
        Some(network_payload("MT001", None)),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!(true));
    Ok(())
}

#[tokio::test]
async fn network_under_missing_substation_is_an_integrity_error() -> Result<()> {
    let app = common::test_app();
    let token = common::login(&app).await?;

    let (status, _) = common::send(
        &app,
        "POST",
        "/redesmt",
        Some(&token),
        Some(network_payload("MT001", Some(99))),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn duplicate_code_within_a_substation_is_rejected() -> Result<()> {
    let app = common::test_app();
    let token = common::login(&app).await?;
    let substation_id = seed_substation(&app, &token).await?;

    common::send(
        &app,
        "POST",
        "/redesmt",
        Some(&token),
        Some(network_payload("MT001", Some(substation_id))),
    )
    .await?;

    let (status, body) = common::send(
        &app,
        "POST",
        "/redesmt",
        Some(&token),
        Some(network_payload("MT001", Some(substation_id))),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!(true));

    let (_, listed) = common::send(&app, "GET", "/redesmt", Some(&token), None).await?;
    assert_eq!(listed.as_array().map(|a| a.len()), Some(1));
    Ok(())
}

#[tokio::test]
async fn out_of_range_voltage_is_rejected() -> Result<()> {
    let app = common::test_app();
    let token = common::login(&app).await?;
    let substation_id = seed_substation(&app, &token).await?;

    let mut payload = network_payload("MT001", Some(substation_id));
    payload["nominal_voltage"] = json!("600.0");
    let (status, _) = common::send(&app, "POST", "/redesmt", Some(&token), Some(payload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
