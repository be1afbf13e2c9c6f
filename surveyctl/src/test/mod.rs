//! End-to-end scenarios over the full router, with exports on disk and in-memory token tables.

use std::{path::Path, sync::Arc};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use crate::{
    config::Config,
    db::models::credentials::CredentialRecord,
    test_utils::{StaticCredentials, create_test_config, create_test_router, write_dataset},
};

const M1_EXPORT: &str = "\
ID de la respuesta,Fecha en que se envió,Ultima pagina,Idioma de Inicio,Semilla,\
    Dirección IP,Correo electrónico,¿Cuál es tu municipio?,¿Qué te pareció el módulo?,Comentarios
101,2024-03-01 10:00:00,3,es,12345,10.0.0.1,test@example.com,Oaxaca,Excelente,Muy claro
102,2024-03-02 11:00:00,3,es,67890,10.0.0.2,otra@example.com,Puebla,Bueno,
103,2024-03-05 09:30:00,3,es,13579,10.0.0.3, Test@Example.com ,Oaxaca,Regular,
";

fn credentials() -> Arc<StaticCredentials> {
    Arc::new(
        StaticCredentials::new()
            .with(
                367996,
                [
                    CredentialRecord::new("abc123", "test@example.com"),
                    CredentialRecord::new("zzz999", "otra@example.com"),
                ],
            )
            .with(762638, [CredentialRecord::new("abc123", "test@example.com")])
            .with(156244, [CredentialRecord::new("abc123", "test@example.com")]),
    )
}

fn seed_exports(dir: &Path) {
    write_dataset(dir, "M1 (367996).csv", M1_EXPORT);
    write_dataset(dir, "M2 (762638).csv", "ID de la respuesta,Correo electrónico,P1\n201,otra@example.com,Sí\n");
    write_dataset(dir, "M3 (156244).csv", "ID de la respuesta,Email,P1\n301,test@example.com,Sí\n");
}

fn server_with(config: Config, credentials: Arc<StaticCredentials>) -> TestServer {
    TestServer::new(create_test_router(config, credentials)).expect("Failed to create test server")
}

async fn lookup(server: &TestServer, module: &str, email: &str, token: &str) -> (StatusCode, Value) {
    let response = server
        .post("/api/v1/lookup")
        .json(&json!({ "module": module, "email": email, "token": token }))
        .await;
    let status = response.status_code();
    let body = if status.is_success() || status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
        serde_json::from_str(&response.text()).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    (status, body)
}

/// A respondent with two responses in Módulo 1 sees exactly those two, minus admin columns
#[test_log::test(tokio::test)]
async fn test_e2e_respondent_sees_own_answers() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let server = server_with(create_test_config(dir.path()), credentials());

    let (status, body) = lookup(&server, "Módulo 1", "test@example.com", "abc123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "displaying");
    assert_eq!(body["count"], 2);
    assert_eq!(body["granted"], "Acceso concedido como test@example.com en Módulo 1");
    assert_eq!(body["message"], "Respuestas encontradas: 2");

    let titles: Vec<_> = body["cards"].as_array().unwrap().iter().map(|c| c["title"].clone()).collect();
    assert_eq!(titles, [json!("Respuesta ID: 101"), json!("Respuesta ID: 103")]);

    let questions: Vec<_> = body["cards"][0]["answers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["question"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(questions, ["¿Qué te pareció el módulo?", "Comentarios"]);

    // Response 103 left "Comentarios" blank
    assert_eq!(body["cards"][1]["answers"].as_array().unwrap().len(), 1);

    // Nothing from other respondents leaks
    assert!(!body.to_string().contains("otra@example.com"));
    assert!(!body.to_string().contains("Puebla"));
}

#[test_log::test(tokio::test)]
async fn test_e2e_wrong_token_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let server = server_with(create_test_config(dir.path()), credentials());

    let (status, body) = lookup(&server, "Módulo 1", "test@example.com", "abc12").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["state"], "denied");
    assert_eq!(body["message"], "Credenciales inválidas. Verifica correo o token.");
    assert_eq!(body["count"], 0);
    assert!(body.get("granted").is_none());
}

#[test_log::test(tokio::test)]
async fn test_e2e_another_respondents_token_is_denied() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let server = server_with(create_test_config(dir.path()), credentials());

    let (status, _) = lookup(&server, "Módulo 1", "test@example.com", "zzz999").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_e2e_valid_credentials_without_responses() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let server = server_with(create_test_config(dir.path()), credentials());

    let (status, body) = lookup(&server, "Módulo 2", "test@example.com", "abc123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "empty");
    assert_eq!(body["message"], "No hay respuestas registradas para tu correo en este módulo.");
    assert_eq!(body["cards"], json!([]));
}

#[test_log::test(tokio::test)]
async fn test_e2e_missing_input_prompts() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let credentials = credentials();
    let server = server_with(create_test_config(dir.path()), credentials.clone());

    let (status, body) = lookup(&server, "Módulo 1", "   ", "abc123").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["state"], "awaiting_input");
    assert_eq!(body["message"], "Por favor ingresa tu correo y tu token.");
    assert_eq!(credentials.fetches(), 0);
}

#[test_log::test(tokio::test)]
async fn test_e2e_export_without_email_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let server = server_with(create_test_config(dir.path()), credentials());

    let response = server
        .post("/api/v1/lookup")
        .json(&json!({ "module": "Módulo 3", "email": "test@example.com", "token": "abc123" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "No se encontró columna de correo en el CSV.");
}

#[test_log::test(tokio::test)]
async fn test_e2e_missing_export_fails_without_leaking_path() {
    let dir = tempfile::tempdir().unwrap();
    // no exports written
    let server = server_with(create_test_config(dir.path()), credentials());

    let response = server
        .post("/api/v1/lookup")
        .json(&json!({ "module": "Módulo 1", "email": "test@example.com", "token": "abc123" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.text().contains(&dir.path().display().to_string()));
}

#[test_log::test(tokio::test)]
async fn test_e2e_token_table_is_cached_between_lookups() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let credentials = credentials();
    let server = server_with(create_test_config(dir.path()), credentials.clone());

    for _ in 0..3 {
        let (status, _) = lookup(&server, "Módulo 1", "test@example.com", "abc123").await;
        assert_eq!(status, StatusCode::OK);
    }
    lookup(&server, "Módulo 2", "test@example.com", "abc123").await;

    // one fetch per module
    assert_eq!(credentials.fetches(), 2);
}

#[test_log::test(tokio::test)]
async fn test_e2e_export_is_read_once() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let server = server_with(create_test_config(dir.path()), credentials());

    let (_, before) = lookup(&server, "Módulo 1", "test@example.com", "abc123").await;
    write_dataset(dir.path(), "M1 (367996).csv", "ID de la respuesta,Correo\n");
    let (_, after) = lookup(&server, "Módulo 1", "test@example.com", "abc123").await;

    assert_eq!(before, after);
}

#[test_log::test(tokio::test)]
async fn test_healthz() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(create_test_config(dir.path()), credentials());

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[test_log::test(tokio::test)]
async fn test_metrics_endpoint_counts_lookups() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());
    let mut config = create_test_config(dir.path());
    config.enable_metrics = true;
    let server = server_with(config, credentials());

    lookup(&server, "Módulo 1", "test@example.com", "wrong").await;

    let response = server.get("/internal/metrics").await;
    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("surveyctl_lookups_total"));
    assert!(text.contains("outcome=\"denied\""));
}

#[test_log::test(tokio::test)]
async fn test_metrics_endpoint_absent_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with(create_test_config(dir.path()), credentials());

    server.get("/internal/metrics").await.assert_status(StatusCode::NOT_FOUND);
}
