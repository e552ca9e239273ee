use crate::helpers::spawn_app;
use test_case::test_case;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let response = app
        .api_client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok", "message": "API is running"}));
}

#[test_case("GET", "/does-not-exist"; "unknown_path")]
#[test_case("POST", "/api/unknown"; "unknown_api_path")]
#[test_case("GET", "/api/subscribe"; "get_on_subscribe")]
#[test_case("PUT", "/api/subscribe"; "put_on_subscribe")]
#[test_case("DELETE", "/health"; "delete_on_health")]
#[test_case("POST", "/health"; "post_on_health")]
#[tokio::test]
async fn undefined_routes_return_404(method: &str, path: &str) {
    let app = spawn_app().await;
    let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
    let response = app
        .api_client
        .request(method, format!("{}{}", app.address, path))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"success": false, "error": "Endpoint not found"}));
}
