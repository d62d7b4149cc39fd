//! Mock-based tests for forwarding BibTeX into Zotero.

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crossref_bibliography::client::ZoteroClient;
use crossref_bibliography::config::Config;
use crossref_bibliography::pipeline::forward::{SUCCESS_MESSAGE, forward};

const TWO_ENTRIES: &str = r"
@article{Arute_2019,
  title = {Quantum supremacy using a programmable superconducting processor},
  author = {Arute, Frank and Arya, Kunal},
  journal = {Nature},
  year = {2019},
  doi = {10.1038/s41586-019-1666-5}
}

@book{Nielsen_2010,
  title = {Quantum Computation and Quantum Information},
  author = {Nielsen, Michael A. and Chuang, Isaac L.},
  publisher = {Cambridge University Press},
  year = {2010}
}
";

fn setup_zotero(mock_server: &MockServer) -> ZoteroClient {
    let config = Config::for_testing(&mock_server.uri());
    ZoteroClient::new(&config).unwrap()
}

fn request_body(user: &str) -> Value {
    json!({
        "api_key": "zotero-secret",
        "library_id": "123456",
        "collection_id": "ABCD2345",
        "bibtex": TWO_ENTRIES,
        "user": user
    })
}

fn write_response(successful: usize) -> Value {
    let successful: serde_json::Map<String, Value> =
        (0..successful).map(|i| (i.to_string(), json!({"key": format!("ITEM{i}")}))).collect();
    json!({"successful": successful, "success": {}, "unchanged": {}, "failed": {}})
}

#[tokio::test]
async fn test_forward_to_user_library() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/123456/items"))
        .and(header("Zotero-API-Key", "zotero-secret"))
        .and(header("Zotero-API-Version", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(write_response(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &request_body("user")).await;

    assert_eq!(message, SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_forward_to_group_library() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/groups/123456/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(write_response(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &request_body("group")).await;

    assert_eq!(message, SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_forward_item_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/123456/items"))
        .and(body_partial_json(json!([
            {
                "itemType": "journalArticle",
                "title": "Quantum supremacy using a programmable superconducting processor",
                "publicationTitle": "Nature",
                "DOI": "10.1038/s41586-019-1666-5",
                "collections": ["ABCD2345"]
            }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(write_response(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &request_body("user")).await;

    assert_eq!(message, SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_forward_missing_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(write_response(0)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut body = request_body("user");
    body.as_object_mut().unwrap().remove("api_key");

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &body).await;

    assert_eq!(message, "Please add the missing required parameter: api_key");
}

#[tokio::test]
async fn test_forward_missing_fields_reported_in_order() {
    let mock_server = MockServer::start().await;
    let zotero = setup_zotero(&mock_server);

    let message = forward(&zotero, &json!({"api_key": "k", "bibtex": TWO_ENTRIES})).await;
    assert_eq!(message, "Please add the missing required parameter: library_id");

    let message = forward(&zotero, &json!([])).await;
    assert_eq!(message, "Please add the missing required parameter: api_key");
}

#[tokio::test]
async fn test_forward_unparsable_bibtex() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(write_response(0)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut body = request_body("user");
    body["bibtex"] = json!("no entries in here");

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &body).await;

    assert!(message.starts_with("Error parsing BibTeX data"), "{message}");
}

#[tokio::test]
async fn test_forward_items_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/123456/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "successful": {"0": {"key": "ITEM0"}},
            "unchanged": {},
            "failed": {"1": {"key": "", "code": 400, "message": "Invalid field 'foo'"}}
        })))
        .mount(&mock_server)
        .await;

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &request_body("user")).await;

    assert!(message.starts_with("Error adding items to Zotero"), "{message}");
    assert!(message.contains("1: Invalid field 'foo'"), "{message}");
}

#[tokio::test]
async fn test_forward_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &request_body("user")).await;

    assert!(message.starts_with("Error adding items to Zotero"), "{message}");
}

#[tokio::test]
async fn test_forward_batches_large_collections() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/123456/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(write_response(1)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let bibtex: String = (0..60)
        .map(|i| format!("@misc{{entry{i}, title = {{Entry {i}}}}}\n"))
        .collect();
    let mut body = request_body("user");
    body["bibtex"] = json!(bibtex);

    let zotero = setup_zotero(&mock_server);
    let message = forward(&zotero, &body).await;

    assert_eq!(message, SUCCESS_MESSAGE);
}
