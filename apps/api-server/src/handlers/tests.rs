use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};
use actix_http::Request;
use serde_json::{Value, json};

use super::configure_routes;
use crate::state::AppState;

async fn app() -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::in_memory()))
            .configure(configure_routes),
    )
    .await
}

async fn send<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_author<S>(app: &S, first: &str, last: &str, user_name: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/authors").set_json(json!({
            "firstName": first,
            "lastName": last,
            "userName": user_name
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn create_post<S>(app: &S, author_id: &str, title: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/posts").set_json(json!({
            "title": title,
            "content": "C",
            "author": author_id,
            "created": "2024-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn id_of(record: &Value) -> String {
    record["id"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn test_author_then_post_scenario() {
    let app = app().await;

    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    assert_eq!(ada["firstName"], "Ada");
    assert_eq!(ada["lastName"], "Lovelace");
    assert_eq!(ada["userName"], "ada");
    let ada_id = id_of(&ada);

    let post = create_post(&app, &ada_id, "T").await;
    assert_eq!(post["title"], "T");
    assert_eq!(post["content"], "C");
    assert_eq!(post["author"], "Ada Lovelace");
    assert_eq!(post["created"], "2024-01-01T00:00:00.000Z");

    let uri = format!("/posts/{}", id_of(&post));
    let (status, first) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["author"], "Ada Lovelace");
    assert_eq!(first, post);

    let (_, second) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(first, second);
}

#[actix_web::test]
async fn test_post_accepts_author_id_and_hides_comments() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;

    let (status, post) = send(
        &app,
        test::TestRequest::post().uri("/posts").set_json(json!({
            "title": "T",
            "content": "C",
            "author_id": id_of(&ada),
            "created": "2024-01-01T10:30:00Z",
            "comments": [{"content": "first!"}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["author"], "Ada Lovelace");
    assert!(post.get("comments").is_none());
    assert_eq!(post.as_object().unwrap().len(), 5);
}

#[actix_web::test]
async fn test_create_post_missing_field_persists_nothing() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/posts").set_json(json!({
            "title": "T",
            "author": id_of(&ada),
            "created": "2024-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing `content` in request body");

    let (_, list) = send(&app, test::TestRequest::get().uri("/posts")).await;
    assert_eq!(list["posts"], json!([]));
}

#[actix_web::test]
async fn test_create_post_rejects_unknown_author() {
    let app = app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/posts").set_json(json!({
            "title": "T",
            "content": "C",
            "author": uuid::Uuid::new_v4().to_string(),
            "created": "2024-01-01"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("does not exist"));
}

#[actix_web::test]
async fn test_create_post_rejects_bad_values() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;

    for body in [
        json!({"title": "T", "content": "C", "author": id_of(&ada), "created": "someday"}),
        json!({"title": "", "content": "C", "author": id_of(&ada), "created": "2024-01-01"}),
        json!({"title": "T", "content": "C", "author": "not-an-id", "created": "2024-01-01"}),
    ] {
        let (status, reply) =
            send(&app, test::TestRequest::post().uri("/posts").set_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(reply["message"].is_string());
    }
}

#[actix_web::test]
async fn test_create_author_missing_field() {
    let app = app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/authors")
            .set_json(json!({"firstName": "Ada", "userName": "ada"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing `lastName` in request body");

    let (_, list) = send(&app, test::TestRequest::get().uri("/authors")).await;
    assert_eq!(list["authors"], json!([]));
}

#[actix_web::test]
async fn test_duplicate_user_name_rejected() {
    let app = app().await;
    create_author(&app, "Ada", "Lovelace", "ada").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/authors").set_json(json!({
            "firstName": "Ada",
            "lastName": "King",
            "userName": "ada"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username ada already taken");
}

#[actix_web::test]
async fn test_update_post_id_mismatch_leaves_record() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    let post = create_post(&app, &id_of(&ada), "T").await;
    let uri = format!("/posts/{}", id_of(&post));

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"id": "something-else", "title": "Changed"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("must match"));

    let (status, _) = send(
        &app,
        test::TestRequest::put().uri(&uri).set_json(json!({"title": "Changed"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(stored, post);
}

#[actix_web::test]
async fn test_update_post_applies_allow_list_only() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    let post = create_post(&app, &id_of(&ada), "T").await;
    let id = id_of(&post);
    let uri = format!("/posts/{id}");

    let (status, body) = send(
        &app,
        test::TestRequest::put().uri(&uri).set_json(json!({
            "id": id,
            "title": "New title",
            "author": uuid::Uuid::new_v4().to_string(),
            "created": "1999-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, stored) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(stored["title"], "New title");
    assert_eq!(stored["content"], "C");
    assert_eq!(stored["author"], "Ada Lovelace");
    assert_eq!(stored["created"], "2024-01-01T00:00:00.000Z");
}

#[actix_web::test]
async fn test_update_missing_post_is_not_found() {
    let app = app().await;
    let id = uuid::Uuid::new_v4().to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/posts/{id}"))
            .set_json(json!({"id": id, "title": "T"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

#[actix_web::test]
async fn test_update_author_user_name_uniqueness() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    create_author(&app, "Grace", "Hopper", "grace").await;
    let id = id_of(&ada);
    let uri = format!("/authors/{id}");

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"id": id, "userName": "grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"id": id, "userName": "ada", "lastName": "King"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stored) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(stored["lastName"], "King");
    assert_eq!(stored["userName"], "ada");
}

#[actix_web::test]
async fn test_update_author_id_mismatch_leaves_record() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    let uri = format!("/authors/{}", id_of(&ada));

    let (status, body) = send(
        &app,
        test::TestRequest::put().uri(&uri).set_json(json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "lastName": "King"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("must match"));

    let (status, _) = send(
        &app,
        test::TestRequest::put().uri(&uri).set_json(json!({"lastName": "King"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(stored, ada);
}

#[actix_web::test]
async fn test_update_missing_author_is_not_found() {
    let app = app().await;
    create_author(&app, "Grace", "Hopper", "grace").await;
    let id = uuid::Uuid::new_v4().to_string();
    let uri = format!("/authors/{id}");

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"id": id, "lastName": "King"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");

    // A taken userName does not mask the missing record.
    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"id": id, "userName": "grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

#[actix_web::test]
async fn test_delete_missing_author_is_idempotent() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    let missing = format!("/authors/{}", uuid::Uuid::new_v4());

    for _ in 0..2 {
        let (status, body) = send(&app, test::TestRequest::delete().uri(&missing)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }
    let (status, _) = send(&app, test::TestRequest::delete().uri("/authors/not-an-id")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let uri = format!("/authors/{}", id_of(&ada));
    let (status, stored) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, ada);
}

#[actix_web::test]
async fn test_delete_is_idempotent() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    let post = create_post(&app, &id_of(&ada), "T").await;
    let uri = format!("/posts/{}", id_of(&post));

    for _ in 0..2 {
        let (status, _) = send(&app, test::TestRequest::delete().uri(&uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = send(&app, test::TestRequest::delete().uri("/posts/not-an-id")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_author_cascades_to_posts() {
    let app = app().await;
    let ada = create_author(&app, "Ada", "Lovelace", "ada").await;
    let grace = create_author(&app, "Grace", "Hopper", "grace").await;
    let ada_posts = [
        create_post(&app, &id_of(&ada), "A1").await,
        create_post(&app, &id_of(&ada), "A2").await,
    ];
    let grace_post = create_post(&app, &id_of(&grace), "G1").await;

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/authors/{}", id_of(&ada))),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for post in &ada_posts {
        let uri = format!("/posts/{}", id_of(post));
        let (status, _) = send(&app, test::TestRequest::get().uri(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, list) = send(&app, test::TestRequest::get().uri("/posts")).await;
    assert_eq!(list["posts"], json!([grace_post]));

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri(&format!("/authors/{}", id_of(&ada))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_lists_are_capped() {
    let app = app().await;
    let mut first_author = None;
    for i in 0..12 {
        let author = create_author(&app, "Writer", &i.to_string(), &format!("writer{i}")).await;
        first_author.get_or_insert(id_of(&author));
    }
    let author_id = first_author.unwrap();
    for i in 0..7 {
        create_post(&app, &author_id, &format!("post {i}")).await;
    }

    let (status, posts) = send(&app, test::TestRequest::get().uri("/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posts["posts"].as_array().unwrap().len(), 5);

    let (status, authors) = send(&app, test::TestRequest::get().uri("/authors")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authors["authors"].as_array().unwrap().len(), 10);
}

#[actix_web::test]
async fn test_unknown_routes_and_verbs_are_not_found() {
    let app = app().await;

    for req in [
        test::TestRequest::get().uri("/comments"),
        test::TestRequest::patch().uri("/posts"),
        test::TestRequest::post().uri("/authors/123"),
    ] {
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Not found"}));
    }
}

#[actix_web::test]
async fn test_get_unknown_ids_are_not_found() {
    let app = app().await;

    for uri in [
        format!("/posts/{}", uuid::Uuid::new_v4()),
        "/authors/not-an-id".to_string(),
    ] {
        let (status, body) = send(&app, test::TestRequest::get().uri(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not found");
    }
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let app = app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/authors")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let app = app().await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}
