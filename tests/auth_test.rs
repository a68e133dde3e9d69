#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{call_service, read_body_json, TestRequest};
use atsweb_backend::models::users::{self, Entity as Users, Role};
use atsweb_backend::models::token_blacklist::Entity as TokenBlacklist;
use atsweb_backend::utils::jwt::{self, TokenType};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{json, Value};

use common::{access_token, bearer, seed_user, setup, PASSWORD};

#[actix_web::test]
async fn test_health_endpoints() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    for uri in ["/health", "/api/health", "/api/health/"] {
        let resp = call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);

        let body: Value = read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert!(body["time"].is_string());
    }
}

#[actix_web::test]
async fn test_register_creates_guest() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "Alice@Example.com", "username": "alice", "password": "secret123"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = read_body_json(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password").is_none());

    let id = body["user_id"].as_i64().unwrap() as i32;
    let user = Users::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(user.role, Role::Guest);
    assert!(user.is_active);
    assert!(!user.is_verified);
    assert_ne!(user.password_hash, "secret123");
}

#[actix_web::test]
async fn test_register_validation_errors() {
    let (db, config) = setup().await;
    seed_user(&db, &config, "alice", Role::User).await;
    let app = test_app!(db, config);

    // email déjà pris (casse différente)
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "ALICE@example.com", "username": "alice2", "password": "secret123"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body["fields"]["email"].is_array());

    // username déjà pris
    let req = TestRequest::post()
        .uri("/api/users")
        .set_json(json!({"email": "other@example.com", "username": "alice", "password": "secret123"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert!(body["fields"]["username"].is_array());

    // mot de passe trop court
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "bob@example.com", "username": "bob", "password": "abc"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert!(body["fields"]["password"].is_array());

    // corps invalide
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "bob@example.com"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(Users::find().count(&db).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_register_rejects_blank_username() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "w@x.com", "username": "   ", "password": "secret1"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert!(body["fields"]["username"].is_array());

    // Espaces autour d'un vrai nom : conservé sans les espaces
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "w@x.com", "username": "  walter ", "password": "secret1"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["username"], "walter");

    assert_eq!(Users::find().count(&db).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_login_flow() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let app = test_app!(db, config);

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "Alice@example.com", "password": PASSWORD}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = read_body_json(resp).await;
    assert_eq!(body["user_id"], alice.id);
    assert_eq!(body["role"], "user");

    let access = body["access"].as_str().unwrap();
    let claims = jwt::verify_token(&config, access, TokenType::Access).unwrap();
    assert_eq!(claims.sub, alice.id);
    assert_eq!(claims.role, Role::User);

    let user = Users::find_by_id(alice.id).one(&db).await.unwrap().unwrap();
    assert!(user.last_login.is_some());

    // L'access token donne accès au profil
    let req = TestRequest::get()
        .uri("/api/current-user")
        .insert_header(bearer(access))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_predefined_admin"], false);
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn test_login_failures() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let app = test_app!(db, config);

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "wrong-password"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_credentials");

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "nobody@example.com", "password": PASSWORD}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Compte suspendu : bon mot de passe mais refusé
    let mut model: users::ActiveModel = alice.into();
    model.is_active = Set(false);
    model.update(&db).await.unwrap();

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": PASSWORD}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "account_suspended");
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let app = test_app!(db, config);

    let resp = call_service(&app, TestRequest::get().uri("/api/current-user").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/api/current-user")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Un refresh token n'est pas un access token
    let refresh = jwt::generate_pair(&config, &alice).unwrap().refresh;
    let req = TestRequest::get()
        .uri("/api/current-user")
        .insert_header(bearer(&refresh))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_and_logout() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let app = test_app!(db, config);

    let tokens = jwt::generate_pair(&config, &alice).unwrap();

    let req = TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({"refresh": tokens.refresh}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    let access = body["access"].as_str().unwrap();
    assert!(jwt::verify_token(&config, access, TokenType::Access).is_ok());

    // Un access token ne peut pas servir de refresh token
    let req = TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({"refresh": tokens.access}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Logout sans authentification
    let req = TestRequest::post()
        .uri("/api/auth/logout")
        .set_json(json!({"refresh": tokens.refresh}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Logout (deux fois : idempotent)
    for _ in 0..2 {
        let req = TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(bearer(&tokens.access))
            .set_json(json!({"refresh": tokens.refresh}))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Successfully logged out");
    }
    assert_eq!(TokenBlacklist::find().count(&db).await.unwrap(), 1);

    // Le refresh token révoqué est refusé
    let req = TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({"refresh": tokens.refresh}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_token");
}

#[actix_web::test]
async fn test_logout_rejects_bad_tokens() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let bob = seed_user(&db, &config, "bob", Role::User).await;
    let app = test_app!(db, config);

    let req = TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&access_token(&config, &alice)))
        .set_json(json!({"refresh": "garbage"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Le refresh token d'un autre utilisateur
    let bob_refresh = jwt::generate_pair(&config, &bob).unwrap().refresh;
    let req = TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&access_token(&config, &alice)))
        .set_json(json!({"refresh": bob_refresh}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(TokenBlacklist::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_refresh_uses_current_role_and_status() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::Guest).await;
    let app = test_app!(db, config);

    let refresh = jwt::generate_pair(&config, &alice).unwrap().refresh;

    let mut model: users::ActiveModel = alice.into();
    model.role = Set(Role::Admin);
    let alice = model.update(&db).await.unwrap();

    let req = TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({"refresh": refresh}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    let claims = jwt::verify_token(&config, body["access"].as_str().unwrap(), TokenType::Access).unwrap();
    assert_eq!(claims.role, Role::Admin);

    let mut model: users::ActiveModel = alice.into();
    model.is_active = Set(false);
    model.update(&db).await.unwrap();

    let req = TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({"refresh": refresh}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_concurrent_registration_same_email() {
    let (db, config) = setup().await;
    let app = test_app!(db, config);

    let first = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "dup@example.com", "username": "dup1", "password": "secret123"}))
        .to_request();
    let second = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "dup@example.com", "username": "dup2", "password": "secret123"}))
        .to_request();

    let (a, b) = tokio::join!(call_service(&app, first), call_service(&app, second));

    let mut statuses = vec![a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(Users::find().count(&db).await.unwrap(), 1);
}
