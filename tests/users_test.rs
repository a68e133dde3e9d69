#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{call_service, read_body_json, TestRequest};
use atsweb_backend::config::BootstrapAdmin;
use atsweb_backend::models::candidature::{self, ApplicationType, Entity as Candidatures};
use atsweb_backend::models::service::{self, Entity as Services};
use atsweb_backend::models::users::{Entity as Users, Role};
use atsweb_backend::services::user_service::UserService;
use atsweb_backend::utils::password;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{json, Value};

use common::{access_token, bearer, seed_user, setup};

#[actix_web::test]
async fn test_list_and_retrieve_users() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    seed_user(&db, &config, "bob", Role::Guest).await;
    let app = test_app!(db, config);

    let resp = call_service(&app, TestRequest::get().uri("/api/users").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = access_token(&config, &alice);
    let req = TestRequest::get().uri("/api/users").insert_header(bearer(&token)).to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    let req = TestRequest::get()
        .uri("/api/users?page=1&page_size=1")
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let req = TestRequest::get()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["email"], "alice@example.com");

    let req = TestRequest::get().uri("/api/users/9999").insert_header(bearer(&token)).to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_self_and_others() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let bob = seed_user(&db, &config, "bob", Role::User).await;
    let admin = seed_user(&db, &config, "boss", Role::Admin).await;
    let app = test_app!(db, config);
    let alice_token = access_token(&config, &alice);

    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&alice_token))
        .set_json(json!({"cv": "cv/alice.pdf", "password": "newsecret"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["cv"], "cv/alice.pdf");

    let stored = Users::find_by_id(alice.id).one(&db).await.unwrap().unwrap();
    assert!(password::verify_password("newsecret", &stored.password_hash).unwrap());

    // Modifier un autre utilisateur
    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", bob.id))
        .insert_header(bearer(&alice_token))
        .set_json(json!({"cv": "cv/other.pdf"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Se promouvoir soi-même
    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&alice_token))
        .set_json(json!({"role": "admin"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Email déjà utilisé
    let req = TestRequest::put()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&alice_token))
        .set_json(json!({"email": "bob@example.com"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Un admin change le rôle
    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", bob.id))
        .insert_header(bearer(&access_token(&config, &admin)))
        .set_json(json!({"role": "guest", "is_verified": true}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["role"], "guest");
    assert_eq!(body["is_verified"], true);
}

#[actix_web::test]
async fn test_admin_actions_require_admin() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let bob = seed_user(&db, &config, "bob", Role::User).await;
    let app = test_app!(db, config);
    let token = access_token(&config, &alice);

    for action in ["suspend", "activate", "set-admin"] {
        let req = TestRequest::post()
            .uri(&format!("/api/users/{}/{}", bob.id, action))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", action);
    }

    let req = TestRequest::delete()
        .uri(&format!("/api/users/{}", bob.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let stored = Users::find_by_id(bob.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::User);
    assert!(stored.is_active);
}

#[actix_web::test]
async fn test_suspend_activate_and_promote() {
    let (db, config) = setup().await;
    let admin = seed_user(&db, &config, "boss", Role::Admin).await;
    let bob = seed_user(&db, &config, "bob", Role::Guest).await;
    let app = test_app!(db, config);
    let token = access_token(&config, &admin);

    let req = TestRequest::post()
        .uri(&format!("/api/users/{}/suspend", bob.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["user"]["is_active"], false);

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "bob@example.com", "password": common::PASSWORD}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::post()
        .uri(&format!("/api/users/{}/activate", bob.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri(&format!("/api/users/{}/set-admin", bob.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["is_active"], true);

    let req = TestRequest::post()
        .uri("/api/users/9999/suspend")
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_protected_accounts() {
    let (db, config) = setup().await;
    let admin = seed_user(&db, &config, "boss", Role::Admin).await;
    let protected = seed_user(&db, &config, "admin1", Role::Admin).await;
    let app = test_app!(db, config);
    let token = access_token(&config, &admin);

    for action in ["suspend", "activate", "set-admin"] {
        let req = TestRequest::post()
            .uri(&format!("/api/users/{}/{}", protected.id, action))
            .insert_header(bearer(&token))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", action);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["code"], "protected_resource");
    }

    let req = TestRequest::delete()
        .uri(&format!("/api/users/{}", protected.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", protected.id))
        .insert_header(bearer(&token))
        .set_json(json!({"role": "guest"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get()
        .uri(&format!("/api/users/{}", protected.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["is_predefined_admin"], true);
    assert_eq!(body["role"], "admin");

    assert!(Users::find_by_id(protected.id).one(&db).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_protected_account_checked_before_role() {
    let (db, config) = setup().await;
    let member = seed_user(&db, &config, "alice", Role::User).await;
    let protected = seed_user(&db, &config, "admin1", Role::Admin).await;
    let app = test_app!(db, config);
    let token = access_token(&config, &member);

    let req = TestRequest::post()
        .uri(&format!("/api/users/{}/suspend", protected.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "protected_resource");

    let req = TestRequest::delete()
        .uri(&format!("/api/users/{}", protected.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "protected_resource");

    let stored = Users::find_by_id(protected.id).one(&db).await.unwrap().unwrap();
    assert!(stored.is_active);
}

#[actix_web::test]
async fn test_account_changes_apply_to_issued_tokens() {
    let (db, config) = setup().await;
    let admin = seed_user(&db, &config, "boss", Role::Admin).await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let other_admin = seed_user(&db, &config, "chief", Role::Admin).await;
    let app = test_app!(db, config);
    let admin_token = access_token(&config, &admin);
    let alice_token = access_token(&config, &alice);
    let chief_token = access_token(&config, &other_admin);

    let req = TestRequest::post()
        .uri(&format!("/api/users/{}/suspend", alice.id))
        .insert_header(bearer(&admin_token))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

    // Token émis avant la suspension
    let req = TestRequest::post()
        .uri("/api/temoignages")
        .insert_header(bearer(&alice_token))
        .set_json(json!({"nom": "Alice", "description": "Merci"}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["code"], "account_suspended");

    // Token émis avant la rétrogradation
    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", other_admin.id))
        .insert_header(bearer(&admin_token))
        .set_json(json!({"role": "user"}))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri("/api/services")
        .insert_header(bearer(&chief_token))
        .set_json(json!({"titre": "Audit", "description": "..."}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Token d'un compte supprimé
    let req = TestRequest::delete()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&admin_token))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = TestRequest::get()
        .uri("/api/current-user")
        .insert_header(bearer(&alice_token))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_patch_blank_username_and_clear_cv() {
    let (db, config) = setup().await;
    let alice = seed_user(&db, &config, "alice", Role::User).await;
    let app = test_app!(db, config);
    let token = access_token(&config, &alice);

    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&token))
        .set_json(json!({"username": "   "}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_body_json(resp).await;
    assert!(body["fields"]["username"].is_array());

    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&token))
        .set_json(json!({"cv": "cv/alice.pdf"}))
        .to_request();
    let body: Value = read_body_json(call_service(&app, req).await).await;
    assert_eq!(body["cv"], "cv/alice.pdf");

    // Champ absent : cv conservé
    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&token))
        .set_json(json!({"is_verified": null}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["cv"], "cv/alice.pdf");

    // null : cv effacé
    let req = TestRequest::patch()
        .uri(&format!("/api/users/{}", alice.id))
        .insert_header(bearer(&token))
        .set_json(json!({"cv": null}))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    assert!(body["cv"].is_null());

    let stored = Users::find_by_id(alice.id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.cv, None);
}

#[actix_web::test]
async fn test_delete_user_keeps_content() {
    let (db, config) = setup().await;
    let admin = seed_user(&db, &config, "boss", Role::Admin).await;
    let writer = seed_user(&db, &config, "writer", Role::User).await;

    let now = Utc::now();
    let written = service::ActiveModel {
        titre: Set("Audit".to_string()),
        img: Set(None),
        description: Set("Audit de sécurité".to_string()),
        heure_cree: Set(now),
        heure_modifiee: Set(now),
        auteur_id: Set(Some(writer.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    candidature::ActiveModel {
        user_id: Set(writer.id),
        cv: Set(None),
        application_type: Set(ApplicationType::Emploi),
        start_month: Set("Mars 2026".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let app = test_app!(db, config);

    let req = TestRequest::delete()
        .uri(&format!("/api/users/{}", writer.id))
        .insert_header(bearer(&access_token(&config, &admin)))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert!(Users::find_by_id(writer.id).one(&db).await.unwrap().is_none());
    let kept = Services::find_by_id(written.id).one(&db).await.unwrap().unwrap();
    assert_eq!(kept.auteur_id, None);
    assert_eq!(Candidatures::find().count(&db).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_ensure_admin_is_idempotent() {
    let (db, config) = setup().await;
    let admin = BootstrapAdmin {
        email: "Root@Example.com".to_string(),
        username: "root".to_string(),
        password: "changeme".to_string(),
    };

    let first = UserService::ensure_admin(&db, &config, &admin).await.unwrap();
    assert_eq!(first.role, Role::Admin);
    assert_eq!(first.email, "root@example.com");
    assert!(password::verify_password("changeme", &first.password_hash).unwrap());

    let second = UserService::ensure_admin(&db, &config, &admin).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(Users::find().count(&db).await.unwrap(), 1);
}
