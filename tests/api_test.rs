//! Router level tests: status codes and JSON shapes of the public API

mod common;

use hyper::{Method, StatusCode};
use serde_json::json;

use common::{app, idea_body, PASSWORD};
use ideagram::db::catalog;
use ideagram::routes::ApiRequest;

#[test]
fn test_health_and_unknown_routes() {
    let app = app();

    let reply = app.call(ApiRequest::new(Method::GET, "/health"));
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["healthy"], true);
    assert_eq!(reply.body["database"], true);

    let reply = app.call(ApiRequest::new(Method::GET, "/api/nothing/here/"));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.call(ApiRequest::new(Method::OPTIONS, "/api/idea/"));
    assert_eq!(reply.status, StatusCode::OK);
}

#[test]
fn test_missing_or_bad_token_is_unauthorized() {
    let app = app();

    let reply = app.call(ApiRequest::new(Method::GET, "/api/user/profile/"));
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app.get("/api/user/profile/", "not-a-jwt");
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_register_login_refresh_verify() {
    let app = app();
    app.register("alice");

    let reply = app.call(ApiRequest::new(Method::POST, "/api/user/register/").with_json(&json!({
        "email": "alice@ideagram.test",
        "username": "alice",
        "password": PASSWORD,
    })));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["email"][0], "email Already Taken");
    assert_eq!(reply.body["username"][0], "profile with this username already exists.");

    let reply = app.call(ApiRequest::new(Method::POST, "/api/auth/jwt/login/").with_json(&json!({
        "username": "alice",
        "password": "wrong-Pass1!",
    })));
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app.call(ApiRequest::new(Method::POST, "/api/auth/jwt/login/").with_json(&json!({
        "username": "alice",
        "password": PASSWORD,
    })));
    assert_eq!(reply.status, StatusCode::OK);
    let refresh = reply.body["refresh"].as_str().unwrap().to_string();

    let reply = app.call(
        ApiRequest::new(Method::POST, "/api/auth/jwt/refresh/").with_json(&json!({ "refresh": refresh })),
    );
    assert_eq!(reply.status, StatusCode::OK);
    let access = reply.body["access"].as_str().unwrap().to_string();

    let reply = app.call(
        ApiRequest::new(Method::POST, "/api/auth/jwt/verify/").with_json(&json!({ "token": access })),
    );
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app.call(
        ApiRequest::new(Method::POST, "/api/auth/jwt/verify/").with_json(&json!({ "token": "garbage" })),
    );
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_unverified_member_cannot_publish() {
    let mut app = app();
    let token = app.register("bob");
    assert_eq!(app.flush_emails(), 1);
    let sent = app.mailer.sent();
    assert_eq!(sent[0].to, "bob@ideagram.test");
    assert!(sent[0].content.contains("/profile/verification/"));

    let reply = app.post("/api/idea/", &token, idea_body("Street trees"));
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // Reading the own profile only needs a valid token
    let reply = app.get("/api/user/profile/", &token);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["username"], "bob");

    app.verify("bob");
    app.create_idea(&token, "Street trees");
}

#[test]
fn test_bad_verification_link() {
    let app = app();
    let reply = app.call(ApiRequest::new(Method::GET, "/profile/verification/deadbeef"));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, "Invalid verification URL!");
}

#[test]
fn test_create_idea_persists_input_without_touching_idea_count() {
    let app = app();
    let token = app.member("carol");
    let music = app
        .state
        .services
        .db
        .transaction(|conn| catalog::create_classification(conn, "music"))
        .unwrap();

    let mut body = idea_body("Open air concerts");
    body["classification"] = json!([music.id]);
    let reply = app.post("/api/idea/", &token, body);
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    assert_eq!(reply.body["title"], "Open air concerts");
    assert_eq!(reply.body["goal"], "Make the neighbourhood greener");
    assert_eq!(reply.body["abstract"], "Plant trees along every street");
    assert_eq!(reply.body["max_donation"], 500);
    assert_eq!(reply.body["classification"], json!([music.id]));

    let id = reply.body["id"].as_str().unwrap();
    let reply = app.get(&format!("/api/idea/{}/", id), &token);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["title"], "Open air concerts");

    let reply = app.get("/api/user/profile/", &token);
    assert_eq!(reply.body["idea_count"], 0);

    let mut body = idea_body("Bad tag");
    body["classification"] = json!(["does-not-exist"]);
    let reply = app.post("/api/idea/", &token, body);
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_forbidden_word_blocks_idea_before_write() {
    let app = app();
    let token = app.member("dave");
    app.state.services.moderation.add_word("scam").unwrap();

    let reply = app.post("/api/idea/", &token, idea_body("Totally not a SCAM"));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["title"].is_array());

    let reply = app.get("/api/user/profile/dave/ideas/", &token);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
}

#[test]
fn test_follow_statuses_and_counters() {
    let app = app();
    let erin = app.member("erin");
    app.member("frank");

    let reply = app.post("/api/user/follow/nobody/", &erin, json!({}));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.post("/api/user/follow/erin/", &erin, json!({}));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.post("/api/user/follow/frank/", &erin, json!({}));
    assert_eq!(reply.status, StatusCode::CREATED);
    let reply = app.post("/api/user/follow/frank/", &erin, json!({}));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.get("/api/user/profile/", &erin).body["following_count"], 1);
    assert_eq!(app.get("/api/user/profile/frank/", &erin).body["follower_count"], 1);
    let followers = app.get("/api/user/profile/frank/followers/", &erin).body;
    assert_eq!(followers.as_array().unwrap().len(), 1);
    assert_eq!(followers[0]["username"], "erin");

    let reply = app.delete("/api/user/follow/frank/", &erin);
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/api/user/profile/", &erin).body["following_count"], 0);
    assert_eq!(app.get("/api/user/profile/frank/", &erin).body["follower_count"], 0);

    let reply = app.delete("/api/user/follow/frank/", &erin);
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_duplicate_step_priority_rejected() {
    let app = app();
    let token = app.member("gina");
    let idea = app.create_idea(&token, "Community garden");
    let path = format!("/api/idea/{}/evolution/", idea);

    let step = json!({ "title": "Find land", "description": "Ask the council", "priority": 1 });
    let reply = app.post(&path, &token, step.clone());
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);

    let reply = app.post(&path, &token, step);
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["detail"], "invalid priority: 1");

    let steps = app.get(&path, &token).body;
    assert_eq!(steps.as_array().unwrap().len(), 1);

    // A list is stored all or nothing
    let reply = app.post(
        &path,
        &token,
        json!([
            { "title": "Buy seeds", "description": "Local shop", "priority": 2 },
            { "title": "Duplicate", "description": "Clashes", "priority": 1 },
        ]),
    );
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get(&path, &token).body.as_array().unwrap().len(), 1);
}

#[test]
fn test_wrong_old_password_keeps_hash() {
    let app = app();
    let token = app.member("hank");

    let reply = app.put(
        "/api/user/profile/",
        &token,
        json!({ "bio": "changed", "old_password": "Wrong!pass1", "new_password": "N3w!password" }),
    );
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["old_password"].is_array());

    let reply = app.call(ApiRequest::new(Method::POST, "/api/auth/jwt/login/").with_json(&json!({
        "username": "hank",
        "password": PASSWORD,
    })));
    assert_eq!(reply.status, StatusCode::OK);
    assert_ne!(app.get("/api/user/profile/", &token).body["bio"], "changed");
}

#[test]
fn test_password_reset_flow() {
    let mut app = app();
    app.member("iris");
    app.flush_emails();

    let reply = app.call(
        ApiRequest::new(Method::POST, "/api/user/password/reset/")
            .with_json(&json!({ "email": "iris@ideagram.test" })),
    );
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(app.flush_emails(), 1);
    let content = app.mailer.sent().last().unwrap().content.clone();
    let start = content.find("<strong>").unwrap() + "<strong>".len();
    let code = content[start..start + 6].to_string();

    let confirm = |code: &str| {
        app.call(
            ApiRequest::new(Method::POST, "/api/user/password/reset/confirm/").with_json(&json!({
                "email": "iris@ideagram.test",
                "code": code,
                "password": "Br4nd!new",
            })),
        )
    };
    let wrong = if code == "000000" { "111111" } else { "000000" };
    assert_eq!(confirm(wrong).status, StatusCode::BAD_REQUEST);
    assert_eq!(confirm(&code).status, StatusCode::OK);

    let reply = app.call(ApiRequest::new(Method::POST, "/api/auth/jwt/login/").with_json(&json!({
        "username": "iris",
        "password": "Br4nd!new",
    })));
    assert_eq!(reply.status, StatusCode::OK);

    // Unknown addresses answer the same way
    let reply = app.call(
        ApiRequest::new(Method::POST, "/api/user/password/reset/")
            .with_json(&json!({ "email": "ghost@ideagram.test" })),
    );
    assert_eq!(reply.status, StatusCode::OK);
}

#[test]
fn test_reports_deactivate_idea() {
    let app = app();
    let owner = app.member("judy");
    let reporter = app.member("kyle");
    let idea = app.create_idea(&owner, "Bike repair stand");

    for _ in 0..11 {
        let reply = app.post(
            "/api/report/idea/",
            &reporter,
            json!({ "idea": idea, "report_reasons": "spam" }),
        );
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    assert_eq!(app.get(&format!("/api/idea/{}/", idea), &reporter).status, StatusCode::NOT_FOUND);
    let reply = app.get(&format!("/api/idea/{}/", idea), &owner);
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["is_active"], false);

    let reply = app.post(
        "/api/report/profile/",
        &reporter,
        json!({ "profile_username": "judy", "report_reasons": "not a reason" }),
    );
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_idea_sub_resources() {
    let app = app();
    let owner = app.member("lena");
    let fan = app.member("mike");
    let idea = app.create_idea(&owner, "Tool library");

    let reply = app.post(&format!("/api/idea/{}/like/", idea), &fan, json!({}));
    assert_eq!(reply.status, StatusCode::CREATED);
    let reply = app.post(&format!("/api/idea/{}/like/", idea), &fan, json!({}));
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.post(
        &format!("/api/idea/{}/comment/", idea),
        &fan,
        json!({ "comment": "Count me in" }),
    );
    assert_eq!(reply.status, StatusCode::CREATED);
    let comment_id = reply.body["id"].as_str().unwrap().to_string();

    let reply = app.post(&format!("/api/idea/{}/donation/", idea), &fan, json!({ "amount": 50 }));
    assert_eq!(reply.status, StatusCode::CREATED);

    let view = app.get(&format!("/api/idea/{}/", idea), &owner).body;
    assert_eq!(view["likes_count"], 1);
    assert_eq!(view["comments_count"], 1);
    assert_eq!(view["total_donation"], 50);

    let reply = app.put(
        &format!("/api/idea/{}/", idea),
        &owner,
        json!({ "show_likes": false }),
    );
    assert_eq!(reply.status, StatusCode::OK);
    let reply = app.get(&format!("/api/idea/{}/like/", idea), &fan);
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert!(app.get(&format!("/api/idea/{}/", idea), &fan).body.get("likes_count").is_none());

    // Only the owner may change the idea
    let reply = app.put(&format!("/api/idea/{}/", idea), &fan, json!({ "title": "Mine now" }));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.delete(&format!("/api/idea/comment/{}/", comment_id), &owner);
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = app.delete(&format!("/api/idea/{}/", idea), &owner);
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&format!("/api/idea/{}/", idea), &owner).status, StatusCode::NOT_FOUND);
}

#[test]
fn test_links_and_public_lists() {
    let app = app();
    let token = app.member("nora");

    let reply = app.post(
        "/api/user/links/",
        &token,
        json!({ "type": "github", "link": "https://github.com/nora", "priority": 1 }),
    );
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    let link_id = reply.body["id"].as_str().unwrap().to_string();

    let reply = app.post(
        "/api/user/links/",
        &token,
        json!({ "type": "myspace", "link": "https://myspace.com/nora", "priority": 2 }),
    );
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.get("/api/user/links/", &token).body.as_array().unwrap().len(), 1);
    assert_eq!(
        app.delete(&format!("/api/user/links/{}/", link_id), &token).status,
        StatusCode::NO_CONTENT
    );

    let reply = app.call(ApiRequest::new(Method::GET, "/api/idea/classification/list"));
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
    let reply = app.call(ApiRequest::new(Method::GET, "/api/idea/organization/list"));
    assert_eq!(reply.status, StatusCode::OK);
}
