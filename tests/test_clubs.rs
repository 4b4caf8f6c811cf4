mod common;

use serde_json::{json, Value};

async fn seed(server: &axum_test::TestServer) {
    let clubs = [
        ("Truffle hunt", "tasting", "Alba", 120.0),
        ("Pasta lab", "workshop", "Bologna", 60.0),
        ("Amaro evening", "tasting", "Bologna", 45.0),
        ("Bread school", "workshop", "Alba", 80.0),
    ];
    for (title, kind, location, price) in clubs {
        server
            .post("/api/admin/clubs/add")
            .json(&json!({
                "title": title,
                "description": "Monthly supper club",
                "experienceType": kind,
                "location": location,
                "price": price,
                "capacity": 12
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn default_listing_sorts_by_price_ascending() {
    let env = common::TestEnv::start().await;
    let admin = env.admin_server().await;
    seed(&admin).await;

    let body: Value = env.server().get("/api/shop/clubs/get").await.json();
    assert_eq!(
        titles(&body),
        vec!["Amaro evening", "Pasta lab", "Bread school", "Truffle hunt"]
    );
}

#[tokio::test]
async fn facet_filter_and_title_sort() {
    let env = common::TestEnv::start().await;
    let admin = env.admin_server().await;
    seed(&admin).await;

    let body: Value = env
        .server()
        .get("/api/shop/clubs/get?experience_type=tasting&sortBy=title-atoz")
        .await
        .json();
    assert_eq!(titles(&body), vec!["Amaro evening", "Truffle hunt"]);
}

#[tokio::test]
async fn multiple_facets_must_all_match() {
    let env = common::TestEnv::start().await;
    let admin = env.admin_server().await;
    seed(&admin).await;

    let body: Value = env
        .server()
        .get("/api/shop/clubs/get?experience_type=workshop&location=Alba%2CTurin&sortBy=price-hightolow")
        .await
        .json();
    assert_eq!(titles(&body), vec!["Bread school"]);
}

#[tokio::test]
async fn unknown_facets_and_sorts_are_ignored() {
    let env = common::TestEnv::start().await;
    let admin = env.admin_server().await;
    seed(&admin).await;

    let body: Value = env
        .server()
        .get("/api/shop/clubs/get?colour=red&sortBy=random")
        .await
        .json();
    assert_eq!(titles(&body).len(), 4);
    assert_eq!(titles(&body)[0], "Amaro evening");
}

#[tokio::test]
async fn club_detail_and_negative_price() {
    let env = common::TestEnv::start().await;
    let admin = env.admin_server().await;

    admin
        .post("/api/admin/clubs/add")
        .json(&json!({
            "title": "Free lunch",
            "description": "d",
            "experienceType": "tasting",
            "price": -1
        }))
        .await
        .assert_status_bad_request();

    env.server()
        .get("/api/shop/clubs/get/64b000000000000000000000")
        .await
        .assert_status_not_found();
}
