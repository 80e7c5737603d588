use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use chess_game_server::models::AppState;
use chess_game_server::routes::configure_routes;

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new()))
                .configure(configure_routes),
        )
        .await
    };
}

macro_rules! create_game {
    ($app:expr) => {{
        let req = test::TestRequest::put().uri("/game").to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let game: Value = test::read_body_json(resp).await;
        game["id"].as_str().unwrap().to_string()
    }};
}

macro_rules! move_request {
    ($id:expr, $from:expr, $to:expr) => {
        test::TestRequest::post()
            .uri(&format!("/game/{}/{}/move", $id, $from))
            .set_json($to)
            .to_request()
    };
}

#[actix_rt::test]
async fn create_then_fetch_game() {
    let app = init_app!();
    let id = create_game!(app);

    let req = test::TestRequest::get().uri(&format!("/game/{}", id)).to_request();
    let game: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(game["id"], id.as_str());
    assert_eq!(game["moves_count"], 0);
    assert_eq!(game["current_move"], "W");
    assert_eq!(game["is_player_in_check"], json!({"B": false, "W": false}));
    assert_eq!(game["board"][0][4], json!({"kind": "K", "color": "B", "move_count": 0}));
    assert_eq!(game["board"][6][0]["kind"], "P");
    assert!(game["board"][3][3].is_null());
    assert!(game["created_at"].is_i64());
}

#[actix_rt::test]
async fn move_returns_updated_snapshot() {
    let app = init_app!();
    let id = create_game!(app);

    let resp = test::call_service(&app, move_request!(&id, "E2", json!([4, 4]))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let game: Value = test::read_body_json(resp).await;

    assert_eq!(game["moves_count"], 1);
    assert_eq!(game["current_move"], "B");
    assert!(game["board"][6][4].is_null());
    assert_eq!(game["board"][4][4]["move_count"], 1);
    assert_eq!(game["history"][0]["kind"], "double_step");
}

#[actix_rt::test]
async fn rejected_moves_report_kind_and_keep_state() {
    let app = init_app!();
    let id = create_game!(app);

    let resp = test::call_service(&app, move_request!(&id, "E2", json!([3, 4]))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "illegal_move");

    let resp = test::call_service(&app, move_request!(&id, "E7", json!([4, 4]))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "not_your_turn");

    let resp = test::call_service(&app, move_request!(&id, "E4", json!([3, 4]))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "no_piece_at_source");

    let resp = test::call_service(&app, move_request!(&id, "E2", json!([8, 4]))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "invalid_coordinate");

    let resp = test::call_service(&app, move_request!(&id, "Z9", json!([4, 4]))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri(&format!("/game/{}", id)).to_request();
    let game: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(game["moves_count"], 0);
    assert_eq!(game["current_move"], "W");
}

#[actix_rt::test]
async fn invalid_promotion_choice_is_a_bad_request() {
    let app = init_app!();
    let id = create_game!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/game/{}/E2/move?promotion=K", id))
        .set_json(json!([4, 4]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "invalid_query");
    assert!(body["message"].is_string());
}

#[actix_rt::test]
async fn malformed_move_body_is_a_bad_request() {
    let app = init_app!();
    let id = create_game!(app);

    for payload in ["[4,", "{\"rank\": 4}", "[4, 4, 4]"] {
        let req = test::TestRequest::post()
            .uri(&format!("/game/{}/E2/move", id))
            .insert_header(ContentType::json())
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", payload);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "invalid_body", "{}", payload);
    }

    let req = test::TestRequest::get().uri(&format!("/game/{}", id)).to_request();
    let game: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(game["moves_count"], 0);
}

#[actix_rt::test]
async fn unknown_and_malformed_ids() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/game/6f1c8f7e-3b8e-4c55-9f39-8f2a8d7b1c00")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "game_not_found");

    let req = test::TestRequest::get().uri("/game/not-a-game").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn delete_removes_game() {
    let app = init_app!();
    let id = create_game!(app);

    let req = test::TestRequest::delete().uri(&format!("/game/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&format!("/game/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri(&format!("/game/{}", id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn lists_all_games() {
    let app = init_app!();
    let first = create_game!(app);
    let second = create_game!(app);

    let req = test::TestRequest::get().uri("/games").to_request();
    let games: Value = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<&str> = games
        .as_array()
        .unwrap()
        .iter()
        .map(|game| game["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[actix_rt::test]
async fn legal_move_query() {
    let app = init_app!();
    let id = create_game!(app);

    let req = test::TestRequest::get().uri(&format!("/game/{}/G1/moves", id)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["from"], json!([7, 6]));
    assert_eq!(body["moves"], json!([[5, 5], [5, 7]]));

    let req = test::TestRequest::get().uri(&format!("/game/{}/E4/moves", id)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["moves"], json!([]));
}

#[actix_rt::test]
async fn details_reports_version() {
    let app = init_app!();
    for uri in ["/details", "/version"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "chess_game_server");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}

#[actix_rt::test]
async fn concurrent_identical_moves_apply_once() {
    let app = init_app!();
    let id = create_game!(app);

    let requests =
        (0..5).map(|_| test::call_service(&app, move_request!(&id, "E2", json!([4, 4]))));
    let statuses: Vec<StatusCode> = futures::future::join_all(requests)
        .await
        .into_iter()
        .map(|resp| resp.status())
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    // the pawn has already left E2 for every later request
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::UNPROCESSABLE_ENTITY)
            .count(),
        4
    );

    let req = test::TestRequest::get().uri(&format!("/game/{}", id)).to_request();
    let game: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(game["moves_count"], 1);
}

#[actix_rt::test]
async fn scholars_mate_over_http() {
    let app = init_app!();
    let id = create_game!(app);

    let moves = [
        ("E2", [4, 4]),
        ("E7", [3, 4]),
        ("F1", [4, 2]),
        ("F8", [3, 2]),
        ("D1", [3, 7]),
        ("G8", [2, 5]),
        ("H5", [1, 5]),
    ];
    let mut last = Value::Null;
    for (from, to) in moves {
        let resp = test::call_service(&app, move_request!(&id, from, json!(to))).await;
        assert_eq!(resp.status(), StatusCode::OK, "{} rejected", from);
        last = test::read_body_json(resp).await;
    }

    assert_eq!(last["status"], json!({"kind": "checkmate", "winner": "W"}));
    assert_eq!(last["is_player_in_check"]["B"], true);

    let resp = test::call_service(&app, move_request!(&id, "E8", json!([1, 5]))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "game_already_terminal");
}
