use gm_api::client::{ApiError, GmApi};
use gm_api::{Conference, SimulateGame, StatCategory};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn validate_key_surfaces_server_detail_on_401() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/validate-key")
        .match_body(Matcher::Json(json!({ "apiKey": "AIzaBAD-key-0000" })))
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Invalid API key"}"#)
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let err = api.validate_key("AIzaBAD-key-0000").await.unwrap_err();
    match err {
        ApiError::Api(status, detail) => {
            assert_eq!(status, 401);
            assert_eq!(detail, "Invalid API key");
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn validate_key_accepts_valid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/validate-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"valid": true}"#)
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    assert!(api.validate_key("AIzaGOODkey123456").await.is_ok());
}

#[tokio::test]
async fn standings_are_split_by_conference() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/standings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "east": [{"team_id": "BOS", "rank": 1, "wins": 10, "losses": 2, "win_pct": 0.833, "gb": 0, "pf": 1300, "pa": 1200, "point_diff": 100, "conference": "East", "division": "Atlantic"}],
                "west": [{"team_id": "DEN", "rank": 1, "wins": 9, "losses": 3, "win_pct": 0.75, "gb": "-", "pf": 1250, "pa": 1180}]
            }"#,
        )
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let standings = api.fetch_standings().await.expect("standings");
    let east = standings.conference(Conference::East);
    assert_eq!(east.len(), 1);
    assert_eq!(east[0].team_id, "BOS");
    assert_eq!(east[0].wins, 10);
    assert_eq!(east[0].games_behind, Some(0.0));
    let west = standings.conference(Conference::West);
    assert_eq!(west[0].games_behind, None);
}

#[tokio::test]
async fn stat_leaders_map_known_categories() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/stats/leaders")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"leaders": {"REB": [{"name": "Big", "team_id": "MIN", "GP": 12, "REB": 13.2}]}, "updated_at": "2025-11-03"}"#)
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let leaders = api.fetch_stat_leaders().await.expect("leaders");
    assert_eq!(leaders.rows(StatCategory::Rebounds)[0].name, "Big");
    assert_eq!(leaders.rows(StatCategory::Rebounds)[0].value, Some(13.2));
    assert!(leaders.rows(StatCategory::Points).is_empty());
}

#[tokio::test]
async fn team_detail_not_found_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/team-detail/XXX")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Team 'XXX' not found"}"#)
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let err = api.fetch_team_detail("XXX").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref msg) if msg.contains("XXX")));
}

#[tokio::test]
async fn first_message_missing_file_is_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/static/prompt/first_messages/BOS.txt")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/static/prompt/first_messages/MIA.txt")
        .with_status(200)
        .with_body("  Welcome to Miami.  \n")
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    assert_eq!(api.fetch_first_message("BOS").await.expect("bos"), None);
    assert_eq!(
        api.fetch_first_message("MIA").await.expect("mia").as_deref(),
        Some("Welcome to Miami.")
    );
}

#[tokio::test]
async fn simulate_game_posts_tactics_and_reads_score() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/simulate-game")
        .match_body(Matcher::PartialJson(json!({
            "home_team_id": "BOS",
            "away_team_id": "NYK",
            "home_tactics": {"pace": 1},
            "game_date": "2025-10-22"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"final_score": {"BOS": 120, "NYK": 111}, "winner": "BOS", "boxscore": {}, "logs": []}"#)
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let request = SimulateGame {
        home_team_id: "BOS".into(),
        away_team_id: "NYK".into(),
        home_tactics: Some(json!({ "pace": 1 })),
        away_tactics: None,
        game_date: Some("2025-10-22".into()),
    };
    let result = api.simulate_game(&request).await.expect("simulate");
    assert_eq!(result.score_for("BOS"), Some(120));
    assert_eq!(result.winner.as_deref(), Some("BOS"));
    mock.assert_async().await;
}

#[tokio::test]
async fn postseason_setup_returns_partial_state() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/postseason/setup")
        .match_body(Matcher::Json(json!({ "my_team_id": "ATL" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "field": {"east": {"auto_bids": [], "play_in": [{"team_id": "ATL", "seed": 7}], "eliminated": []}, "west": null},
                "play_in": {"east": {"conference": "east", "participants": {"7": {"team_id": "ATL", "seed": 7}}, "matchups": {}, "seed7": null, "seed8": null, "eliminated": []}, "west": null},
                "playoffs": null,
                "champion": null,
                "my_team_id": "ATL"
            }"#,
        )
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let ps = api.postseason_setup("ATL").await.expect("setup");
    assert_eq!(ps.my_team_id.as_deref(), Some("ATL"));
    assert!(ps.playoffs.is_none());
    let east = ps.play_in.as_ref().and_then(|p| p.conference(Conference::East));
    assert!(east.is_some_and(|c| c.has_participant("ATL")));
}

#[tokio::test]
async fn server_error_without_detail_keeps_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/teams")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let api = GmApi::new(server.url());
    let err = api.fetch_teams().await.unwrap_err();
    assert!(matches!(err, ApiError::Api(500, _)));
}
