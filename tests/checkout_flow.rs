use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use venue_planner::cart::CartService;
use venue_planner::error::EngineError;
use venue_planner::layout::RoomLayout;
use venue_planner::models::{PaymentItem, Room, Seat, Sector, SectorKind};
use venue_planner::sync::{self, ApiClient, PaymentDetails, RoomSession};

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("venue_planner=debug"))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn seat(id: i64, row: i32, col: i32, sector_id: i64) -> Seat {
    Seat {
        id: Some(id),
        row_number: row,
        column_number: col,
        deleted: false,
        sector_id: Some(sector_id),
        room_id: Some(1),
    }
}

// The 3×2 room from the acceptance scenario: one 2×2 seated sector at
// price 10 and one standing sector (capacity 50, price 5) in column 3.
fn scenario_room() -> Room {
    let mut room = Room::new("Club stage", 3, 2);
    room.id = Some(1);
    room.sectors.push(Sector {
        id: Some(10),
        kind: SectorKind::Seated,
        name: Some("Floor".to_string()),
        price: Some(10),
        capacity: None,
        seats: vec![
            seat(1, 1, 1, 10),
            seat(2, 1, 2, 10),
            seat(3, 2, 1, 10),
            seat(4, 2, 2, 10),
        ],
    });
    room.sectors.push(Sector {
        id: Some(20),
        kind: SectorKind::Standing,
        name: Some("Pit".to_string()),
        price: Some(5),
        capacity: Some(50),
        seats: vec![seat(5, 1, 3, 20), seat(6, 2, 3, 20)],
    });
    room.refresh_seats();
    room
}

fn payment() -> PaymentDetails {
    PaymentDetails {
        email: "buyer@example.com".into(),
        address: "Main St 1".into(),
        city: "Vienna".into(),
        zip_code: "1010".into(),
        card_number: "4111111111111111".into(),
        card_expiry: "12/30".into(),
        card_cvc: "123".into(),
    }
}

#[tokio::test]
async fn buyer_selects_seats_and_checks_out() {
    init_tracing();
    let room = scenario_room();
    let mut cart = CartService::in_memory();

    // Geometry: grid matches room dimensions, one group of each kind,
    // distinct colors, standing block spanning its placeholders.
    let layout = RoomLayout::build(&room, cart.items());
    assert_eq!((layout.columns, layout.rows), (3, 2));
    assert_eq!(layout.seated.len(), 1);
    assert_eq!(layout.standing.len(), 1);
    assert_ne!(layout.colors[0], layout.colors[1]);
    let rect = layout.standing[0].rect.unwrap();
    assert_eq!((rect.min_col, rect.max_col), (3, 3));

    // Seat (1,1) of the seated sector, then the standing sector ×3.
    cart.add(PaymentItem::Seated {
        show_id: 100,
        sector_id: 10,
        seat_id: 1,
        price: 10,
        row: 1,
        column: 1,
    });
    cart.add(PaymentItem::Standing { show_id: 100, sector_id: 20, price: 5, quantity: 3 });
    assert_eq!(cart.total(), 25);

    // Selection highlighting follows the cart.
    let layout = RoomLayout::build(&room, cart.items());
    assert!(layout.selected_seat_ids.contains(&1));
    assert!(layout.selected_standing_sector_ids.contains(&20));

    // Dropping the seated selection leaves the standing total.
    cart.remove(&PaymentItem::Seated {
        show_id: 100,
        sector_id: 10,
        seat_id: 1,
        price: 10,
        row: 1,
        column: 1,
    });
    assert_eq!(cart.total(), 15);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(serde_json::json!({
            "showId": 100,
            "targets": [{"type": "standing", "sectorId": 20, "quantity": 3}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"orderId": 77})))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri(), std::time::Duration::from_secs(5));
    let confirmation = sync::submit_cart(&api, &mut cart, 100, payment()).await.unwrap();
    assert_eq!(confirmation.order_id, 77);
    assert!(cart.items().is_empty());
    assert!(cart.reserved_ticket_ids().is_empty());
}

#[tokio::test]
async fn room_save_is_a_full_replace_whose_response_becomes_truth() {
    init_tracing();
    let server = MockServer::start().await;

    let mut canonical = scenario_room();
    canonical.name = "Club stage (renamed upstream)".to_string();

    Mock::given(method("PUT"))
        .and(path("/rooms/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&canonical))
        .expect(1)
        .mount(&server)
        .await;

    let mut edited = scenario_room();
    edited.sectors[0].seats.push(Seat::new(2, 3, Some(10), Some(1)));
    edited.refresh_seats();

    let api = ApiClient::new(server.uri(), std::time::Duration::from_secs(5));
    let mut session = RoomSession::new(edited);
    sync::save_room(&mut session, &api).await.unwrap();

    // Local state is whatever the backend answered, nothing merged.
    assert_eq!(session.room(), &canonical);
    assert_eq!(session.generation(), 1);
}

#[tokio::test]
async fn engine_state_opens_a_room_from_the_backend() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rooms/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scenario_room()))
        .mount(&server)
        .await;

    let config = venue_planner::config::Config {
        app: venue_planner::config::AppConfig { rust_log: "venue_planner=debug".into() },
        backend: venue_planner::config::BackendConfig {
            base_url: server.uri(),
            timeout_seconds: 5,
        },
        storage: venue_planner::config::StorageConfig { cart_dir: None },
    };
    let engine = venue_planner::EngineState::new(config);
    let session = engine.open_room(1).await.unwrap();
    assert_eq!(session.room().name, "Club stage");
    assert_eq!(session.generation(), 0);
}

#[tokio::test]
async fn new_room_is_created_with_a_post() {
    init_tracing();
    let server = MockServer::start().await;
    let mut canonical = scenario_room();
    canonical.id = Some(42);

    Mock::given(method("POST"))
        .and(path("/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&canonical))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri(), std::time::Duration::from_secs(5));
    let mut unsaved = scenario_room();
    unsaved.id = None;
    let mut session = RoomSession::new(unsaved);
    sync::save_room(&mut session, &api).await.unwrap();
    assert_eq!(session.room().id, Some(42));
}

#[tokio::test]
async fn backend_error_message_is_extracted_and_local_edit_survives() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rooms/1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(serde_json::json!({"message": "Room is full"})),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri(), std::time::Duration::from_secs(5));
    let mut session = RoomSession::new(scenario_room());
    session.room_mut().name = "edited locally".to_string();

    let err = sync::save_room(&mut session, &api).await.unwrap_err();
    match err {
        EngineError::Backend { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Room is full");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // The failed save neither reverted the edit nor left the guard held.
    assert_eq!(session.room().name, "edited locally");
    session.begin_save().unwrap();
}

#[tokio::test]
async fn converting_a_reservation_sends_only_its_ticket_ids() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(serde_json::json!({"reservedTicketIds": [7, 8]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"orderId": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cart = CartService::in_memory();
    // Items from the reservation are shown in the cart, but the request
    // must reference the held tickets instead of fresh targets.
    cart.add(PaymentItem::Seated {
        show_id: 100,
        sector_id: 10,
        seat_id: 5,
        price: 10,
        row: 1,
        column: 1,
    });
    cart.set_reserved_tickets(vec![7, 8]);

    let api = ApiClient::new(server.uri(), std::time::Duration::from_secs(5));
    sync::submit_cart(&api, &mut cart, 100, payment()).await.unwrap();
    assert!(cart.items().is_empty());
    assert!(cart.reserved_ticket_ids().is_empty());
}
