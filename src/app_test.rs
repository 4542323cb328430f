use crate::{
    app::App,
    handlers::{handle_chat_event, render_game},
    puzzle::Catalog,
    selector::{default_epoch, Clock},
    validator::{Oracle, Validator, WordList},
};
use log::*;
use mobot::*;

fn test_app() -> App {
    let catalog = Catalog::from_json(
        r#"[
            {"id": 8, "image": "/images/lake.jpg", "answer": "Lake", "hint": "Still waters"},
            {"id": 9, "image": "/images/tower.jpg", "answer": "Tower"}
        ]"#,
    )
    .unwrap();

    let mut app = App::new("Seecret".into(), catalog);
    app.set_validator(Validator::new(Oracle::WordList(WordList::new([
        "pods", "land", "lake",
    ]))));
    app.set_clock(Clock::fixed(default_epoch()));
    app
}

#[tokio::test]
async fn starts_today_puzzle() {
    let mut app = test_app();
    assert!(app.game().is_none());

    let game = app.start_game("42").unwrap();
    let view = game.view().await;
    assert_eq!(view.puzzle_id, 8);
    assert_eq!(view.buffer.len(), 4);
    assert!(app.game().is_some());

    let text = render_game(&view);
    assert!(text.contains("Puzzle #8 (4 letters)"));
    assert!(text.contains("Hint: Still waters"));
    assert!(text.contains("Guesses left: 6"));
}

#[tokio::test]
async fn renders_feedback() {
    let mut app = test_app();
    let game = app.start_game("42").unwrap();
    game.guess("land").await.unwrap();

    let text = render_game(&game.view().await);
    assert!(text.contains("\u{1F1F1} \u{1F1E6} \u{1F1F3} \u{1F1E9}"));
    assert!(text.contains("\u{1F7E9} \u{1F7E9} \u{2B1B} \u{2B1B}"));
    assert!(text.contains("In the word: A L"));
    assert!(text.contains("Not in the word: D N"));
    assert!(text.contains("Letters left: B C E F G H I J K M O"));

    game.toggle_high_contrast().await;
    let text = render_game(&game.view().await);
    assert!(text.contains("\u{1F7E7} \u{1F7E7} \u{2B1B} \u{2B1B}"));
}

#[tokio::test]
async fn it_works() {
    mobot::init_logger();

    // Create a FakeAPI and attach it to the client. Any Telegram requests are now forwarded
    // to `fakeserver` instead.
    let fakeserver = fake::FakeAPI::new();
    let client = Client::new("token".to_string()).with_post_handler(fakeserver.clone());

    // Keep the Telegram poll timeout short for testing. The default Telegram poll timeout is 60s.
    let mut router = Router::new(client)
        .with_state(test_app())
        .with_poll_timeout_s(1);

    router.add_route(Route::Message(Matcher::Any), handle_chat_event);

    // Since we're passing ownership of the Router to a background task, grab the
    // shutdown channels so we can shut it down from this task.
    let (shutdown_notifier, shutdown_tx) = router.shutdown();

    // Start the router in a background task.
    tokio::spawn(async move {
        info!("Starting router...");
        router.start().await;
    });

    let chat = fakeserver.create_chat("qubyte").await;

    // The first message starts today's puzzle.
    chat.send_text("hello").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("Welcome to Seecret"));
    assert!(reply.contains("4-letter word"));

    chat.send_text("zzzz").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("Not in word list"));

    chat.send_text("land").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("2 of 4 letters in place"));

    // Build the next guess a letter at a time.
    chat.send_text("l").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("Your word: L _ _ _"));

    chat.send_text("x").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("Your word: L X _ _"));

    chat.send_text("/back").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("Your word: L _ _ _"));

    for letter in ["a", "k", "e"] {
        chat.send_text(letter).await.unwrap();
        chat.recv_update().await.unwrap();
    }

    chat.send_text("/enter").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("You won!"));

    chat.send_text("/next").await.unwrap();
    let reply = chat.recv_update().await.unwrap().to_string();
    assert!(reply.contains("Puzzle #9"));

    // All done shutdown the router, and wait for it to complete.
    info!("Shutting down...");
    shutdown_tx.send(()).await.unwrap();
    shutdown_notifier.notified().await;
}
