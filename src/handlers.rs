use anyhow::anyhow;
use log::*;
use mobot::{api::User, *};

use crate::app::*;
use crate::error::PlayError;
use crate::evaluator::{KeyHint, Letter};
use crate::session::{Move, Phase, SessionView, MAX_ATTEMPTS};

/// emoji_letter takes a capital letter and returns the corresponding emoji letter
/// inside the Regional Indicator Symbol range.
fn emoji_letter(l: char) -> char {
    let base = 0x1F1E6;
    let a = 'A' as u32;
    let target = l.to_ascii_uppercase() as u32;

    std::char::from_u32(base + target - a).unwrap_or('?')
}

/// feedback_square is the colored tile for a letter. High contrast swaps green
/// and yellow for orange and blue.
fn feedback_square(letter: &Letter, high_contrast: bool) -> &'static str {
    match (letter, high_contrast) {
        (Letter::Correct(_), false) => "\u{1F7E9}",
        (Letter::Correct(_), true) => "\u{1F7E7}",
        (Letter::CorrectButWrongPosition(_), false) => "\u{1F7E8}",
        (Letter::CorrectButWrongPosition(_), true) => "\u{1F7E6}",
        (Letter::Wrong(_), _) => "\u{2B1B}",
    }
}

fn letters(set: &std::collections::BTreeSet<char>) -> String {
    set.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}

/// render_game takes a SessionView and returns a string representation of it.
/// Emoji codepoints: https://emojipedia.org/emoji/
pub fn render_game(view: &SessionView) -> String {
    let mut s = format!(
        "Puzzle #{} ({} letters)\n{}\nBlur: {}\n",
        view.puzzle_id, view.answer_len, view.image, view.blur
    );
    if let Some(hint) = &view.hint {
        s.push_str(&format!("Hint: {}\n", hint));
    }

    if !view.history.is_empty() {
        s.push('\n');
    }
    for attempt in &view.history {
        for letter in &attempt.letters {
            s.push_str(&format!("{} ", emoji_letter(letter.char())));
        }
        s.push('\n');
        for letter in &attempt.letters {
            s.push_str(feedback_square(letter, view.high_contrast));
            s.push(' ');
        }
        s.push_str("\n\n");
    }

    if !view.hints.present.is_empty() {
        s.push_str(&format!("In the word: {}\n", letters(&view.hints.present)));
    }
    if !view.hints.absent.is_empty() {
        s.push_str(&format!("Not in the word: {}\n", letters(&view.hints.absent)));
    }
    if view.phase == Phase::Playing {
        if view.buffer.iter().any(Option::is_some) {
            let typed: Vec<String> = view
                .buffer
                .iter()
                .map(|c| c.map(String::from).unwrap_or_else(|| "_".into()))
                .collect();
            s.push_str(&format!("Your word: {}\n", typed.join(" ")));
        }
        if !view.history.is_empty() {
            let untried: Vec<String> = ('A'..='Z')
                .filter(|c| view.hints.key(*c) == KeyHint::Unknown)
                .map(|c| c.to_string())
                .collect();
            s.push_str(&format!("Letters left: {}\n", untried.join(" ")));
        }
        s.push_str(&format!("Guesses left: {}\n", view.attempts_left));
    }
    s
}

pub async fn handle_new_game(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the sender's first name
    let from = e.update.get_message()?.clone().from.unwrap_or_default();

    // Get the application state
    let mut app = state.get().write().await;
    let game = match app.game() {
        Some(game) => game,
        None => app.start_game(&from.id.to_string())?,
    };
    let view = game.view().await;

    info!(
        "Starting game with {} ({}), puzzle {}.",
        from.first_name,
        from.username.clone().unwrap_or("unknown".into()),
        view.puzzle_id
    );

    let streak = if view.streak == 0 {
        "No streak yet, win today to start one.".to_string()
    } else {
        format!("Your streak: {} days.", view.streak)
    };

    Ok(Action::ReplyText(format!(
        "Hi {}, Welcome to {}!\n\n{}\nGuess the {}-letter word behind the picture. The more letters you get in place, the clearer it gets.\n\n{}",
        from.first_name,
        app.game_name,
        streak,
        view.answer_len,
        render_game(&view)
    )))
}

pub async fn handle_bot_command(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the command
    let command = e
        .update
        .get_message()?
        .text
        .clone()
        .ok_or(anyhow!("No command"))?;

    let game = state.get().read().await.game();
    let reply = match (command.as_str(), game) {
        ("/help", _) => {
            let game_name = state.get().read().await.game_name.clone();
            format!(
                "Welcome to {}! Guess the word behind the blurred picture within {} tries.

Type a word to guess it, or build one a letter at a time and send /enter (/back deletes a letter). Type /reset to replay today's puzzle, /next for the next puzzle, /streak to see your streak or /contrast to switch high contrast colors.",
                game_name, MAX_ATTEMPTS
            )
        }

        ("/new", _) | ("/start", _) | (_, None) => {
            return handle_new_game(e, state).await;
        }

        ("/reset", Some(game)) => {
            game.reset().await;
            format!("Starting over.\n\n{}", render_game(&game.view().await))
        }

        ("/next", Some(game)) => match game.advance().await {
            Ok(_) => {
                let view = game.view().await;
                let mut reply = String::new();
                if view.all_complete {
                    reply.push_str("You've played every puzzle! Back to the first one.\n\n");
                }
                reply.push_str(&render_game(&view));
                reply
            }
            Err(e) if e.is_fatal() => return Err(anyhow!(e)),
            Err(e) => e.to_string(),
        },

        ("/back", Some(game)) => {
            game.backspace().await;
            render_game(&game.view().await)
        }

        ("/enter", Some(game)) => {
            let turn = game.submit().await;
            let from = e.update.get_message()?.clone().from.unwrap_or_default();
            return reply_to_turn(turn, &game.view().await, &from);
        }

        ("/streak", Some(game)) => {
            let view = game.view().await;
            format!(
                "Your streak: {} days. Best this puzzle: {}/{} letters.",
                view.streak, view.best_correct, view.answer_len
            )
        }

        ("/contrast", Some(game)) => {
            if game.toggle_high_contrast().await {
                "High contrast colors on.".into()
            } else {
                "High contrast colors off.".into()
            }
        }

        _ => "I don't know that command.".into(),
    };

    Ok(Action::ReplyText(reply))
}

/// handle_chat_event is the main Telegram handler for the bot.
pub async fn handle_chat_event(e: Event, state: State<App>) -> Result<Action, anyhow::Error> {
    // Get the message
    let message = e.update.get_message()?.clone().text.unwrap_or_default();
    if message.starts_with('/') {
        return handle_bot_command(e, state).await;
    }

    // Get the sender's first name
    let from = e.update.get_message()?.clone().from.unwrap_or_default();

    // If there's no active game, start one.
    let Some(game) = state.get().read().await.game() else {
        return handle_new_game(e, state).await;
    };

    // A single letter goes into the guess buffer.
    let mut chars = message.trim().chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            game.type_letter(c).await;
            return Ok(Action::ReplyText(render_game(&game.view().await)));
        }
    }

    info!(
        "{} ({}) guessed {}",
        from.first_name,
        from.username.clone().unwrap_or("unknown".into()),
        message
    );

    let turn = game.guess(&message).await;
    reply_to_turn(turn, &game.view().await, &from)
}

/// reply_to_turn describes the result of a submitted guess.
fn reply_to_turn(
    turn: Result<Move, PlayError>,
    view: &SessionView,
    from: &User,
) -> Result<Action, anyhow::Error> {
    let word = view.history.last().map(|a| a.word.clone()).unwrap_or_default();
    let reply = match turn {
        Ok(Move::Valid { exact_matches }) => format!(
            "{}\n{} of {} letters in place. Guess another word?",
            render_game(view),
            exact_matches,
            view.answer_len
        ),
        Ok(Move::Won) => {
            info!(
                "{} ({}) won puzzle {} with {}",
                from.first_name,
                from.username.clone().unwrap_or("unknown".into()),
                view.puzzle_id,
                word
            );
            format!(
                "{}\nYou won! \u{1F46F}\nYour streak: {} days. Type /next for another puzzle.",
                render_game(view),
                view.streak
            )
        }
        Ok(Move::Lost) => {
            info!(
                "{} ({}) lost puzzle {} with {}",
                from.first_name,
                from.username.clone().unwrap_or("unknown".into()),
                view.puzzle_id,
                word
            );
            format!(
                "{}\nYou lost! The word was {} \u{1F979}\nType /reset to try again or /next for another puzzle.",
                render_game(view),
                view.answer.clone().unwrap_or_default()
            )
        }
        Err(err) if err.is_fatal() => {
            error!("Puzzle {} is broken: {}", view.puzzle_id, err);
            return Err(anyhow!(err));
        }
        Err(PlayError::GameOver) => {
            "This puzzle is over. Type /reset to play it again or /next for another one.".into()
        }
        Err(err) => format!("Sorry {}, {}. Try again.", from.first_name, err),
    };

    Ok(Action::ReplyText(reply))
}
