use anyhow::Context;
use log::*;
use mobot::*;

use crate::config::Args;
use crate::handlers::handle_chat_event;

mod app;
mod config;
mod error;
mod evaluator;
mod game;
mod handlers;
mod puzzle;
mod selector;
mod session;
mod store;
mod timers;
mod validator;

#[cfg(test)]
mod app_test;
#[cfg(test)]
mod evaluator_test;
#[cfg(test)]
mod store_test;
#[cfg(test)]
mod validator_test;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mobot::init_logger();
    let args: Args = argh::from_env();
    let app = args.app()?;

    let token = std::env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN is not set")?;
    let client = Client::new(token);

    info!("Starting bot...");
    let mut router = Router::new(client).with_state(app);
    router.add_route(Route::Message(Matcher::Any), handle_chat_event);
    router.start().await;
    Ok(())
}
