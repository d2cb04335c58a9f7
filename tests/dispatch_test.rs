//! End-to-end dispatch tests against the in-memory transport
//! Run with: cargo test --test dispatch_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use tg_dispatch::domain::entities::ReplyMarkup;
use tg_dispatch::infrastructure::adapters::{MemoryTransport, SentMessage};
use tg_dispatch::{
    Bot, Callback, ChatId, Command, ConfigError, Config, Handler, HandlerResult, InboundMessage,
    Menu, MenuPage, Responder, RunningBot, Update, User,
};

const CHAT: ChatId = 42;

/// Replies with the number of plain messages seen and counts dumps
struct Counter {
    dumps: Arc<AtomicUsize>,
}

#[async_trait]
impl Handler for Counter {
    async fn handle(&self, message: &InboundMessage, responder: &Responder) -> HandlerResult {
        responder.send_text(format!("count: {}", message.text)).await?;
        Ok(None)
    }

    fn dump(&self, _chat_id: ChatId) {
        self.dumps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shows a menu that was never registered with the bot
struct Inline;

#[async_trait]
impl Handler for Inline {
    async fn handle(&self, _message: &InboundMessage, _responder: &Responder) -> HandlerResult {
        let page = MenuPage::new("colors", "Pick a color")
            .command("Red", "echo", vec!["red".to_string()])
            .command("Blue", "echo", vec!["blue".to_string()]);
        Ok(Some(Callback::open_menu_page(Arc::new(page))))
    }
}

fn build(transport: Arc<MemoryTransport>) -> (Bot, Arc<AtomicUsize>) {
    let dumps = Arc::new(AtomicUsize::new(0));
    let mut bot = Bot::from_config(transport, &Config::default());
    bot.register(Command::with_reply("echo", |msg| Some(msg.args.join(" "))))
        .unwrap();
    bot.register(Command::new("count", Counter { dumps: Arc::clone(&dumps) }))
        .unwrap();
    bot.register(Command::new("colors", Inline)).unwrap();
    bot.register_menu(
        MenuPage::new("main", "Main menu")
            .command("Echo", "echo", vec!["from".to_string(), "menu".to_string()])
            .submenu("More", MenuPage::new("more", "More").back("Back", "main")),
    )
    .unwrap();
    (bot, dumps)
}

fn start() -> (RunningBot, mpsc::Sender<Update>, Arc<MemoryTransport>, Arc<AtomicUsize>) {
    let transport = Arc::new(MemoryTransport::new());
    let (bot, dumps) = build(Arc::clone(&transport));
    let (tx, rx) = mpsc::channel(16);
    let running = bot.start(rx).unwrap();
    (running, tx, transport, dumps)
}

/// Wait until the transport has accepted `count` messages
async fn wait_for(transport: &MemoryTransport, count: usize) -> Vec<SentMessage> {
    for _ in 0..200 {
        let sent = transport.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} messages, got {:?}", count, transport.sent());
}

fn press(id: &str, callback: &Callback) -> Update {
    Update::callback(id, CHAT, User::new(7), callback.encode())
}

#[tokio::test]
async fn test_command_arguments_reach_the_handler() {
    let (running, tx, transport, _) = start();

    tx.send(Update::text(CHAT, "/echo one two")).await.unwrap();

    let sent = wait_for(&transport, 1).await;
    assert_eq!(sent[0].chat_id, CHAT);
    assert_eq!(sent[0].text, "one two");
    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_conversation_stays_with_handler_until_switch() {
    let (running, tx, transport, dumps) = start();

    tx.send(Update::text(CHAT, "/count")).await.unwrap();
    tx.send(Update::text(CHAT, "apples")).await.unwrap();
    tx.send(Update::text(CHAT, "/echo done")).await.unwrap();

    let sent = wait_for(&transport, 3).await;
    let texts: Vec<&str> = sent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["count: /count", "count: apples", "done"]);
    assert_eq!(dumps.load(Ordering::SeqCst), 1);
    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_pressing_a_command_button_matches_typing_it() {
    let (running, tx, transport, _) = start();

    let callback = Callback::call_command("echo", vec!["hi".to_string()]);
    tx.send(press("q1", &callback)).await.unwrap();
    tx.send(Update::text(CHAT, "/echo hi")).await.unwrap();

    let sent = wait_for(&transport, 2).await;
    assert_eq!(sent[0].text, "hi");
    assert_eq!(sent[0], sent[1]);
    assert_eq!(transport.answered(), vec!["q1".to_string()]);
    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_embedded_menu_is_rendered_once() {
    let (running, tx, transport, _) = start();

    tx.send(Update::text(CHAT, "/colors")).await.unwrap();
    tx.send(Update::text(CHAT, "/echo after")).await.unwrap();

    let sent = wait_for(&transport, 2).await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, "Pick a color");
    match &sent[0].markup {
        Some(ReplyMarkup::Inline(kb)) => assert_eq!(kb.button_count(), 2),
        other => panic!("expected inline keyboard, got {:?}", other),
    }
    assert_eq!(sent[1].text, "after");
    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_menu_navigation_by_buttons() {
    let (running, tx, transport, _) = start();

    // No command and no active handler: the root menu answers
    tx.send(Update::text(CHAT, "hello")).await.unwrap();
    tx.send(press("q1", &Callback::open_menu("more"))).await.unwrap();
    tx.send(press("q2", &Callback::transit_to("main"))).await.unwrap();

    let sent = wait_for(&transport, 3).await;
    let texts: Vec<&str> = sent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Main menu", "More", "Main menu"]);
    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsolicited_message_goes_through_the_queue() {
    let (running, _tx, transport, _) = start();

    running
        .send(Callback::transit_to("main").with_text("Heads up").with_chat(CHAT))
        .await
        .unwrap();

    let sent = wait_for(&transport, 1).await;
    assert_eq!(sent[0].text, "Heads up");
    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_finishes_both_tasks() {
    let (running, tx, _transport, _) = start();
    assert_eq!(running.completed(), 0);

    // The update stream stays open, so only the stop signal can end the tasks
    tokio::time::timeout(Duration::from_secs(2), running.stop())
        .await
        .expect("stop timed out")
        .unwrap();
    assert!(tx.is_closed());
}

#[tokio::test]
async fn test_duplicate_command_is_rejected() {
    let transport = Arc::new(MemoryTransport::new());
    let (mut bot, _) = build(transport);

    let err = bot
        .register(Command::with_reply("echo", |_| None))
        .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateCommand("echo".to_string()));
}

#[tokio::test]
async fn test_menu_tree_is_registered_with_submenus() {
    let page = MenuPage::new("root", "Root").submenu("Sub", MenuPage::new("sub", "Sub"));
    assert_eq!(page.submenus().len(), 1);
    assert_eq!(page.submenus()[0].name(), "sub");
}

#[tokio::test]
async fn test_menu_with_undeliverable_button_is_rejected() {
    let transport = Arc::new(MemoryTransport::new());
    let mut bot = Bot::new(transport);

    let err = bot
        .register_menu(MenuPage::new("subs", "Subscriptions").command(
            "Subscribe",
            "subscribe",
            vec![
                "notifications-weekly-digest".to_string(),
                "europe-central-region".to_string(),
                "daily".to_string(),
            ],
        ))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));
}
