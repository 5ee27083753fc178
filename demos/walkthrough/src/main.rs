//! Walkthrough binary
//!
//! Wires the Statecast services together the way a host application
//! would: construct each service once, hand out channel readers, keep
//! the subscription handles, tear everything down at the end.

use statecast_core::Subscription;
use statecast_store::{MemoryStore, MessageHub, Scoreboard, Session, TodoStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkthrough=debug,statecast_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Statecast Walkthrough ===\n");

    // Subscriptions live here until teardown; dropping one would
    // unsubscribe its listener immediately.
    let mut teardown: Vec<Subscription> = Vec::new();

    // Session: a login flag on a replay channel, token through storage
    let storage = Arc::new(MemoryStore::new());
    let session = Session::new(storage);
    teardown.push(
        session
            .watch()
            .subscribe(|flag| println!("[session] logged in: {flag}")),
    );

    println!(">>> login()");
    session.login();

    // Todo store: snapshots on replay, notifications on a plain channel
    let todos = TodoStore::new();
    teardown.push(todos.list().subscribe(|snapshot| {
        println!("[todos] {} item(s)", snapshot.len());
        for item in snapshot.iter() {
            let mark = if item.completed { "x" } else { " " };
            println!("  [{mark}] #{} {}", item.id, item.title);
        }
    }));
    teardown.push(
        todos
            .notifications()
            .subscribe(|event| println!("[note] {event}")),
    );

    println!("\n>>> add(\"Buy milk\")");
    if let Ok(id) = todos.add("Buy milk") {
        println!("\n>>> toggle({id})");
        todos.toggle(id);

        println!("\n>>> remove({id})");
        todos.remove(id);
    }

    println!("\n>>> add(\"a\")");
    if let Err(error) = todos.add("a") {
        println!("rejected: {error}");
    }

    // Message hub: the current message replays to every new subscriber
    let hub = MessageHub::new();
    println!("\n>>> subscribing to the message hub");
    teardown.push(hub.messages().subscribe(|message| println!("[hub] {message}")));

    println!(">>> send(\"Hello from the walkthrough\")");
    hub.send("Hello from the walkthrough");

    // Scoreboard: replayed score next to ephemeral bulletins
    let board = Scoreboard::new();
    board.announce("kick-off"); // nobody listening yet; missed by design

    println!("\n>>> subscribing to the scoreboard");
    teardown.push(board.score().subscribe(|score| println!("[score] {score}")));
    teardown.push(
        board
            .bulletins()
            .subscribe(|bulletin| println!("[bulletin] {bulletin}")),
    );

    println!(">>> set_score(1)");
    board.set_score(1);
    println!(">>> announce(\"goal!\")");
    board.announce("goal!");

    println!("\n>>> logout()");
    session.logout();

    // Explicit teardown; unsubscribe is idempotent with the drop that
    // follows.
    for sub in teardown.drain(..) {
        sub.unsubscribe();
    }

    println!("\n=== Walkthrough complete ===");
}
