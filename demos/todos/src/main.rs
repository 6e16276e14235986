//! Todos demo binary
//!
//! Runs a short session against the seeded store and prints every snapshot
//! as JSON.

use anyhow::Context;
use statecraft_core::environment::RandomIdGenerator;
use statecraft_runtime::metrics::MetricsRecorder;
use std::sync::Arc;
use todos::{DemoConfig, TodoAction, TodoAppState, TodoEnvironment, TodoId, TodoStore, seeded_store};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn print_snapshot(store: &TodoStore, label: &str) -> anyhow::Result<()> {
    let snapshot = store.snapshot().await;
    println!("\n>>> {label}");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn id_of(store: &TodoStore, description: &str) -> anyhow::Result<TodoId> {
    store
        .state(|s| s.todos.find_by_description(description).map(|t| t.id))
        .await
        .with_context(|| format!("no todo described as {description:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DemoConfig::from_env().context("reading TODOS_* configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let recorder = if config.metrics {
        Some(MetricsRecorder::install()?)
    } else {
        None
    };

    println!("=== Todos: Statecraft Architecture ===");

    let env = TodoEnvironment::new(Arc::new(RandomIdGenerator));
    let store = seeded_store(env, config.store_config());

    store.subscribe(|state: &TodoAppState| {
        tracing::info!(
            todos = state.todos.len(),
            completed = state.todos.completed_count(),
            counter = state.counter.value(),
            "State changed"
        );
    });

    let mut actions = store.subscribe_actions();
    let observer = tokio::spawn(async move {
        let mut seen = 0_usize;
        loop {
            match actions.recv().await {
                Ok(action) => {
                    seen += 1;
                    match serde_json::to_string(&action) {
                        Ok(json) => tracing::debug!(%json, "Observed action"),
                        Err(error) => tracing::warn!(%error, "Could not serialize action"),
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Action observer lagged");
                },
                Err(RecvError::Closed) => break,
            }
        }
        seen
    });

    print_snapshot(&store, "Seeded state").await?;

    store.send(TodoAction::create("Write tests")).await?;
    print_snapshot(&store, "Create \"Write tests\"").await?;

    let write_tests = id_of(&store, "Write tests").await?;
    store.send(TodoAction::toggle(write_tests, true)).await?;
    print_snapshot(&store, "Toggle \"Write tests\" complete").await?;

    store.send(TodoAction::select(write_tests)).await?;
    print_snapshot(&store, "Select \"Write tests\"").await?;

    let learn_redux = id_of(&store, "Learn Redux").await?;
    store.send(TodoAction::edit(learn_redux, "Learn Redux the hard way")).await?;
    print_snapshot(&store, "Edit \"Learn Redux\"").await?;

    let learn_react = id_of(&store, "Learn React").await?;
    store.send(TodoAction::remove(learn_react)).await?;
    print_snapshot(&store, "Remove \"Learn React\"").await?;

    store.shutdown_with_default_timeout().await?;
    drop(store);

    let seen = observer.await.context("action observer task failed")?;
    println!("\nActions observed: {seen}");

    if let Some(recorder) = recorder {
        println!("\n=== Metrics ===\n{}", recorder.render());
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
