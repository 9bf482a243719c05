//! # Example: wake_daemon
//!
//! Drives a four-core in-process governor through a few wake/suspend cycles
//! and prints every controller event.
//!
//! ```text
//! t=0      Active   → floors raised to 2.0 GHz
//! t=3s              → unboost restores the floors
//! t=4s     Active   → floors raised again
//! t=4.5s   Suspend  → floors restored immediately
//! Ctrl-C            → graceful shutdown
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example wake_daemon --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use wakeboost::{
    Config, CpuInfo, LogWriter, PolicyTable, PowerEvent, PowerNotifier, Subscribe, WakeBoost,
};

const CORES: [(u32, CpuInfo); 4] = [
    (0, CpuInfo { min_freq: 300_000, max_freq: 2_000_000 }),
    (1, CpuInfo { min_freq: 300_000, max_freq: 2_000_000 }),
    (2, CpuInfo { min_freq: 600_000, max_freq: 2_000_000 }),
    (3, CpuInfo { min_freq: 600_000, max_freq: 2_000_000 }),
];

fn print_floors(table: &PolicyTable, label: &str) {
    let floors: Vec<String> = table
        .online()
        .into_iter()
        .filter_map(|cpu| table.policy(cpu).map(|p| format!("cpu{cpu}={}", p.min)))
        .collect();
    println!("-- {label}: {}", floors.join(" "));
}

/// Drives the scripted wake/suspend sequence.
async fn script(table: &PolicyTable, notifier: &PowerNotifier) {
    notifier.notify(PowerEvent::Active).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    print_floors(table, "after wake");

    tokio::time::sleep(Duration::from_millis(3100)).await;
    print_floors(table, "after window");

    tokio::time::sleep(Duration::from_millis(850)).await;
    notifier.notify(PowerEvent::Active).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    notifier.notify(PowerEvent::Suspend).await;
    print_floors(table, "after suspend");
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let table = Arc::new(PolicyTable::new());
    for (cpu, info) in CORES {
        table.add_cpu(cpu, info);
    }
    let notifier = Arc::new(PowerNotifier::new());
    print_floors(&table, "initial");

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let controller = WakeBoost::builder(Config::default(), table.clone(), notifier.clone())
        .with_subscribers(subs)
        .start()?;

    tokio::select! {
        _ = script(&table, &notifier) => {
            println!("-- script finished, Ctrl-C to exit");
            wait_for_shutdown_signal().await?;
        }
        res = wait_for_shutdown_signal() => res?,
    }

    controller.shutdown().await;
    print_floors(&table, "after shutdown");
    Ok(())
}
