use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::category_fetch::CategorySource;
use crate::session::build_session;
use crate::state::{Delta, ProviderCommand};

/// Runs session builds on a worker thread, one at a time, until either
/// channel closes.
pub fn spawn_session_provider<S>(
    source: S,
    category_pool: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    S: CategorySource + Send + 'static,
{
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::BuildSession => {
                    let _ = tx.send(Delta::Log("[INFO] Fetching categories".to_string()));
                    let outcome = build_session(&source, category_pool, &mut rng);
                    if tx.send(Delta::SessionReady(outcome)).is_err() {
                        return;
                    }
                }
            }
        }
    })
}
