use std::io::Write;

use modal_core::{ProviderMappingEntry, SelectionSurface, SurfaceProps, VisibilityUpdate};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Prints the provider list when shown and reads the selection from stdin.
#[derive(Default)]
pub struct TerminalSurface {
    props: Mutex<Option<SurfaceProps>>,
}

impl SelectionSurface for TerminalSurface {
    fn mount(&self, container_id: &str, props: SurfaceProps) -> anyhow::Result<()> {
        debug!(
            container = container_id,
            providers = props.providers.len(),
            "terminal surface mounted"
        );
        *self.props.lock() = Some(props);
        Ok(())
    }

    fn update(&self, update: VisibilityUpdate) {
        if !update.show {
            return;
        }
        let Some(props) = self.props.lock().clone() else {
            warn!("terminal surface shown before it was mounted");
            return;
        };
        print_providers(&props.providers);
        tokio::spawn(prompt(props));
    }

    fn set_scroll_locked(&self, locked: bool) {
        debug!(locked, "scroll lock");
    }

    fn unmount(&self, container_id: &str) {
        self.props.lock().take();
        debug!(container = container_id, "terminal surface unmounted");
    }
}

pub fn print_providers(providers: &[ProviderMappingEntry]) {
    for (index, entry) in providers.iter().enumerate() {
        println!(
            "{:>2}. {:<16} {:<20} {}",
            index + 1,
            entry.id,
            entry.name,
            entry.description
        );
    }
}

async fn prompt(props: SurfaceProps) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("select a provider (empty line closes): ");
        if let Err(err) = std::io::stdout().flush() {
            warn!(error = %err, "failed to flush selection prompt");
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                (props.on_close)();
                return;
            }
            Err(err) => {
                warn!(error = %err, "failed to read selection");
                (props.on_close)();
                return;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            (props.on_close)();
            return;
        }

        let selected = line
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| props.providers.get(index));
        match selected {
            Some(entry) => {
                entry.click().await;
                return;
            }
            None => println!("no provider numbered {line}"),
        }
    }
}
