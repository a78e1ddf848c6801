use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use docsync::config::SyncConfig;
use docsync::host::MemoryHost;
use docsync::mirror::{ChannelMirror, MirrorMessage, MirrorState};
use docsync::script::HostCommand;
use docsync::sync::DocumentsAndEditors;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match SyncConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SyncConfig::default(),
    };

    match replay(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("replay failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Applies stdin commands to an in-memory host and prints every mirror
/// message as one JSON line.
async fn replay(config: &SyncConfig) -> docsync::Result<()> {
    let host = Rc::new(MemoryHost::from_config(&config.documents));
    let (mirror, mut rx) = ChannelMirror::new();
    let sync = DocumentsAndEditors::new(host.clone(), Rc::new(mirror), config);

    let mut stdout = tokio::io::stdout();
    let mut remote = MirrorState::new();
    flush_messages(&mut rx, &mut remote, &mut stdout).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_number = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let applied = HostCommand::parse(line).and_then(|command| command.apply(&host));
        if let Err(e) = applied {
            tracing::warn!("skipping line {}: {}", line_number, e);
            continue;
        }
        flush_messages(&mut rx, &mut remote, &mut stdout).await?;
    }

    tracing::info!(
        "replayed {} lines, {} documents and {} editors synchronized",
        line_number,
        sync.document_count(),
        sync.editor_count()
    );
    Ok(())
}

/// Writes pending mirror messages. Each one is applied to `remote` first; a
/// message the receiving side would reject aborts the replay.
async fn flush_messages(
    rx: &mut UnboundedReceiver<MirrorMessage>,
    remote: &mut MirrorState,
    stdout: &mut tokio::io::Stdout,
) -> docsync::Result<()> {
    while let Ok(message) = rx.try_recv() {
        remote.apply(&message)?;
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
    }
    stdout.flush().await?;
    Ok(())
}
