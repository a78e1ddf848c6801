//! Common test utilities for integration tests.
//!
//! Provides an in-process fixture wiring a `MemoryHost` to a `LocalMirror`,
//! and a `ReplayClient` that drives the `docsync` binary over stdio.

use docsync::config::SyncConfig;
use docsync::host::MemoryHost;
use docsync::mirror::{LocalMirror, MirrorMessage};
use docsync::sync::DocumentsAndEditors;
use docsync_core::{BindingId, DocumentUri};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::rc::Rc;

pub(crate) fn uri(s: &str) -> DocumentUri {
    DocumentUri::new(s)
}

#[allow(dead_code)] // Used by documents_and_editors tests only
pub(crate) fn binding(editor: &str, document: &str) -> BindingId {
    BindingId::from(format!("{editor},{document}").as_str())
}

/// A host wired to an in-process mirror.
#[allow(dead_code)] // Used by documents_and_editors tests only
pub(crate) struct Fixture {
    pub host: Rc<MemoryHost>,
    pub mirror: Rc<LocalMirror>,
    pub sync: DocumentsAndEditors,
}

#[allow(dead_code)] // Used by documents_and_editors tests only
impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub(crate) fn with_config(config: SyncConfig) -> Self {
        let host = Rc::new(MemoryHost::from_config(&config.documents));
        let mirror = Rc::new(LocalMirror::new());
        let sync = DocumentsAndEditors::new(host.clone(), mirror.clone(), &config);
        Self { host, mirror, sync }
    }

    /// Asserts that the mirror and the dispatcher agree and that the mirror
    /// never rejected a message.
    pub(crate) fn assert_consistent(&self) {
        let state = self.mirror.state();
        let documents: Vec<DocumentUri> =
            self.sync.documents().into_iter().map(|doc| doc.uri).collect();

        assert_eq!(self.mirror.violations(), 0, "mirror rejected a message");
        assert_eq!(state.document_uris(), documents);
        assert_eq!(state.editor_ids(), self.sync.dispatcher().editor_ids());
    }
}

/// Drives the `docsync` binary: writes host commands, collects mirror
/// messages.
#[allow(dead_code)] // Used by replay_e2e tests only
pub(crate) struct ReplayClient;

#[allow(dead_code)] // Used by replay_e2e tests only
impl ReplayClient {
    /// Runs the binary over `commands` and returns every message it printed.
    pub(crate) fn run(commands: &[&str]) -> Vec<MirrorMessage> {
        Self::run_with(commands, None)
    }

    pub(crate) fn run_with(commands: &[&str], config: Option<&Path>) -> Vec<MirrorMessage> {
        let mut command = Command::new(env!("CARGO_BIN_EXE_docsync"));
        if let Some(config) = config {
            command.arg(config);
        }
        let mut process = command
            .env("RUST_LOG", "off")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn docsync binary");

        {
            let mut stdin = process.stdin.take().expect("Failed to capture stdin");
            for line in commands {
                writeln!(stdin, "{line}").expect("Failed to write command");
            }
        }

        let stdout = process.stdout.take().expect("Failed to capture stdout");
        let messages = BufReader::new(stdout)
            .lines()
            .map(|line| {
                let line = line.expect("Failed to read stdout");
                serde_json::from_str(&line).expect("Failed to parse mirror message")
            })
            .collect();

        let status = process.wait().expect("Failed to wait for docsync");
        assert!(status.success(), "docsync exited with {status}");
        messages
    }
}
