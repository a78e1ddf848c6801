//! Test utilities for building populated in-memory hosts.

#[cfg(test)]
pub(crate) mod test_helpers {
    use crate::host::MemoryHost;
    use docsync_core::DocumentUri;
    use std::rc::Rc;

    pub fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(s)
    }

    /// Host with `a.txt` and `b.txt` open and editor `e1` showing `b.txt`.
    pub fn opened_host() -> Rc<MemoryHost> {
        let host = Rc::new(MemoryHost::new(1024));
        host.open_document(uri("file:///a.txt"), "alpha\n", "plaintext")
            .unwrap();
        host.open_document(uri("file:///b.txt"), "beta\r\n", "plaintext")
            .unwrap();
        let editor = host.create_editor("e1").unwrap();
        editor.set_document(Some(uri("file:///b.txt")));
        host
    }
}
