use std::sync::Once;

/// Installs the ring provider for rustls before the first HTTPS client is built.
pub fn ensure_rustls_provider_installed() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // Another part of the process may already have installed one; the
        // provider is a process-wide singleton.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
