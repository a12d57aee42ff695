//! Server startup utilities.

use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
    ______                 _
   / ____/___  __  _______(_)__  _____
  / /_  / __ \/ / / / ___/ / _ \/ ___/
 / __/ / /_/ / /_/ / /  / /  __/ /
/_/    \____/\__,_/_/  /_/\___/_/

                 Auth Backend
    "#);
}

/// Prints where the server can be reached.
pub fn print_startup_info(addr: &str) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}", addr);
    info!("Auth:      http://{}/auth", addr);
    info!("Health:    http://{}/health", addr);
    info!("API Docs:  http://{}/api-docs/openapi.json", addr);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info("127.0.0.1:8000");
    }
}
