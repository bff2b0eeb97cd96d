//! LTDK Client - Main entry point
//!
//! Runs in the browser (WASM) or as a desktop window.

fn main() {
    ltdk_client::logging::init();
    dioxus::launch(ltdk_client::App);
}
