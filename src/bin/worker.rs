#[cfg(target_arch = "wasm32")]
fn main() {
    use gloo_worker::Registrable;
    use xiangqi_core::worker::SearchWorker;

    console_error_panic_hook::set_once();
    // A second logger install is the only failure; keep the first.
    let _ = console_log::init_with_level(log::Level::Debug);
    SearchWorker::registrar().register();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("the search worker is built for wasm32 and registered by the browser");
}
