mod app;

use tracing::error;

fn main() {
    let wiring = app::bootstrap::build_app(std::env::args().skip(1).collect());

    if let Err(err) = scene2d::run_windowed(wiring.config, move |engine| {
        app::showcase::populate(engine, &wiring.image_sources);
    }) {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}
