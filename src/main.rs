use city_builder::{catalog, components::App, util};

fn main() {
    util::init_logging(log::LevelFilter::Info);
    // Validate reference data before anything renders.
    let catalog = catalog::global();
    log::info!(
        "city builder starting with {} building types",
        catalog.buildings().len()
    );
    yew::Renderer::<App>::new().render();
}
