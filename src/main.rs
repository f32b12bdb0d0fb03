use repairshop_pos_pwa::components::App;

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("🧾 Caja Taller - arrancando PWA");

    yew::Renderer::<App>::new().render();
}
