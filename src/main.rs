fn main() {
    env_logger::init();
    if let Err(err) = mekko_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
