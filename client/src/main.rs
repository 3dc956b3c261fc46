use std::path::PathBuf;

fn main() {
    let records_path = std::env::args_os().nth(1).map(PathBuf::from);
    pet_gallery::app::bootstrap::run_gallery_app(records_path);
}
