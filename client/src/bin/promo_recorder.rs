fn main() {
    pet_gallery::app::bootstrap::run_recorder_app();
}
