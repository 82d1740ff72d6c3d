fn main() {
    dioxus::launch(shelf_web::App);
}
