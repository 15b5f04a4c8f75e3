mod app;

fn main() -> iced::Result {
    app::run()
}
