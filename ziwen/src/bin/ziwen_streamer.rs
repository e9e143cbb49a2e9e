use ziwen_commons::*;

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "WARNING,ziwen=info");
    }
    start_everything(ziwen::streamer_entry());
}
