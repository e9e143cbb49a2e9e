use ziwen_commons::*;

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "WARNING,ziwen=debug");
    }
    start_everything(ziwen::entry());
}
