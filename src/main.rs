fn main() {
    if let Err(err) = mini_reconcile::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
