fn main() {
    if let Err(e) = draft_advisor_lib::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
