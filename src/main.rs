fn main() {
    rastro::run_cli();
}
