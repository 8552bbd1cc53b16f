fn main() {
    jmmc::projects::cli::start_cli();
}
