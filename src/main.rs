fn main() {
    sectionizer::cli::run();
}
