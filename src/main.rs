fn main() -> std::process::ExitCode {
    insulator_inspector_lib::run()
}
