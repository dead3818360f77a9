use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("ENVSHIM_LOG", "warn"))
        .format_timestamp(None)
        .init();

    match envshim_shim::run_shim() {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("envshim: {err:#}");
            ExitCode::from(envshim_shim::ShimError::EXIT_CODE)
        }
    }
}
